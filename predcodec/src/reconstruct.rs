// SPDX-License-Identifier: LGPL-2.1

use log::debug;

use crate::{
  config::Rounding,
  grid::{GRID_DIM, ImageGrid, ResidualGrid},
  inspector,
  predictor::{Neighbors, Predictor},
};

/// Rebuild the image from decoded residuals.
///
/// Uses the already reconstructed samples as prediction context, so
/// any disagreement between encode and decode prediction propagates
/// to the following samples.
pub fn decode_image(predictor: Predictor, residuals: &ResidualGrid, rounding: Rounding) -> ImageGrid {
  debug!("Reconstructing with {}, rounding: {}", predictor, rounding);
  let mut out = ImageGrid::new();

  for row in 0..GRID_DIM {
    for col in 0..GRID_DIM {
      let diff = residuals.at(row, col);
      let p = match (row, col) {
        // First sample is stored as is
        (0, 0) => 0,
        // At start of line predictor starts with start of previous line
        (row, 0) => out.at(row - 1, 0),
        // First line uses the previous sample in the same line
        (0, col) => out.at(0, col - 1),
        (row, col) => predictor.inverse(Neighbors::of(&out, row, col), rounding),
      };
      inspector!("reconstruct [{},{}]: px={}, diff={}", row, col, p, diff);
      *out.at_mut(row, col) = p.wrapping_add(diff);
    }
  }
  out
}
