// SPDX-License-Identifier: LGPL-2.1

//! Lossless JPEG predictors (ITU T.81 Table H.1)
//!
//! Neighbours of the current sample `x` (Figure H.1):
//! ```text
//! | c | b |
//! | a | x |
//! ```
//! The first row always uses predictor 1 (`a`), the first column
//! always uses predictor 2 (`b`) and the first sample is stored
//! without prediction.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
  PredcodecError,
  config::Rounding,
  grid::{GRID_DIM, Grid, ImageGrid, ResidualGrid},
  inspector,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Predictor {
  P1 = 1,
  P2 = 2,
  P3 = 3,
  P4 = 4,
  P5 = 5,
  P6 = 6,
  P7 = 7,
}

/// Reconstructed or source values around the current sample
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
  /// Left
  pub a: i32,
  /// Above
  pub b: i32,
  /// Above-left
  pub c: i32,
}

impl Neighbors {
  /// Collect neighbours of an interior cell (`row >= 1`, `col >= 1`)
  #[inline(always)]
  pub fn of(grid: &Grid<i32>, row: usize, col: usize) -> Self {
    debug_assert!(row > 0 && col > 0);
    Self {
      a: grid.at(row, col - 1),
      b: grid.at(row - 1, col),
      c: grid.at(row - 1, col - 1),
    }
  }
}

impl Predictor {
  pub fn all() -> [Predictor; 7] {
    [Self::P1, Self::P2, Self::P3, Self::P4, Self::P5, Self::P6, Self::P7]
  }

  pub fn as_u8(&self) -> u8 {
    *self as u8
  }

  /// True if the predictor uses a halving step that depends on rounding
  pub fn uses_halving(&self) -> bool {
    matches!(self, Self::P5 | Self::P6 | Self::P7)
  }

  pub fn formula(&self) -> &'static str {
    match self {
      Self::P1 => "X = A",
      Self::P2 => "X = B",
      Self::P3 => "X = C",
      Self::P4 => "X = A + B - C",
      Self::P5 => "X = A + (B - C)/2",
      Self::P6 => "X = B + (A - C)/2",
      Self::P7 => "X = (A + B)/2",
    }
  }

  /// Prediction used by the encoder
  #[inline(always)]
  pub fn forward(&self, n: Neighbors, rounding: Rounding) -> i32 {
    self.predict(n, |d| rounding.half_encode(d))
  }

  /// Prediction used by the decoder
  #[inline(always)]
  pub fn inverse(&self, n: Neighbors, rounding: Rounding) -> i32 {
    self.predict(n, |d| rounding.half_decode(d))
  }

  #[inline(always)]
  fn predict<F: Fn(i32) -> i32>(&self, n: Neighbors, half: F) -> i32 {
    let Neighbors { a, b, c } = n;
    match self {
      Self::P1 => a,
      Self::P2 => b,
      Self::P3 => c,
      Self::P4 => a.wrapping_add(b).wrapping_sub(c),
      Self::P5 => a.wrapping_add(half(b.wrapping_sub(c))),
      Self::P6 => b.wrapping_add(half(a.wrapping_sub(c))),
      Self::P7 => half(a.wrapping_add(b)),
    }
  }
}

impl TryFrom<u8> for Predictor {
  type Error = PredcodecError;

  fn try_from(v: u8) -> Result<Self, Self::Error> {
    match v {
      1 => Ok(Self::P1),
      2 => Ok(Self::P2),
      3 => Ok(Self::P3),
      4 => Ok(Self::P4),
      5 => Ok(Self::P5),
      6 => Ok(Self::P6),
      7 => Ok(Self::P7),
      mode => Err(PredcodecError::InvalidPredictor(mode)),
    }
  }
}

impl From<Predictor> for u8 {
  fn from(p: Predictor) -> Self {
    p.as_u8()
  }
}

impl std::fmt::Display for Predictor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "P{} ({})", self.as_u8(), self.formula())
  }
}

/// Calculate the residual grid of `image` for the given predictor.
///
/// The difference is computed modulo 2^32, which is exact for
/// any sane pixel range.
pub fn encode_residuals(image: &ImageGrid, predictor: Predictor, rounding: Rounding) -> ResidualGrid {
  debug!("Predicting with {}, rounding: {}", predictor, rounding);
  let mut residuals = ResidualGrid::new();

  // First sample has no context
  *residuals.at_mut(0, 0) = image.at(0, 0);

  // First row always use predictor 1
  for col in 1..GRID_DIM {
    *residuals.at_mut(0, col) = image.at(0, col).wrapping_sub(image.at(0, col - 1));
  }

  // First column always use predictor 2
  for row in 1..GRID_DIM {
    *residuals.at_mut(row, 0) = image.at(row, 0).wrapping_sub(image.at(row - 1, 0));
  }

  for row in 1..GRID_DIM {
    for col in 1..GRID_DIM {
      let px = predictor.forward(Neighbors::of(image, row, col), rounding);
      let diff = image.at(row, col).wrapping_sub(px);
      inspector!("predict [{},{}]: x={}, px={}, diff={}", row, col, image.at(row, col), px, diff);
      *residuals.at_mut(row, col) = diff;
    }
  }
  residuals
}
