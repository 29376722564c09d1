// SPDX-License-Identifier: LGPL-2.1

//! Lossless predictive coding for small grayscale images.
//!
//! A fixed 16x16 image is decorrelated with one of the seven lossless JPEG
//! predictors, the residuals are coded with a fixed Huffman table, decoded
//! again and the image is reconstructed from the decoded residuals.
//!
//! # Example
//! ```rust,no_run
//! use predcodec::{Pipeline, PipelineConfig};
//!
//! fn main() -> predcodec::Result<()> {
//!   let image = predcodec::load_image("image.txt")?;
//!   let pipeline = Pipeline::new(PipelineConfig::from_env());
//!   for report in pipeline.run_all(&image)? {
//!     println!(
//!       "{}: ratio {:.2}, rms {}",
//!       report.formula, report.metrics.compression_ratio, report.metrics.rms_error
//!     );
//!   }
//!   Ok(())
//! }
//! ```

#![deny(unstable_features)]

pub mod bitarray;
pub mod bitstream;
pub mod config;
pub(crate) mod envparams;
pub mod grid;
pub mod huffman;
pub mod inspector;
pub mod pipeline;
pub mod predictor;
pub mod reconstruct;

pub use config::{PipelineConfig, Rounding};
pub use grid::{CodewordGrid, GRID_DIM, GRID_LEN, Grid, ImageGrid, ResidualGrid, load_image, parse_image};
pub use huffman::{Codeword, Lookup};
pub use pipeline::{Metrics, Pipeline, RunReport};
pub use predictor::Predictor;

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredcodecError {
  #[error("Image must be {}x{}, got {} values", GRID_DIM, GRID_DIM, count)]
  InputShape { count: usize },

  #[error("Parse error: {}", _0)]
  Parse(String),

  #[error("I/O error: {}", _0)]
  Io(String),

  #[error("Invalid predictor selector: {}, only 1-7 are supported", _0)]
  InvalidPredictor(u8),

  #[error("Invalid rounding mode: {}", _0)]
  InvalidRounding(String),

  #[error("Invalid codeword: {}", _0)]
  InvalidCodeword(String),

  #[error("Decoded residual differs from encoded residual at [{}, {}]", row, col)]
  CodecMismatch { row: usize, col: usize },

  #[error("Packed stream is not decodable at symbol {}", symbol)]
  UndecodableStream { symbol: usize },
}

pub type Result<T> = std::result::Result<T, PredcodecError>;

impl PredcodecError {
  pub fn with_io_error(path: impl AsRef<Path>, error: std::io::Error) -> Self {
    Self::Io(format!("I/O error on file: {:?}, {}", path.as_ref(), error))
  }
}

impl From<std::io::Error> for PredcodecError {
  fn from(err: std::io::Error) -> Self {
    Self::Io(err.to_string())
  }
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}
