// SPDX-License-Identifier: LGPL-2.1

use std::path::Path;

use itertools::Itertools;
use log::debug;
use serde::{Serialize, Serializer, ser::SerializeSeq};

use crate::{PredcodecError, Result, huffman::Codeword};

/// Width and height of every grid
pub const GRID_DIM: usize = 16;
/// Number of cells of every grid
pub const GRID_LEN: usize = GRID_DIM * GRID_DIM;

/// Fixed 16x16 row-major matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
  data: Vec<T>,
}

/// Source pixel values
pub type ImageGrid = Grid<i32>;
/// Prediction residuals (difference between pixel and prediction)
pub type ResidualGrid = Grid<i32>;
/// Huffman codewords, one per residual
pub type CodewordGrid = Grid<Codeword>;

impl<T> Grid<T>
where
  T: Copy + Default,
{
  pub fn new() -> Self {
    Self {
      data: vec![T::default(); GRID_LEN],
    }
  }

  pub fn new_with(data: Vec<T>) -> Result<Self> {
    if data.len() != GRID_LEN {
      return Err(PredcodecError::InputShape { count: data.len() });
    }
    Ok(Self { data })
  }

  pub fn from_fn<F>(mut op: F) -> Self
  where
    F: FnMut(usize, usize) -> T,
  {
    let data = (0..GRID_LEN).map(|i| op(i / GRID_DIM, i % GRID_DIM)).collect();
    Self { data }
  }

  pub fn into_inner(self) -> Vec<T> {
    self.data
  }

  pub fn pixels(&self) -> &[T] {
    &self.data
  }

  pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
    self.data.chunks_exact(GRID_DIM)
  }

  #[inline(always)]
  pub fn at(&self, row: usize, col: usize) -> T {
    self.data[row * GRID_DIM + col]
  }

  #[inline(always)]
  pub fn at_mut(&mut self, row: usize, col: usize) -> &mut T {
    &mut self.data[row * GRID_DIM + col]
  }

  pub fn map<U, F>(&self, op: F) -> Grid<U>
  where
    F: Fn(T) -> U,
  {
    Grid {
      data: self.data.iter().map(|v| op(*v)).collect(),
    }
  }

  /// Iterate over `(row, col, value)`
  pub fn cells(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
    self.data.iter().enumerate().map(|(i, v)| (i / GRID_DIM, i % GRID_DIM, *v))
  }
}

impl<T> Default for Grid<T>
where
  T: Copy + Default,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Serialize> Serialize for Grid<T> {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let mut seq = serializer.serialize_seq(Some(GRID_DIM))?;
    for row in self.data.chunks_exact(GRID_DIM) {
      seq.serialize_element(row)?;
    }
    seq.end()
  }
}

impl<T: std::fmt::Display> std::fmt::Display for Grid<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for row in self.data.chunks_exact(GRID_DIM) {
      writeln!(f, "{}", row.iter().join(" "))?;
    }
    Ok(())
  }
}

/// Parse whitespace separated pixel values in row-major order.
/// Exactly 256 integers are required.
pub fn parse_image(text: &str) -> Result<ImageGrid> {
  let values = text
    .split_whitespace()
    .enumerate()
    .map(|(pos, token)| {
      token
        .parse::<i32>()
        .map_err(|err| PredcodecError::Parse(format!("value {} ('{}') is not an integer: {}", pos, token, err)))
    })
    .collect::<Result<Vec<i32>>>()?;
  debug!("Parsed {} pixel values", values.len());
  Grid::new_with(values)
}

/// Read and parse an image text file
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageGrid> {
  let text = std::fs::read_to_string(path.as_ref()).map_err(|err| PredcodecError::with_io_error(path.as_ref(), err))?;
  parse_image(&text)
}
