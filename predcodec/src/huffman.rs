// SPDX-License-Identifier: LGPL-2.1

//! Fixed Huffman table for prediction residuals
//!
//! The table is pre-agreed between encoder and decoder, it is never
//! built from a histogram. Residuals in `-6..=6` have a codeword,
//! everything else falls back to a plain binary representation which
//! is *not* part of the prefix code.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use lazy_static::lazy_static;
use log::warn;
use serde::{Serialize, Serializer};

use crate::{
  PredcodecError, Result,
  bitarray::BitArray32,
  grid::{CodewordGrid, Grid, ResidualGrid},
  inspector,
};

/// Residual/codeword pairs of the fixed table
const FIXED_TABLE: [(i32, &str); 13] = [
  (0, "1"),
  (1, "00"),
  (-1, "011"),
  (2, "0100"),
  (-2, "01011"),
  (3, "010100"),
  (-3, "0101011"),
  (4, "01010100"),
  (-4, "010101011"),
  (5, "0101010100"),
  (-5, "01010101011"),
  (6, "010101010100"),
  (-6, "0101010101011"),
];

/// Longest codeword of the fixed table
pub const MAX_TABLE_CODE_LEN: usize = 13;

/// Variable length bit string (1 to 32 bits)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codeword {
  bits: BitArray32,
}

impl Codeword {
  pub fn from_bits(bits: BitArray32) -> Self {
    Self { bits }
  }

  /// Codeword with the `nbits` least significant bits of `value`
  pub fn from_lsb(nbits: usize, value: u32) -> Self {
    Self {
      bits: BitArray32::from_lsb(nbits, value),
    }
  }

  pub fn len(&self) -> usize {
    self.bits.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bits.is_empty()
  }

  pub fn bits(&self) -> &BitArray32 {
    &self.bits
  }

  /// Value of the codeword read as base-2 number
  pub fn value(&self) -> u32 {
    self.bits.get_lsb()
  }

  /// True if this codeword belongs to the fixed table
  pub fn is_tabulated(&self) -> bool {
    TABLE.decode.contains_key(self)
  }
}

impl Display for Codeword {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Display::fmt(&self.bits, f)
  }
}

impl FromStr for Codeword {
  type Err = PredcodecError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    if s.is_empty() || s.len() > u32::BITS as usize {
      return Err(PredcodecError::InvalidCodeword(format!("'{}' must have 1 to 32 bits", s)));
    }
    let mut bits = BitArray32::new();
    for c in s.chars() {
      match c {
        '0' => bits.push(false),
        '1' => bits.push(true),
        _ => return Err(PredcodecError::InvalidCodeword(format!("'{}' is not a binary string", s))),
      }
    }
    Ok(Self { bits })
  }
}

impl Serialize for Codeword {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.collect_str(self)
  }
}

/// Result of a table lookup
///
/// `Fallback` marks values that are outside the fixed table and
/// were converted with the plain binary rule instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
  Table(T),
  Fallback(T),
}

impl<T> Lookup<T> {
  pub fn value(&self) -> &T {
    match self {
      Self::Table(v) | Self::Fallback(v) => v,
    }
  }

  pub fn into_inner(self) -> T {
    match self {
      Self::Table(v) | Self::Fallback(v) => v,
    }
  }

  pub fn is_fallback(&self) -> bool {
    matches!(self, Self::Fallback(_))
  }
}

/// Bidirectional residual <-> codeword mapping
struct FixedTable {
  encode: HashMap<i32, Codeword>,
  decode: HashMap<Codeword, i32>,
}

impl FixedTable {
  fn new() -> Self {
    let mut encode = HashMap::with_capacity(FIXED_TABLE.len());
    let mut decode = HashMap::with_capacity(FIXED_TABLE.len());
    for (value, code) in FIXED_TABLE {
      let bits = code.bytes().fold(BitArray32::new(), |mut acc, b| {
        acc.push(b == b'1');
        acc
      });
      let cw = Codeword::from_bits(bits);
      encode.insert(value, cw);
      decode.insert(cw, value);
    }
    Self { encode, decode }
  }
}

lazy_static! {
  static ref TABLE: FixedTable = FixedTable::new();
}

/// Plain binary representation for values without table entry.
/// Non-negative values use the minimal number of digits, negative
/// values their 32 bit two's complement.
fn fallback_encode(value: i32) -> Codeword {
  let raw = value as u32;
  let nbits = if value < 0 { u32::BITS } else { (u32::BITS - raw.leading_zeros()).max(1) };
  Codeword::from_lsb(nbits as usize, raw)
}

/// Inverse of `fallback_encode`. The codeword is read as base-2
/// number (left padding with zeros to 8 bits leaves the value as is),
/// a 32 bit codeword with the first bit set is negative.
fn fallback_decode(cw: &Codeword) -> i32 {
  cw.value() as i32
}

/// Encode a single residual
pub fn encode(value: i32) -> Lookup<Codeword> {
  match TABLE.encode.get(&value) {
    Some(cw) => Lookup::Table(*cw),
    None => {
      let cw = fallback_encode(value);
      warn!("Residual {} is outside the fixed Huffman table, using plain binary {}", value, cw);
      Lookup::Fallback(cw)
    }
  }
}

/// Decode a single codeword
pub fn decode(cw: &Codeword) -> Lookup<i32> {
  match TABLE.decode.get(cw) {
    Some(value) => Lookup::Table(*value),
    None => {
      let value = fallback_decode(cw);
      warn!("Codeword {} is not in the fixed Huffman table, read as plain binary {}", cw, value);
      Lookup::Fallback(value)
    }
  }
}

/// Parse and decode a textual codeword
pub fn decode_str(code: &str) -> Result<Lookup<i32>> {
  Ok(decode(&code.parse::<Codeword>()?))
}

/// Look up a table codeword only, without fallback
pub(crate) fn decode_table(cw: &Codeword) -> Option<i32> {
  TABLE.decode.get(cw).copied()
}

pub fn encode_grid(residuals: &ResidualGrid) -> CodewordGrid {
  let codes = residuals.map(|v| encode(v).into_inner());
  #[cfg(feature = "inspector")]
  for (row, col, cw) in codes.cells() {
    inspector!("encode [{},{}]: {}", row, col, cw);
  }
  codes
}

pub fn decode_grid(codes: &CodewordGrid) -> ResidualGrid {
  Grid::from_fn(|row, col| {
    let value = decode(&codes.at(row, col)).into_inner();
    inspector!("decode [{},{}]: {}", row, col, value);
    value
  })
}

/// Count of codewords that are not part of the fixed table
pub fn fallback_count(codes: &CodewordGrid) -> usize {
  codes.pixels().iter().filter(|cw| !cw.is_tabulated()).count()
}

/// Sum of all codeword lengths in bits
pub fn compressed_bits(codes: &CodewordGrid) -> usize {
  codes.pixels().iter().map(Codeword::len).sum()
}
