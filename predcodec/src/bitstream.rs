// SPDX-License-Identifier: LGPL-2.1

//! Packing of codeword grids into a contiguous bitstream

use std::{cmp::min, io::Write};

use byteorder::WriteBytesExt;
use log::debug;
use serde::Serialize;

use crate::{
  PredcodecError, Result,
  grid::{CodewordGrid, GRID_LEN, Grid, ResidualGrid},
  huffman::{self, Codeword, MAX_TABLE_CODE_LEN},
  inspector,
};

/// MSB first bit writer
pub struct BitWriter<'a> {
  inner: &'a mut dyn Write,
  next: u8,
  used: usize,
  written: usize,
}

impl<'a> BitWriter<'a> {
  pub fn new(inner: &'a mut dyn Write) -> Self {
    Self {
      inner,
      next: 0,
      used: 0,
      written: 0,
    }
  }

  /// Write the `bits` least significant bits of `value`
  pub fn write(&mut self, mut bits: usize, value: u64) -> std::io::Result<()> {
    debug_assert!(bits <= 64);
    self.written += bits;
    while bits > 0 {
      // flush buffer if full
      if self.used == 8 {
        self.internal_flush()?;
      }
      // how many bits are free?
      let free = 8 - self.used;
      // take exactly
      let take = min(bits, free);
      // peeked bits from value
      let peek = ((value >> (bits - take)) & ((1 << take) - 1)) as u8;
      // add peeked bits to buffer
      self.next |= peek << (free - take);
      // reduce consumed bits
      bits -= take;
      self.used += take;
    }
    Ok(())
  }

  pub fn write_codeword(&mut self, cw: &Codeword) -> std::io::Result<()> {
    self.write(cw.len(), cw.value() as u64)
  }

  /// Count of bits written so far (without flush padding)
  pub fn bits_written(&self) -> usize {
    self.written
  }

  fn internal_flush(&mut self) -> std::io::Result<()> {
    self.inner.write_u8(self.next)?;
    self.used = 0;
    self.next = 0;
    Ok(())
  }

  /// Write out the pending byte, unused bits are zero
  pub fn flush(&mut self) -> std::io::Result<()> {
    if self.used > 0 {
      self.internal_flush()?;
    }
    Ok(())
  }
}

/// MSB first bit reader
#[derive(Debug, Clone, Copy)]
pub struct BitReader<'a> {
  buffer: &'a [u8],
  pos: usize,
  limit: usize,
}

impl<'a> BitReader<'a> {
  /// Reader over the first `limit` bits of `buffer`
  pub fn new(buffer: &'a [u8], limit: usize) -> Self {
    Self {
      buffer,
      pos: 0,
      limit: min(limit, buffer.len() * 8),
    }
  }

  pub fn get_bit(&mut self) -> Option<bool> {
    if self.pos >= self.limit {
      return None;
    }
    let byte = self.buffer[self.pos >> 3];
    let bit = (byte >> (7 - (self.pos & 7))) & 1;
    self.pos += 1;
    Some(bit == 1)
  }

  pub fn remaining_bits(&self) -> usize {
    self.limit - self.pos
  }
}

/// Codeword grid concatenated into bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedStream {
  pub bytes: Vec<u8>,
  /// Number of valid bits, the last byte is zero padded
  pub bit_len: usize,
}

/// Concatenate all codewords in row-major order
pub fn pack(codes: &CodewordGrid) -> Result<PackedStream> {
  let mut bytes = Vec::with_capacity(GRID_LEN);
  let bit_len = {
    let mut writer = BitWriter::new(&mut bytes);
    for cw in codes.pixels() {
      writer.write_codeword(cw)?;
    }
    writer.flush()?;
    writer.bits_written()
  };
  debug!("Packed {} bits into {} bytes", bit_len, bytes.len());
  Ok(PackedStream { bytes, bit_len })
}

/// Prefix-decode a packed stream with the fixed table.
///
/// Only streams built from table codewords can be decoded, fallback
/// codewords collide with the table prefixes.
pub fn unpack(stream: &PackedStream) -> Result<ResidualGrid> {
  let mut reader = BitReader::new(&stream.bytes, stream.bit_len);
  let mut values = Vec::with_capacity(GRID_LEN);
  for symbol in 0..GRID_LEN {
    let mut cw = Codeword::default();
    let value = loop {
      if cw.len() >= MAX_TABLE_CODE_LEN {
        return Err(PredcodecError::UndecodableStream { symbol });
      }
      let bit = reader.get_bit().ok_or(PredcodecError::UndecodableStream { symbol })?;
      let mut bits = *cw.bits();
      bits.push(bit);
      cw = Codeword::from_bits(bits);
      if let Some(value) = huffman::decode_table(&cw) {
        break value;
      }
    };
    inspector!("unpack symbol {}: {} -> {}", symbol, cw, value);
    values.push(value);
  }
  if reader.remaining_bits() > 0 {
    debug!("{} trailing bits after last symbol", reader.remaining_bits());
  }
  Grid::new_with(values)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::huffman::{compressed_bits, encode_grid};

  #[test]
  fn bitwriter_test1() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut buf = Vec::new();
    let mut bs = BitWriter::new(&mut buf);
    bs.write(1, 0b1)?;
    bs.flush()?;
    bs.write(1, 0b0)?;
    bs.write(3, 0b101)?;
    bs.write(4, 0b11111101)?;
    bs.write(2, 0b101)?;
    bs.flush()?;
    bs.write(16, 0b1111111111111111)?;
    bs.flush()?;
    assert_eq!(bs.bits_written(), 27);
    assert_eq!(buf[0], 0b10000000);
    assert_eq!(buf[1], 0b01011101);
    assert_eq!(buf[2], 0b01000000);
    // No byte stuffing
    assert_eq!(buf[3], 0xFF);
    assert_eq!(buf[4], 0xFF);
    assert_eq!(buf.len(), 5);
    Ok(())
  }

  #[test]
  fn bitreader_limit() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let data = [0b1010_0000u8];
    let mut reader = BitReader::new(&data, 3);
    assert_eq!(reader.get_bit(), Some(true));
    assert_eq!(reader.get_bit(), Some(false));
    assert_eq!(reader.get_bit(), Some(true));
    assert_eq!(reader.get_bit(), None);
    assert_eq!(reader.remaining_bits(), 0);
    Ok(())
  }

  #[test]
  fn pack_unpack_table_codes() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let residuals = Grid::from_fn(|row, col| ((row * 7 + col * 3) % 13) as i32 - 6);
    let codes = encode_grid(&residuals);
    let stream = pack(&codes)?;
    assert_eq!(stream.bit_len, compressed_bits(&codes));
    assert_eq!(stream.bytes.len(), stream.bit_len.div_ceil(8));
    assert_eq!(unpack(&stream)?, residuals);
    Ok(())
  }

  #[test]
  fn pack_zero_grid() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let stream = pack(&encode_grid(&Grid::new()))?;
    assert_eq!(stream.bit_len, 256);
    assert!(stream.bytes.iter().all(|b| *b == 0xFF));
    Ok(())
  }

  #[test]
  fn unpack_truncated_stream() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut stream = pack(&encode_grid(&Grid::new()))?;
    stream.bit_len = 100;
    assert_eq!(unpack(&stream), Err(PredcodecError::UndecodableStream { symbol: 100 }));
    Ok(())
  }

  #[test]
  fn unpack_with_fallback_is_misread() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    // "111" for 7 is read as three zero residuals
    let mut residuals = ResidualGrid::new();
    *residuals.at_mut(0, 0) = 7;
    let stream = pack(&encode_grid(&residuals))?;
    assert_eq!(stream.bit_len, 258);
    assert!(matches!(unpack(&stream), Ok(grid) if grid != residuals));
    Ok(())
  }
}
