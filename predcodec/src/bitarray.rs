// SPDX-License-Identifier: LGPL-2.1

use std::fmt::{Display, Write};

/// Bit string of up to 32 bits, stored left aligned
/// (the first bit is the MSB of `storage`).
///
/// Length is part of the identity: `1` and `01` are different strings.
/// Ordering is by length first, then by value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitArray32 {
  nbits: u8,
  storage: u32,
}

const CAPACITY: usize = u32::BITS as usize;

impl BitArray32 {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.nbits as usize
  }

  pub fn is_empty(&self) -> bool {
    self.nbits == 0
  }

  pub fn is_full(&self) -> bool {
    self.len() == CAPACITY
  }

  /// Left aligned bits, unused low bits are zero
  pub fn storage(&self) -> u32 {
    self.storage
  }

  /// Append a bit at the end. Panics if all 32 bits are in use.
  pub fn push(&mut self, bit: bool) {
    assert!(!self.is_full(), "BitArray32 is full");
    self.nbits += 1;
    if bit {
      self.storage |= 1 << (CAPACITY - self.len());
    }
  }

  /// Bit at `idx`, counted from the first (leftmost) bit.
  pub fn get(&self, idx: usize) -> Option<bool> {
    (idx < self.len()).then(|| self.storage & (1 << (CAPACITY - 1 - idx)) != 0)
  }

  /// Iterate bits from first to last.
  pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
    (0..self.len()).filter_map(move |idx| self.get(idx))
  }

  /// Bits read as right aligned number
  pub fn get_lsb(&self) -> u32 {
    match self.nbits {
      0 => 0,
      n => self.storage >> (CAPACITY - n as usize),
    }
  }

  /// Take the `nbits` least significant bits of `value`
  pub fn from_lsb(nbits: usize, value: u32) -> Self {
    debug_assert!(nbits <= CAPACITY);
    match nbits {
      0 => Self::new(),
      _ => Self {
        nbits: nbits as u8,
        storage: value << (CAPACITY - nbits),
      },
    }
  }
}

impl Display for BitArray32 {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for bit in self.iter() {
      f.write_char(if bit { '1' } else { '0' })?;
    }
    Ok(())
  }
}
