// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Bit Manipulation Utilities
//!
//! Byte- and halfword-sized helpers for working with the FPGA's 8-bit
//! registers and the 16-bit logical interrupt bitmap.

/// Single bit mask in a byte register
///
/// `bit` must be below 8.
#[inline]
pub const fn bit8(bit: u32) -> u8 {
    1u8 << bit
}

/// Set or clear a bit in a byte
#[inline]
pub const fn assign_bit8(value: u8, bit: u32, on: bool) -> u8 {
    if on {
        value | bit8(bit)
    } else {
        value & !bit8(bit)
    }
}

/// Check if a bit is set
#[inline]
pub const fn is_bit_set(value: u16, bit: u32) -> bool {
    (value & (1u16 << bit)) != 0
}

/// Iterator over the set bits of a halfword, lowest first
#[derive(Debug, Clone, Copy)]
pub struct SetBits(u16);

impl Iterator for SetBits {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.0 == 0 {
            return None;
        }
        let n = self.0.trailing_zeros();
        // Clear lowest set bit
        self.0 &= self.0 - 1;
        Some(n)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

/// Walk the set bits of `value` in ascending order
#[inline]
pub const fn for_each_set_bit(value: u16) -> SetBits {
    SetBits(value)
}
