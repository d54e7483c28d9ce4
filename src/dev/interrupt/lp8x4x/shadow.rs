// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Shadow Enable State
//!
//! ENHILVINT and ENSYSINT are written as whole bytes, and ENSYSINT is
//! shared by the secondary and primary groups. The driver keeps the
//! enabled bits in memory and always writes the full shadow value, so a
//! write for one source never drops another source's bit.
//!
//! The shadow lives behind the controller's register lock; every method
//! here expects that lock to be held.

use crate::bits;
use crate::reg::{RegisterBlock, RegisterBus};

use super::map::{EnableReg, HwIrq, IrqSet};

/// In-memory copy of the two enable registers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadowEnable {
    /// Mirrors ENHILVINT, bit n for hwirq n (0-7)
    pub high_level: u8,
    /// Mirrors ENSYSINT, bit n-8 for hwirq n (8-15)
    pub secondary: u8,
}

impl ShadowEnable {
    pub const fn new() -> Self {
        Self {
            high_level: 0,
            secondary: 0,
        }
    }

    /// Set or clear the enable bit of `hwirq` and push the owning
    /// register's full shadow value to hardware
    pub fn set_enabled<B: RegisterBus>(&mut self, regs: &RegisterBlock<B>, hwirq: HwIrq, on: bool) {
        let src = hwirq.source();
        let shadow = match src.enable {
            EnableReg::HighLevel => &mut self.high_level,
            EnableReg::System => &mut self.secondary,
        };
        *shadow = bits::assign_bit8(*shadow, src.bit, on);
        regs.write_register(src.enable.register(), *shadow);
    }

    /// Enabled sources as a 16-bit set
    #[inline]
    pub fn enabled(&self) -> IrqSet {
        IrqSet::from_bits_retain(self.high_level as u16 | (self.secondary as u16) << 8)
    }

    #[inline]
    pub fn is_enabled(&self, hwirq: HwIrq) -> bool {
        self.enabled().contains_irq(hwirq)
    }

    /// Forget every enabled source; the caller rewrites the registers
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
