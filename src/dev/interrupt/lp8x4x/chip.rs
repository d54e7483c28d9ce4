// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Per-source chip operations
//!
//! mask, unmask and ack take the raw source number the interrupt core
//! hands out. Numbers outside 0..16 are logged and ignored.

use crate::dev::interrupt::IrqChip;
use crate::reg::RegisterBus;

use super::map::HwIrq;
use super::{AckPolicy, Lp8x4xIrq, CHIP_NAME};

impl<B: RegisterBus> Lp8x4xIrq<B> {
    fn checked(hwirq: u32, op: &str) -> Option<HwIrq> {
        let irq = HwIrq::new(hwirq);
        if irq.is_none() {
            log_error!("LP8X4X: wrong irq {} in {}", hwirq, op);
        }
        irq
    }

    /// Disable a source. Pending state is left alone.
    pub fn mask(&self, hwirq: u32) {
        let Some(irq) = Self::checked(hwirq, "mask") else {
            return;
        };
        let mut shadow = self.shadow.lock();
        shadow.set_enabled(&self.regs, irq, false);
        self.publish_enabled(&shadow);
    }

    /// Enable a source
    ///
    /// The source's latch is pulsed first: high level sources get their
    /// stale pending bit cleared in CLRHILVINT, secondary and primary
    /// sources are acknowledged and re-armed through SECOINT. Without this
    /// a condition that predates the unmask would dispatch at once.
    pub fn unmask(&self, hwirq: u32) {
        let Some(irq) = Self::checked(hwirq, "unmask") else {
            return;
        };
        let src = irq.source();
        let mut shadow = self.shadow.lock();
        self.regs.write_register(src.arm, src.mask());
        shadow.set_enabled(&self.regs, irq, true);
        self.publish_enabled(&shadow);
    }

    /// Acknowledge a source
    ///
    /// Under [`AckPolicy::MaskOnAck`] this is exactly [`Lp8x4xIrq::mask`]:
    /// a level source stays masked until its driver re-unmasks it. Under
    /// [`AckPolicy::ClearPending`] the source's latched pending bit is
    /// cleared and its enable bit is untouched.
    pub fn ack(&self, hwirq: u32) {
        match self.ack_policy {
            AckPolicy::MaskOnAck => self.mask(hwirq),
            AckPolicy::ClearPending => {
                let Some(irq) = Self::checked(hwirq, "ack") else {
                    return;
                };
                let src = irq.source();
                let _guard = self.shadow.lock();
                self.regs.write_register(src.clear, src.mask());
            }
        }
    }

    /// Mask a source and acknowledge it
    pub fn mask_ack(&self, hwirq: u32) {
        let Some(irq) = Self::checked(hwirq, "mask_ack") else {
            return;
        };
        let src = irq.source();
        let mut shadow = self.shadow.lock();
        shadow.set_enabled(&self.regs, irq, false);
        self.publish_enabled(&shadow);
        if self.ack_policy == AckPolicy::ClearPending {
            self.regs.write_register(src.clear, src.mask());
        }
    }
}

impl<B: RegisterBus> IrqChip for Lp8x4xIrq<B> {
    fn name(&self) -> &'static str {
        CHIP_NAME
    }

    fn mask(&self, hwirq: u32) {
        Lp8x4xIrq::mask(self, hwirq)
    }

    fn unmask(&self, hwirq: u32) {
        Lp8x4xIrq::unmask(self, hwirq)
    }

    fn ack(&self, hwirq: u32) {
        Lp8x4xIrq::ack(self, hwirq)
    }

    fn mask_ack(&self, hwirq: u32) {
        Lp8x4xIrq::mask_ack(self, hwirq)
    }
}
