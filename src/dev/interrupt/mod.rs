// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Interrupt Controllers
//!
//! Secondary (cascaded) interrupt controllers and the contracts they share
//! with the primary SoC controller:
//!
//! - [`IrqChip`]: per-source mask/unmask/ack operations
//! - [`IrqHandler`]: what a driver installs for one logical source
//! - [`CascadeHost`]: the primary controller side that owns the physical
//!   cascade line and the system-wide interrupt numbers

pub mod lp8x4x;

pub use lp8x4x::HwIrq;

use crate::err::Result;

/// Interrupt trigger mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    EdgeRising,
    EdgeFalling,
    LevelHigh,
    LevelLow,
}

/// Per-source operations of an interrupt chip
///
/// Source numbers are chip-local. Numbers the chip does not own are a
/// caller error: implementations log and ignore them.
pub trait IrqChip {
    /// Chip name
    fn name(&self) -> &'static str;

    /// Stop a source from raising the cascade
    fn mask(&self, hwirq: u32);

    /// Allow a source to raise the cascade
    fn unmask(&self, hwirq: u32);

    /// Acknowledge a source
    fn ack(&self, hwirq: u32);

    /// Acknowledge and mask in one step
    fn mask_ack(&self, hwirq: u32);
}

/// Handler for one logical interrupt of chip `C`
///
/// Runs in the cascade handler's context with no driver lock held, so it
/// may call back into the chip.
pub trait IrqHandler<C: ?Sized>: Send + Sync {
    fn handle(&self, chip: &C, hwirq: HwIrq);
}

impl<C: ?Sized, F> IrqHandler<C> for F
where
    F: Fn(&C, HwIrq) + Send + Sync,
{
    #[inline]
    fn handle(&self, chip: &C, hwirq: HwIrq) {
        self(chip, hwirq)
    }
}

/// Primary interrupt controller, as seen by a cascaded chip
///
/// The host allocates the system-wide interrupt numbers for the chip's
/// sources and routes the physical cascade line to the chip's dispatch
/// entry point.
pub trait CascadeHost {
    /// Allocate `count` consecutive interrupt descriptors, returning the
    /// first interrupt number
    fn alloc_descs(&self, count: u32) -> Result<u32>;

    /// Release descriptors from [`CascadeHost::alloc_descs`]
    fn free_descs(&self, base: u32, count: u32);

    /// Route `line` to the cascaded chip with the given trigger
    fn set_chained_handler(&self, line: u32, trigger: Trigger) -> Result<()>;

    /// Stop routing `line`
    fn remove_chained_handler(&self, line: u32);
}
