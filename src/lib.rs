// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! LP-8x4x FPGA Interrupt Controller
//!
//! Driver for the secondary interrupt controller found in the FPGA of the
//! ICP DAS LP-8x4x industrial controllers. The FPGA collects up to 16
//! board sources (backplane slots, timers, hotplug, battery and serial
//! ports) and signals them to the SoC over a single edge-triggered GPIO
//! line. This crate demultiplexes that cascade line back into 16 logical
//! interrupts.
//!
//! # Layout
//!
//! - [`reg`]: byte-wide register window and the hardware seam
//! - [`spinlock`]: the interrupt-saving lock shared with the cascade
//! - [`platform`]: resources handed over by the platform bus
//! - [`dev::interrupt::lp8x4x`]: the controller itself (shadow enable
//!   state, irq chip operations, domain and dispatch loop)
//!
//! # Usage
//!
//! ```ignore
//! let irq = Lp8x4xIrq::probe(&resources, &host, |region| {
//!     let base = map_device_memory(region.start, region.size)?;
//!     Some(unsafe { MmioRegion::new(base) })
//! })?;
//! irq.request_irq(HwIrq::TIMER1, |chip: &Lp8x4xIrq<_>, hwirq| {
//!     // quiet the device, then re-arm the source
//!     chip.unmask(hwirq.get());
//! })?;
//!
//! // from the SoC GPIO 3 chained handler:
//! irq.handle_cascade();
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub mod debug;

pub mod bits;
pub mod dev;
pub mod err;
pub mod platform;
pub mod reg;
pub mod spinlock;

#[cfg(test)]
pub(crate) mod testing;

pub use dev::interrupt::lp8x4x::{
    AckPolicy, ControllerConfig, DispatchReport, HwIrq, IrqGroup, IrqSet, Lp8x4xIrq,
};
pub use dev::interrupt::{CascadeHost, IrqChip, IrqHandler, Trigger};
pub use err::{Error, Result};
pub use platform::{MemResource, PlatformResources};
pub use reg::{MmioRegion, Register, RegisterBus};
pub use spinlock::IrqSaveOps;
