// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Platform Resources
//!
//! What the platform bus hands to the driver at attach time: one memory
//! region holding the register window and one interrupt line on the SoC
//! controller that carries the cascade.

use crate::err::{Error, Result};
use crate::reg::IRQ_MEM_SIZE;

/// Device tree compatible string
pub const COMPATIBLE: &str = "icpdas,irq-lp8x4x";

/// Platform driver name
pub const DRIVER_NAME: &str = "irq-lp8x4x";

/// A memory resource (physical or already mapped, at the bus's choice)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemResource {
    pub start: usize,
    pub size: usize,
}

impl MemResource {
    pub const fn new(start: usize, size: usize) -> Self {
        Self { start, size }
    }
}

/// Resources of one controller instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformResources {
    /// Register region (resource 0)
    pub mem: Option<MemResource>,
    /// Cascade line on the SoC interrupt controller (resource 0)
    pub irq: Option<u32>,
}

impl PlatformResources {
    pub const fn new(mem: MemResource, irq: u32) -> Self {
        Self {
            mem: Some(mem),
            irq: Some(irq),
        }
    }

    /// Register region, checked to cover the whole register window
    pub fn register_region(&self) -> Result<MemResource> {
        let mem = self.mem.ok_or(Error::MissingMemResource)?;
        if mem.size < IRQ_MEM_SIZE {
            return Err(Error::RegionTooSmall { size: mem.size });
        }
        Ok(mem)
    }

    /// Cascade interrupt line
    pub fn cascade_line(&self) -> Result<u32> {
        self.irq.ok_or(Error::MissingIrqResource)
    }
}

/// Whether a device tree node with `compatible` belongs to this driver
pub fn matches(compatible: &str) -> bool {
    compatible == COMPATIBLE
}
