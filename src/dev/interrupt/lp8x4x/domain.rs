// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Interrupt Domain
//!
//! Translation between the FPGA's local source numbers and the system
//! interrupt numbers the host allocated for them, plus the table of
//! handlers drivers installed per source.

use alloc::sync::Arc;

use spin::Mutex;

use crate::dev::interrupt::IrqHandler;
use crate::err::{Error, Result};

use super::map::{HwIrq, NR_IRQS};

/// Linear 1:1 mapping of hwirq onto a block of system interrupt numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqDomain {
    virq_base: u32,
}

impl IrqDomain {
    pub const fn new(virq_base: u32) -> Self {
        Self { virq_base }
    }

    /// First system interrupt number of the domain
    pub const fn virq_base(&self) -> u32 {
        self.virq_base
    }

    /// Number of mapped sources
    pub const fn size(&self) -> u32 {
        NR_IRQS
    }

    /// System interrupt number of `hwirq`
    pub fn find_mapping(&self, hwirq: HwIrq) -> Option<u32> {
        self.virq_base.checked_add(hwirq.get())
    }

    /// Local source behind a system interrupt number
    pub fn hwirq_of(&self, virq: u32) -> Option<HwIrq> {
        virq.checked_sub(self.virq_base).and_then(HwIrq::new)
    }

    /// Translate a one-cell device tree interrupt specifier
    pub fn xlate_onecell(&self, intspec: &[u32]) -> Result<HwIrq> {
        let &hwirq = intspec.first().ok_or(Error::InvalidHwIrq(u32::MAX))?;
        HwIrq::new(hwirq).ok_or(Error::InvalidHwIrq(hwirq))
    }
}

/// Handlers installed for the sources of chip `C`
pub struct HandlerTable<C: ?Sized> {
    slots: Mutex<[Option<Arc<dyn IrqHandler<C>>>; NR_IRQS as usize]>,
}

impl<C: ?Sized> HandlerTable<C> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(core::array::from_fn(|_| None)),
        }
    }

    /// Install `handler` for `hwirq` if the slot is free
    pub fn insert(&self, hwirq: HwIrq, handler: Arc<dyn IrqHandler<C>>) -> Result<()> {
        let mut slots = self.slots.lock();
        let slot = &mut slots[hwirq.get() as usize];
        if slot.is_some() {
            return Err(Error::AlreadyRegistered(hwirq));
        }
        *slot = Some(handler);
        Ok(())
    }

    /// Remove the handler for `hwirq`, returning whether one was present
    pub fn remove(&self, hwirq: HwIrq) -> bool {
        self.slots.lock()[hwirq.get() as usize].take().is_some()
    }

    /// Handler for `hwirq`; the table lock is released before returning
    pub fn get(&self, hwirq: HwIrq) -> Option<Arc<dyn IrqHandler<C>>> {
        self.slots.lock()[hwirq.get() as usize].clone()
    }

    /// Drop every installed handler
    pub fn clear(&self) {
        let mut slots = self.slots.lock();
        for slot in slots.iter_mut() {
            *slot = None;
        }
    }
}

impl<C: ?Sized> Default for HandlerTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
