// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ICP DAS LP-8x4x FPGA Interrupt Controller
//!
//! The FPGA on the LP-8x4x collects 16 board sources and raises a single
//! rising edge on SoC GPIO 3 while any enabled source is pending. This
//! driver owns the FPGA side of that cascade: it keeps the enable
//! registers consistent, implements mask/unmask/ack for each source and
//! drains pending sources when the host calls
//! [`Lp8x4xIrq::handle_cascade`].
//!
//! # Sources
//!
//! | hwirq | Source             |
//! |-------|--------------------|
//! | 0-7   | Backplane slot 1-8 |
//! | 8, 9  | Timer 1, 2         |
//! | 10    | Timer out          |
//! | 11    | Hotplug            |
//! | 12    | Battery low        |
//! | 13-15 | COM2-COM4          |
//!
//! # Locking
//!
//! One spinlock guards the shadow enable masks and every register
//! read-modify-write sequence. It is taken with local interrupts saved
//! through the configured [`IrqSaveOps`], so the cascade cannot fire on
//! the CPU holding it. It is never held while a source handler runs, so
//! handlers may mask, unmask and ack sources themselves. The scan reads
//! the enabled set from an atomic copy and never waits for the lock.

mod chip;
mod dispatch;
pub mod domain;
pub mod map;
pub mod shadow;

use core::num::NonZeroU32;
use core::sync::atomic::{AtomicU16, Ordering};

use alloc::sync::Arc;

use crate::dev::interrupt::{CascadeHost, IrqHandler, Trigger};
use crate::err::{Error, Result};
use crate::platform::{MemResource, PlatformResources};
use crate::reg::{Register, RegisterBlock, RegisterBus, IRQ_MEM_SIZE};
use crate::spinlock::{IrqSaveOps, SpinLockIrqSave};

pub use dispatch::DispatchReport;
pub use domain::{HandlerTable, IrqDomain};
pub use map::{HwIrq, IrqGroup, IrqSet, SourceMap, NR_IRQS};
pub use shadow::ShadowEnable;

/// Chip name
pub const CHIP_NAME: &str = "FPGA";

/// Default bound on drain passes per cascade activation
pub const DEFAULT_SCAN_LIMIT: u32 = 1024;

/// Registers written to 0 at attach and detach, in order
const RESET_SEQUENCE: [Register; 9] = [
    Register::ClrRiseInt,
    Register::EnRiseInt,
    Register::ClrFallInt,
    Register::EnFallInt,
    Register::ClrHiLvInt,
    Register::EnHiLvInt,
    Register::EnSysInt,
    Register::SecoInt,
    Register::PrimInt,
];

/// What `ack` does
///
/// The sources are level triggered: a source must stay quiet until its
/// device condition is gone and a driver re-unmasks it. With
/// [`AckPolicy::MaskOnAck`] acknowledging a source therefore masks it,
/// and the following unmask clears whatever was latched meanwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckPolicy {
    /// ack masks the source
    #[default]
    MaskOnAck,
    /// ack clears the latched pending bit and leaves the enable alone
    ClearPending,
}

/// Controller configuration
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    /// Register window
    pub region: MemResource,
    /// SoC interrupt line carrying the cascade
    pub cascade_line: u32,
    pub ack_policy: AckPolicy,
    /// Drain passes allowed per cascade activation; `None` drains until
    /// nothing is pending
    pub scan_limit: Option<NonZeroU32>,
    /// Local interrupt save/restore around the register lock
    pub irq_save: IrqSaveOps,
}

impl ControllerConfig {
    pub const fn new(region: MemResource, cascade_line: u32) -> Self {
        Self {
            region,
            cascade_line,
            ack_policy: AckPolicy::MaskOnAck,
            scan_limit: NonZeroU32::new(DEFAULT_SCAN_LIMIT),
            irq_save: IrqSaveOps::NONE,
        }
    }

    /// Build a configuration from the platform's resources
    pub fn from_resources(resources: &PlatformResources) -> Result<Self> {
        let region = resources.register_region()?;
        let cascade_line = resources.cascade_line()?;
        Ok(Self::new(region, cascade_line))
    }

    pub const fn with_ack_policy(mut self, policy: AckPolicy) -> Self {
        self.ack_policy = policy;
        self
    }

    pub const fn with_scan_limit(mut self, limit: Option<NonZeroU32>) -> Self {
        self.scan_limit = limit;
        self
    }

    /// Hooks that disable local interrupts while the register lock is
    /// held; required whenever thread context masks or unmasks sources on
    /// the CPU that takes the cascade
    pub const fn with_irq_save(mut self, ops: IrqSaveOps) -> Self {
        self.irq_save = ops;
        self
    }
}

/// LP-8x4x FPGA interrupt controller state
pub struct Lp8x4xIrq<B: RegisterBus> {
    regs: RegisterBlock<B>,
    /// Register lock and shadow enable masks
    shadow: SpinLockIrqSave<ShadowEnable>,
    /// Copy of the shadow's enabled set, written under the lock
    enabled: AtomicU16,
    domain: IrqDomain,
    handlers: HandlerTable<Lp8x4xIrq<B>>,
    cascade_line: u32,
    ack_policy: AckPolicy,
    scan_limit: Option<NonZeroU32>,
}

impl<B: RegisterBus> Lp8x4xIrq<B> {
    /// Attach to the controller described by `resources`
    ///
    /// `map` turns the register region into a bus, typically by mapping
    /// it into the kernel address space.
    pub fn probe<H, M>(resources: &PlatformResources, host: &H, map: M) -> Result<Self>
    where
        H: CascadeHost + ?Sized,
        M: FnOnce(MemResource) -> Option<B>,
    {
        let config = ControllerConfig::from_resources(resources).map_err(|e| {
            log_error!("LP8X4X: bad resources: {}", e);
            e
        })?;
        Self::probe_with(config, host, map)
    }

    /// Attach with an explicit configuration
    ///
    /// On failure everything acquired so far is released and the cascade
    /// line is left unrouted.
    pub fn probe_with<H, M>(config: ControllerConfig, host: &H, map: M) -> Result<Self>
    where
        H: CascadeHost + ?Sized,
        M: FnOnce(MemResource) -> Option<B>,
    {
        if config.region.size < IRQ_MEM_SIZE {
            log_error!("LP8X4X: register region too small: {:#x}", config.region.size);
            return Err(Error::RegionTooSmall {
                size: config.region.size,
            });
        }

        let bus = map(config.region).ok_or_else(|| {
            log_error!("LP8X4X: failed to map {:#x}", config.region.start);
            Error::MapFailed
        })?;

        let virq_base = host.alloc_descs(NR_IRQS).map_err(|e| {
            log_error!("LP8X4X: failed to allocate irq descriptors: {}", e);
            e
        })?;
        let Some(virq_end) = virq_base.checked_add(NR_IRQS) else {
            log_error!("LP8X4X: irq range at {} does not fit", virq_base);
            host.free_descs(virq_base, NR_IRQS);
            return Err(Error::NoDescriptors);
        };

        let chip = Self {
            regs: RegisterBlock::new(bus),
            shadow: SpinLockIrqSave::new(ShadowEnable::new(), config.irq_save),
            enabled: AtomicU16::new(0),
            domain: IrqDomain::new(virq_base),
            handlers: HandlerTable::new(),
            cascade_line: config.cascade_line,
            ack_policy: config.ack_policy,
            scan_limit: config.scan_limit,
        };
        chip.reset();

        if let Err(e) = host.set_chained_handler(config.cascade_line, Trigger::EdgeRising) {
            log_error!(
                "LP8X4X: failed to chain irq {}: {}",
                config.cascade_line,
                e
            );
            host.free_descs(virq_base, NR_IRQS);
            return Err(e);
        }

        log_info!(
            "LP8X4X: base={:#x} cascade={} irqs={}..{}",
            config.region.start,
            config.cascade_line,
            virq_base,
            virq_end
        );

        Ok(chip)
    }

    /// Detach from the host and return the bus
    ///
    /// The cascade is unrouted first, then every source is masked and the
    /// register file put back into its reset state, then the system
    /// interrupt numbers are released.
    pub fn remove<H: CascadeHost + ?Sized>(self, host: &H) -> B {
        host.remove_chained_handler(self.cascade_line);
        self.reset();
        self.handlers.clear();
        host.free_descs(self.domain.virq_base(), NR_IRQS);
        log_info!("LP8X4X: removed, cascade={}", self.cascade_line);
        self.regs.into_bus()
    }

    /// Mask everything, disarm everything and forget the shadow state
    fn reset(&self) {
        let mut shadow = self.shadow.lock();
        for reg in RESET_SEQUENCE {
            self.regs.write_register(reg, 0);
        }
        shadow.clear();
        self.publish_enabled(&shadow);
    }

    /// Refresh the lock-free enabled set; called with the lock held
    fn publish_enabled(&self, shadow: &ShadowEnable) {
        self.enabled.store(shadow.enabled().bits(), Ordering::Release);
    }

    /// Install `handler` for `hwirq`
    ///
    /// The source stays masked; the caller unmasks it once the device is
    /// ready.
    pub fn request_irq<F>(&self, hwirq: HwIrq, handler: F) -> Result<()>
    where
        F: IrqHandler<Self> + 'static,
    {
        self.handlers.insert(hwirq, Arc::new(handler))?;
        log_debug!(
            "LP8X4X: handler installed for irq {} (virq {:?})",
            hwirq,
            self.domain.find_mapping(hwirq)
        );
        Ok(())
    }

    /// Mask `hwirq` and drop its handler
    pub fn free_irq(&self, hwirq: HwIrq) {
        self.mask(hwirq.get());
        if !self.handlers.remove(hwirq) {
            log_warn!("LP8X4X: freeing unrequested irq {}", hwirq);
        }
    }

    /// Register window
    pub fn registers(&self) -> &RegisterBlock<B> {
        &self.regs
    }

    pub fn domain(&self) -> &IrqDomain {
        &self.domain
    }

    pub fn cascade_line(&self) -> u32 {
        self.cascade_line
    }

    pub fn ack_policy(&self) -> AckPolicy {
        self.ack_policy
    }

    /// Current shadow enable masks
    pub fn shadow(&self) -> ShadowEnable {
        *self.shadow.lock()
    }

    /// Sources currently enabled, read without taking the lock
    pub fn enabled(&self) -> IrqSet {
        IrqSet::from_bits_retain(self.enabled.load(Ordering::Acquire))
    }
}
