// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Cascade dispatch
//!
//! One rising edge on the cascade line means "at least one enabled source
//! is pending". The handler scans the three pending registers, runs the
//! handler of every pending and enabled source in ascending order, and
//! scans again until a pass finds nothing. Sources are level triggered,
//! so anything that re-asserted while handlers ran is picked up by the
//! next pass instead of being lost. A single EOI strobe closes the
//! activation and lets the FPGA raise a new edge.

use crate::reg::{Register, RegisterBus, PRIMINT_MASK, SECOINT_MASK};

use super::map::IrqSet;
use super::Lp8x4xIrq;

/// Outcome of one cascade activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Scans that found pending sources
    pub passes: u32,
    /// Handler invocations across all passes
    pub dispatched: u32,
    /// Pending sources that had no handler and were masked
    pub spurious: IrqSet,
    /// Sources still pending when the scan limit stopped the drain
    pub stuck: Option<IrqSet>,
}

impl<B: RegisterBus> Lp8x4xIrq<B> {
    /// Pending and enabled sources, as one scan sees them
    ///
    /// Does not take the register lock, so a cascade arriving while thread
    /// context holds it still makes progress.
    pub fn pending(&self) -> IrqSet {
        let mut mask = self.regs.read_register(Register::ClrHiLvInt) as u16;
        mask |= ((self.regs.read_register(Register::SecoInt) & SECOINT_MASK) as u16) << 8;
        mask |= ((self.regs.read_register(Register::PrimInt) & PRIMINT_MASK) as u16) << 8;
        IrqSet::from_bits_retain(mask) & self.enabled()
    }

    /// Cascade line handler
    ///
    /// Called by the host for every rising edge on the cascade line.
    /// Handlers run without any driver lock held. A handler that never
    /// quiets its source keeps the drain going; with a scan limit
    /// configured the drain gives up after that many passes, reports the
    /// source as stuck and still closes the activation.
    pub fn handle_cascade(&self) -> DispatchReport {
        let mut report = DispatchReport {
            passes: 0,
            dispatched: 0,
            spurious: IrqSet::empty(),
            stuck: None,
        };

        loop {
            let pending = self.pending();
            if pending.is_empty() {
                break;
            }
            if let Some(limit) = self.scan_limit {
                if report.passes >= limit.get() {
                    log_error!(
                        "LP8X4X: stuck interrupt source(s) {:#06x} after {} passes",
                        pending.bits(),
                        report.passes
                    );
                    report.stuck = Some(pending);
                    break;
                }
            }
            report.passes += 1;
            log_trace!("LP8X4X: pass {} pending {:#06x}", report.passes, pending.bits());

            for irq in pending.irqs() {
                if self.domain.find_mapping(irq).is_none() {
                    panic!("LP8X4X: no mapping for irq {}", irq);
                }
                match self.handlers.get(irq) {
                    Some(handler) => {
                        handler.handle(self, irq);
                        report.dispatched += 1;
                    }
                    None => {
                        log_warn!("LP8X4X: spurious irq {}, masking", irq);
                        self.mask(irq.get());
                        report.spurious |= IrqSet::from_irq(irq);
                    }
                }
            }
        }

        self.regs.write_register(Register::Eoi, 0);
        report
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU32;
    use core::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use alloc::sync::Arc;

    use super::super::{ControllerConfig, HwIrq};
    use super::*;
    use crate::platform::MemResource;
    use crate::testing::{FakeFpga, FakeHost};

    type Chip = Lp8x4xIrq<Arc<FakeFpga>>;

    fn setup(limit: Option<u32>) -> (Arc<FakeFpga>, Chip) {
        let fpga = FakeFpga::shared();
        let host = FakeHost::new(0);
        let config = ControllerConfig::new(MemResource::new(0x1700_4000, 0x16), 3)
            .with_scan_limit(limit.and_then(NonZeroU32::new));
        let chip = Lp8x4xIrq::probe_with(config, &host, |_| Some(fpga.clone())).unwrap();
        (fpga, chip)
    }

    /// Handler that records its source and quiets the device
    fn quieting(fpga: &Arc<FakeFpga>, log: &Arc<Mutex<Vec<HwIrq>>>) -> impl Fn(&Chip, HwIrq) + Send + Sync {
        let fpga = fpga.clone();
        let log = log.clone();
        move |_chip: &Chip, irq: HwIrq| {
            log.lock().unwrap().push(irq);
            fpga.lower(irq);
        }
    }

    #[test]
    fn test_nothing_pending_still_eoi() {
        let (fpga, chip) = setup(None);
        let report = chip.handle_cascade();
        assert_eq!(report.passes, 0);
        assert_eq!(report.dispatched, 0);
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_pending_masked_source_not_dispatched() {
        let (fpga, chip) = setup(None);
        let log = Arc::new(Mutex::new(Vec::new()));
        chip.request_irq(HwIrq::TIMER1, quieting(&fpga, &log)).unwrap();
        fpga.raise(HwIrq::TIMER1);

        let report = chip.handle_cascade();
        assert_eq!(report.passes, 0);
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_single_source_round_trip() {
        let (fpga, chip) = setup(None);
        let log = Arc::new(Mutex::new(Vec::new()));
        chip.request_irq(HwIrq::SLOT4, quieting(&fpga, &log)).unwrap();
        chip.unmask(HwIrq::SLOT4.get());
        fpga.raise(HwIrq::SLOT4);
        assert_eq!(chip.pending(), IrqSet::from_irq(HwIrq::SLOT4));

        let report = chip.handle_cascade();
        assert_eq!(*log.lock().unwrap(), vec![HwIrq::SLOT4]);
        assert_eq!(report.passes, 1);
        assert_eq!(report.dispatched, 1);
        assert_eq!(report.stuck, None);
        assert!(chip.pending().is_empty());
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_mixed_groups_dispatch_ascending_with_one_eoi() {
        let (fpga, chip) = setup(None);
        let log = Arc::new(Mutex::new(Vec::new()));
        for irq in [HwIrq::SLOT1, HwIrq::COM2] {
            chip.request_irq(irq, quieting(&fpga, &log)).unwrap();
            chip.unmask(irq.get());
        }
        fpga.set(Register::ClrHiLvInt, 0b0000_0001);
        // Bits outside 0xe0 in PRIMINT are not sources.
        fpga.set(Register::PrimInt, 0b0010_0011);

        let report = chip.handle_cascade();
        assert_eq!(*log.lock().unwrap(), vec![HwIrq::SLOT1, HwIrq::COM2]);
        assert_eq!(report.passes, 1);
        assert_eq!(fpga.eoi_count(), 1);
        assert_eq!(fpga.writes().last(), Some(&(Register::Eoi, 0)));
    }

    #[test]
    fn test_secoint_upper_bits_ignored() {
        let (fpga, chip) = setup(None);
        // hwirq 13 enabled, but its pending bit lives in PRIMINT, not SECOINT
        chip.unmask(HwIrq::COM2.get());
        fpga.set(Register::SecoInt, 0b0010_0000);
        assert!(chip.pending().is_empty());
    }

    #[test]
    fn test_rearming_handler_causes_extra_pass() {
        let (fpga, chip) = setup(None);
        let calls = Arc::new(AtomicU32::new(0));
        {
            let fpga = fpga.clone();
            let calls = calls.clone();
            chip.request_irq(HwIrq::TIMER2, move |_: &Chip, irq: HwIrq| {
                // First run re-triggers the source, second run quiets it.
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    fpga.lower(irq);
                    fpga.raise(irq);
                } else {
                    fpga.lower(irq);
                }
            })
            .unwrap();
        }
        chip.unmask(HwIrq::TIMER2.get());
        fpga.raise(HwIrq::TIMER2);

        let report = chip.handle_cascade();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.passes, 2);
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_handler_raising_other_source() {
        let (fpga, chip) = setup(None);
        let log = Arc::new(Mutex::new(Vec::new()));
        chip.request_irq(HwIrq::SLOT2, quieting(&fpga, &log)).unwrap();
        {
            let fpga = fpga.clone();
            let log = log.clone();
            chip.request_irq(HwIrq::HOTPLUG, move |_: &Chip, irq: HwIrq| {
                log.lock().unwrap().push(irq);
                fpga.lower(irq);
                fpga.raise(HwIrq::SLOT2);
            })
            .unwrap();
        }
        chip.unmask(HwIrq::SLOT2.get());
        chip.unmask(HwIrq::HOTPLUG.get());
        fpga.raise(HwIrq::HOTPLUG);

        let report = chip.handle_cascade();
        assert_eq!(*log.lock().unwrap(), vec![HwIrq::HOTPLUG, HwIrq::SLOT2]);
        assert_eq!(report.passes, 2);
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_handler_may_call_back_into_chip() {
        let (fpga, chip) = setup(None);
        let calls = Arc::new(AtomicU32::new(0));
        {
            let fpga = fpga.clone();
            let calls = calls.clone();
            // Level flow: mask, quiet the device, re-unmask.
            chip.request_irq(HwIrq::COM3, move |chip: &Chip, irq: HwIrq| {
                calls.fetch_add(1, Ordering::SeqCst);
                chip.ack(irq.get());
                fpga.lower(irq);
                chip.unmask(irq.get());
            })
            .unwrap();
        }
        chip.unmask(HwIrq::COM3.get());
        fpga.raise(HwIrq::COM3);

        let report = chip.handle_cascade();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.passes, 1);
        assert!(chip.enabled().contains_irq(HwIrq::COM3));
    }

    #[test]
    fn test_masking_from_handler_stops_drain() {
        let (fpga, chip) = setup(None);
        let calls = Arc::new(AtomicU32::new(0));
        {
            let calls = calls.clone();
            // Never quiets the device, only masks it.
            chip.request_irq(HwIrq::BATLOW, move |chip: &Chip, irq: HwIrq| {
                calls.fetch_add(1, Ordering::SeqCst);
                chip.mask(irq.get());
            })
            .unwrap();
        }
        chip.unmask(HwIrq::BATLOW.get());
        fpga.raise(HwIrq::BATLOW);

        let report = chip.handle_cascade();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.passes, 1);
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_stuck_source_hits_scan_limit() {
        let (fpga, chip) = setup(Some(8));
        let calls = Arc::new(AtomicU32::new(0));
        {
            let calls = calls.clone();
            chip.request_irq(HwIrq::SLOT5, move |_: &Chip, _: HwIrq| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        chip.unmask(HwIrq::SLOT5.get());
        fpga.raise(HwIrq::SLOT5);

        let report = chip.handle_cascade();
        assert_eq!(calls.load(Ordering::SeqCst), 8);
        assert_eq!(report.passes, 8);
        assert_eq!(report.stuck, Some(IrqSet::from_irq(HwIrq::SLOT5)));
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_unhandled_source_is_masked() {
        let (fpga, chip) = setup(None);
        chip.unmask(HwIrq::TIMEROUT.get());
        fpga.raise(HwIrq::TIMEROUT);

        let report = chip.handle_cascade();
        assert_eq!(report.passes, 1);
        assert_eq!(report.dispatched, 0);
        assert_eq!(report.spurious, IrqSet::from_irq(HwIrq::TIMEROUT));
        assert!(!chip.enabled().contains_irq(HwIrq::TIMEROUT));
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_cascade_completes_while_register_lock_held() {
        let (fpga, chip) = setup(None);
        let log = Arc::new(Mutex::new(Vec::new()));
        chip.request_irq(HwIrq::TIMER1, quieting(&fpga, &log)).unwrap();
        chip.unmask(HwIrq::TIMER1.get());
        fpga.raise(HwIrq::TIMER1);
        let chip = Arc::new(chip);

        // Thread context sits inside a chip operation
        let guard = chip.shadow.lock();
        let (tx, rx) = std::sync::mpsc::channel();
        let worker = {
            let chip = chip.clone();
            std::thread::spawn(move || {
                let report = chip.handle_cascade();
                let _ = tx.send(report);
            })
        };
        let report = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("cascade blocked on the register lock");
        drop(guard);
        worker.join().unwrap();

        assert_eq!(report.dispatched, 1);
        assert_eq!(*log.lock().unwrap(), vec![HwIrq::TIMER1]);
        assert_eq!(fpga.eoi_count(), 1);
    }

    #[test]
    fn test_each_activation_gets_one_eoi() {
        let (fpga, chip) = setup(None);
        let log = Arc::new(Mutex::new(Vec::new()));
        chip.request_irq(HwIrq::SLOT8, quieting(&fpga, &log)).unwrap();
        chip.unmask(HwIrq::SLOT8.get());

        for _ in 0..3 {
            fpga.raise(HwIrq::SLOT8);
            chip.handle_cascade();
        }
        assert_eq!(log.lock().unwrap().len(), 3);
        assert_eq!(fpga.eoi_count(), 3);
    }
}
