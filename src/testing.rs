// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Test doubles for the FPGA register file and the cascade host

use alloc::sync::Arc;

use spin::Mutex;

use crate::dev::interrupt::lp8x4x::HwIrq;
use crate::dev::interrupt::{CascadeHost, Trigger};
use crate::err::{Error, Result};
use crate::reg::{Register, RegisterBus, IRQ_MEM_SIZE};

struct FpgaState {
    regs: [u8; IRQ_MEM_SIZE],
    writes: Vec<(Register, u8)>,
    eoi: u32,
}

/// Simulated FPGA register file
///
/// CLRHILVINT, SECOINT and PRIMINT behave as pending latches: devices set
/// bits through [`FakeFpga::raise`], bus writes of 1 clear them. EOI
/// writes are counted. Every other register stores what is written.
pub(crate) struct FakeFpga {
    state: Mutex<FpgaState>,
}

impl FakeFpga {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FpgaState {
                regs: [0; IRQ_MEM_SIZE],
                writes: Vec::new(),
                eoi: 0,
            }),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register content, bypassing the bus
    pub fn get(&self, reg: Register) -> u8 {
        self.state.lock().regs[reg.offset()]
    }

    /// Overwrite register content, bypassing the bus
    pub fn set(&self, reg: Register, value: u8) {
        self.state.lock().regs[reg.offset()] = value;
    }

    /// Device side: assert the source's pending latch
    pub fn raise(&self, irq: HwIrq) {
        let src = irq.source();
        self.state.lock().regs[src.pending.offset()] |= src.mask();
    }

    /// Device side: the source's condition went away
    pub fn lower(&self, irq: HwIrq) {
        let src = irq.source();
        self.state.lock().regs[src.pending.offset()] &= !src.mask();
    }

    /// Bus writes in order
    pub fn writes(&self) -> Vec<(Register, u8)> {
        self.state.lock().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().writes.clear();
    }

    pub fn eoi_count(&self) -> u32 {
        self.state.lock().eoi
    }
}

impl RegisterBus for FakeFpga {
    fn read8(&self, offset: usize) -> u8 {
        self.state.lock().regs[offset]
    }

    fn write8(&self, offset: usize, value: u8) {
        let reg = match Register::from_offset(offset) {
            Some(reg) => reg,
            None => panic!("write to unknown offset {:#x}", offset),
        };
        let mut state = self.state.lock();
        state.writes.push((reg, value));
        match reg {
            Register::ClrHiLvInt | Register::SecoInt | Register::PrimInt => {
                state.regs[offset] &= !value;
            }
            Register::Eoi => {
                state.eoi += 1;
            }
            _ => {
                state.regs[offset] = value;
            }
        }
    }
}

struct HostState {
    allocated: Option<(u32, u32)>,
    freed: Vec<(u32, u32)>,
    chained: Option<(u32, Trigger)>,
    fail_alloc: bool,
    fail_chain: Option<i32>,
}

/// Recording cascade host
pub(crate) struct FakeHost {
    virq_base: u32,
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn new(virq_base: u32) -> Self {
        Self {
            virq_base,
            state: Mutex::new(HostState {
                allocated: None,
                freed: Vec::new(),
                chained: None,
                fail_alloc: false,
                fail_chain: None,
            }),
        }
    }

    pub fn fail_alloc(&self) {
        self.state.lock().fail_alloc = true;
    }

    pub fn fail_chain(&self, status: i32) {
        self.state.lock().fail_chain = Some(status);
    }

    /// Outstanding descriptor allocation
    pub fn allocated(&self) -> Option<(u32, u32)> {
        self.state.lock().allocated
    }

    pub fn freed(&self) -> Vec<(u32, u32)> {
        self.state.lock().freed.clone()
    }

    /// Currently routed cascade line
    pub fn chained(&self) -> Option<(u32, Trigger)> {
        self.state.lock().chained
    }
}

impl CascadeHost for FakeHost {
    fn alloc_descs(&self, count: u32) -> Result<u32> {
        let mut state = self.state.lock();
        if state.fail_alloc {
            return Err(Error::NoDescriptors);
        }
        state.allocated = Some((self.virq_base, count));
        Ok(self.virq_base)
    }

    fn free_descs(&self, base: u32, count: u32) {
        let mut state = self.state.lock();
        state.freed.push((base, count));
        if state.allocated == Some((base, count)) {
            state.allocated = None;
        }
    }

    fn set_chained_handler(&self, line: u32, trigger: Trigger) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(status) = state.fail_chain {
            return Err(Error::HostRejected(status));
        }
        state.chained = Some((line, trigger));
        Ok(())
    }

    fn remove_chained_handler(&self, line: u32) {
        let mut state = self.state.lock();
        if state.chained.map(|(l, _)| l) == Some(line) {
            state.chained = None;
        }
    }
}
