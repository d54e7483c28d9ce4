// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Source Map
//!
//! The 16 logical sources are split over three register groups that do
//! not share a layout:
//!
//! | hwirq | Group       | Pending         | Enable        | Unmask arms |
//! |-------|-------------|-----------------|---------------|-------------|
//! | 0-7   | high level  | CLRHILVINT n    | ENHILVINT n   | CLRHILVINT  |
//! | 8-12  | secondary   | SECOINT n-8     | ENSYSINT n-8  | SECOINT     |
//! | 13-15 | primary     | PRIMINT n-8     | ENSYSINT n-8  | SECOINT     |
//!
//! Every operation goes through [`HwIrq::source`] instead of deriving
//! registers from the number at the call site.

use core::fmt;

use bitflags::bitflags;

use crate::bits;
use crate::reg::Register;

/// Number of logical sources
pub const NR_IRQS: u32 = 16;

/// A logical interrupt source of the FPGA, 0..16
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HwIrq(u8);

impl HwIrq {
    /// Backplane slot 1..8
    pub const SLOT1: HwIrq = HwIrq(0);
    pub const SLOT2: HwIrq = HwIrq(1);
    pub const SLOT3: HwIrq = HwIrq(2);
    pub const SLOT4: HwIrq = HwIrq(3);
    pub const SLOT5: HwIrq = HwIrq(4);
    pub const SLOT6: HwIrq = HwIrq(5);
    pub const SLOT7: HwIrq = HwIrq(6);
    pub const SLOT8: HwIrq = HwIrq(7);
    /// FPGA timers
    pub const TIMER1: HwIrq = HwIrq(8);
    pub const TIMER2: HwIrq = HwIrq(9);
    pub const TIMEROUT: HwIrq = HwIrq(10);
    /// Backplane hotplug
    pub const HOTPLUG: HwIrq = HwIrq(11);
    /// Backup battery low
    pub const BATLOW: HwIrq = HwIrq(12);
    /// FPGA serial ports
    pub const COM2: HwIrq = HwIrq(13);
    pub const COM3: HwIrq = HwIrq(14);
    pub const COM4: HwIrq = HwIrq(15);

    /// Validate a raw source number
    #[inline]
    pub const fn new(hwirq: u32) -> Option<HwIrq> {
        if hwirq < NR_IRQS {
            Some(HwIrq(hwirq as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0 as u32
    }

    /// All sources in ascending order
    pub fn all() -> impl Iterator<Item = HwIrq> {
        (0..NR_IRQS as u8).map(HwIrq)
    }

    #[inline]
    pub fn group(self) -> IrqGroup {
        self.source().group
    }

    /// Register layout for this source
    #[inline]
    pub fn source(self) -> &'static SourceMap {
        &SOURCE_MAP[self.0 as usize]
    }
}

impl fmt::Debug for HwIrq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HwIrq({})", self.0)
    }
}

impl fmt::Display for HwIrq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Register group of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqGroup {
    /// Sources 0-7, vendor "high level"
    HighLevel,
    /// Sources 8-12, vendor "secondary"
    Secondary,
    /// Sources 13-15, vendor "primary"
    Primary,
}

/// Shadowed enable register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableReg {
    /// ENHILVINT, shadowed by the high level mask
    HighLevel,
    /// ENSYSINT, shadowed by the secondary mask
    System,
}

impl EnableReg {
    pub const fn register(self) -> Register {
        match self {
            EnableReg::HighLevel => Register::EnHiLvInt,
            EnableReg::System => Register::EnSysInt,
        }
    }
}

/// Where one source lives in the register file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMap {
    pub group: IrqGroup,
    /// Bit index in the pending, enable and arm registers
    pub bit: u32,
    /// Register holding the pending bit
    pub pending: Register,
    /// Enable register the bit lives in
    pub enable: EnableReg,
    /// Register pulsed on unmask
    pub arm: Register,
    /// Write-1-to-clear register for the latched pending bit
    pub clear: Register,
}

impl SourceMap {
    const fn for_hwirq(hwirq: u32) -> SourceMap {
        if hwirq < 8 {
            SourceMap {
                group: IrqGroup::HighLevel,
                bit: hwirq,
                pending: Register::ClrHiLvInt,
                enable: EnableReg::HighLevel,
                arm: Register::ClrHiLvInt,
                clear: Register::ClrHiLvInt,
            }
        } else if hwirq < 13 {
            SourceMap {
                group: IrqGroup::Secondary,
                bit: hwirq - 8,
                pending: Register::SecoInt,
                enable: EnableReg::System,
                arm: Register::SecoInt,
                clear: Register::SecoInt,
            }
        } else {
            SourceMap {
                group: IrqGroup::Primary,
                bit: hwirq - 8,
                pending: Register::PrimInt,
                enable: EnableReg::System,
                arm: Register::SecoInt,
                clear: Register::PrimInt,
            }
        }
    }

    /// Byte mask of this source in its registers
    #[inline]
    pub const fn mask(&self) -> u8 {
        bits::bit8(self.bit)
    }
}

const fn build_source_map() -> [SourceMap; NR_IRQS as usize] {
    let mut map = [SourceMap::for_hwirq(0); NR_IRQS as usize];
    let mut i = 0;
    while i < NR_IRQS as usize {
        map[i] = SourceMap::for_hwirq(i as u32);
        i += 1;
    }
    map
}

/// Layout of every source, indexed by hwirq
pub static SOURCE_MAP: [SourceMap; NR_IRQS as usize] = build_source_map();

bitflags! {
    /// A set of logical sources, bit n for hwirq n
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct IrqSet: u16 {
        /// High level sources 0-7
        const GROUP_A = 0x00ff;
        /// Secondary sources 8-12
        const GROUP_B = 0x1f00;
        /// Primary sources 13-15
        const GROUP_C = 0xe000;
    }
}

impl IrqSet {
    /// Set holding just `hwirq`
    #[inline]
    pub const fn from_irq(hwirq: HwIrq) -> IrqSet {
        IrqSet::from_bits_retain(1u16 << hwirq.0)
    }

    #[inline]
    pub const fn contains_irq(&self, hwirq: HwIrq) -> bool {
        bits::is_bit_set(self.bits(), hwirq.0 as u32)
    }

    /// Members in ascending order
    pub fn irqs(&self) -> impl Iterator<Item = HwIrq> {
        bits::for_each_set_bit(self.bits()).map(|n| HwIrq(n as u8))
    }
}
