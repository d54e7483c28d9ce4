// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Register Access
//!
//! The FPGA exposes its interrupt logic as byte-wide registers on 16-bit
//! strides inside a 0x16-byte window.
//!
//! | Offset | Name       | Description                                  |
//! |--------|------------|----------------------------------------------|
//! | 0x00   | EOI        | End of interrupt strobe                      |
//! | 0x02   | INSINT     | Interrupt inspection                         |
//! | 0x04   | ENSYSINT   | Enable for the secondary/primary sources     |
//! | 0x06   | PRIMINT    | Primary pending, bits 5-7 (irq 13-15)        |
//! | 0x08   | SECOINT    | Secondary pending/arm, bits 0-4 (irq 8-12)   |
//! | 0x0A   | ENRISEINT  | Rising edge enable                           |
//! | 0x0C   | CLRRISEINT | Rising edge clear                            |
//! | 0x0E   | ENHILVINT  | High level enable (irq 0-7)                  |
//! | 0x10   | CLRHILVINT | High level pending, write 1 to clear         |
//! | 0x12   | ENFALLINT  | Falling edge enable                          |
//! | 0x14   | CLRFALLINT | Falling edge clear                           |
//!
//! Every access goes straight to the bus. Nothing here caches register
//! values, and volatile accesses keep reads and writes in program order.

/// Size of the register window in bytes
pub const IRQ_MEM_SIZE: usize = 0x16;

/// Meaningful bits of PRIMINT
pub const PRIMINT_MASK: u8 = 0xe0;

/// Meaningful bits of SECOINT
pub const SECOINT_MASK: u8 = 0x1f;

/// Named FPGA interrupt registers
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Eoi = 0x00,
    InsInt = 0x02,
    EnSysInt = 0x04,
    PrimInt = 0x06,
    SecoInt = 0x08,
    EnRiseInt = 0x0a,
    ClrRiseInt = 0x0c,
    EnHiLvInt = 0x0e,
    ClrHiLvInt = 0x10,
    EnFallInt = 0x12,
    ClrFallInt = 0x14,
}

impl Register {
    /// All registers in offset order
    pub const ALL: [Register; 11] = [
        Register::Eoi,
        Register::InsInt,
        Register::EnSysInt,
        Register::PrimInt,
        Register::SecoInt,
        Register::EnRiseInt,
        Register::ClrRiseInt,
        Register::EnHiLvInt,
        Register::ClrHiLvInt,
        Register::EnFallInt,
        Register::ClrFallInt,
    ];

    /// Byte offset from the window base
    #[inline]
    pub const fn offset(self) -> usize {
        self as usize
    }

    /// Look up the register at `offset`
    pub fn from_offset(offset: usize) -> Option<Register> {
        Register::ALL.iter().copied().find(|r| r.offset() == offset)
    }

    /// Vendor name of the register
    pub const fn name(self) -> &'static str {
        match self {
            Register::Eoi => "EOI",
            Register::InsInt => "INSINT",
            Register::EnSysInt => "ENSYSINT",
            Register::PrimInt => "PRIMINT",
            Register::SecoInt => "SECOINT",
            Register::EnRiseInt => "ENRISEINT",
            Register::ClrRiseInt => "CLRRISEINT",
            Register::EnHiLvInt => "ENHILVINT",
            Register::ClrHiLvInt => "CLRHILVINT",
            Register::EnFallInt => "ENFALLINT",
            Register::ClrFallInt => "CLRFALLINT",
        }
    }
}

/// Byte-wide access to the controller's register window
///
/// This is the only path to hardware. Implementations must perform every
/// access immediately and in call order.
pub trait RegisterBus: Send + Sync {
    /// Read the byte at `offset`
    fn read8(&self, offset: usize) -> u8;

    /// Write `value` to the byte at `offset`
    fn write8(&self, offset: usize, value: u8);
}

impl<T: RegisterBus + ?Sized> RegisterBus for &T {
    #[inline]
    fn read8(&self, offset: usize) -> u8 {
        (**self).read8(offset)
    }

    #[inline]
    fn write8(&self, offset: usize, value: u8) {
        (**self).write8(offset, value)
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for alloc::sync::Arc<T> {
    #[inline]
    fn read8(&self, offset: usize) -> u8 {
        (**self).read8(offset)
    }

    #[inline]
    fn write8(&self, offset: usize, value: u8) {
        (**self).write8(offset, value)
    }
}

/// Memory-mapped register window
#[derive(Debug)]
pub struct MmioRegion {
    base: usize,
}

impl MmioRegion {
    /// Wrap an already mapped register window
    ///
    /// # Safety
    ///
    /// `base` must be the virtual address of a mapping of at least
    /// [`IRQ_MEM_SIZE`] bytes of device memory that stays valid for the
    /// lifetime of the returned value.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }
}

impl RegisterBus for MmioRegion {
    #[inline]
    fn read8(&self, offset: usize) -> u8 {
        // SAFETY: the constructor guarantees the window is mapped and
        // RegisterBlock keeps offsets inside it.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u8) }
    }

    #[inline]
    fn write8(&self, offset: usize, value: u8) {
        // SAFETY: see read8.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u8, value) }
    }
}

/// Typed register accessors over a bus
#[derive(Debug)]
pub struct RegisterBlock<B> {
    bus: B,
}

impl<B: RegisterBus> RegisterBlock<B> {
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Release the underlying bus
    pub fn into_bus(self) -> B {
        self.bus
    }

    #[inline]
    pub fn read_register(&self, reg: Register) -> u8 {
        self.bus.read8(reg.offset())
    }

    #[inline]
    pub fn write_register(&self, reg: Register, value: u8) {
        log_trace!("LP8X4X: {} <- {:#04x}", reg.name(), value);
        self.bus.write8(reg.offset(), value)
    }

    /// Read a raw offset
    ///
    /// Offsets that do not name a register are a programming error: they
    /// assert in debug builds and read as 0 in release builds.
    pub fn read_offset(&self, offset: usize) -> u8 {
        match Register::from_offset(offset) {
            Some(reg) => self.read_register(reg),
            None => {
                debug_assert!(false, "LP8X4X: read of bad register offset {:#x}", offset);
                0
            }
        }
    }

    /// Write a raw offset
    ///
    /// Offsets that do not name a register are a programming error: they
    /// assert in debug builds and are dropped in release builds.
    pub fn write_offset(&self, offset: usize, value: u8) {
        match Register::from_offset(offset) {
            Some(reg) => self.write_register(reg, value),
            None => {
                debug_assert!(false, "LP8X4X: write of bad register offset {:#x}", offset);
            }
        }
    }
}
