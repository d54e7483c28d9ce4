// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Driver Error Codes
//!
//! This module provides the error type used by the LP-8x4x interrupt
//! driver and its mapping onto the kernel status codes.

use core::fmt;

use crate::dev::interrupt::lp8x4x::HwIrq;

/// Kernel status code type
pub type Status = i32;

/// Busy error
pub const ERR_BUSY: Status = -1;

/// Not found error
pub const ERR_NOT_FOUND: Status = -3;

/// Invalid arguments error
pub const ERR_INVALID_ARGS: Status = -10;

/// No memory error
pub const ERR_NO_MEMORY: Status = -12;

/// Out of range error
pub const ERR_OUT_OF_RANGE: Status = -33;

/// Internal error
pub const ERR_INTERNAL: Status = -114;

/// Errors reported by the interrupt driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The platform handed over no register region
    MissingMemResource,
    /// The register region is smaller than the register window
    RegionTooSmall { size: usize },
    /// The platform handed over no cascade interrupt line
    MissingIrqResource,
    /// The register region could not be mapped
    MapFailed,
    /// The host could not allocate interrupt descriptors
    NoDescriptors,
    /// A logical interrupt number outside 0..16
    InvalidHwIrq(u32),
    /// A handler is already installed for this source
    AlreadyRegistered(HwIrq),
    /// The cascade host refused an operation with the given status
    HostRejected(Status),
}

impl Error {
    /// Kernel status code for this error
    pub fn status(self) -> Status {
        match self {
            Error::MissingMemResource | Error::MissingIrqResource => ERR_NOT_FOUND,
            Error::RegionTooSmall { .. } => ERR_OUT_OF_RANGE,
            Error::MapFailed => ERR_INTERNAL,
            Error::NoDescriptors => ERR_NO_MEMORY,
            Error::InvalidHwIrq(_) => ERR_INVALID_ARGS,
            Error::AlreadyRegistered(_) => ERR_BUSY,
            Error::HostRejected(status) => status,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingMemResource => write!(f, "no register region"),
            Error::RegionTooSmall { size } => {
                write!(f, "register region too small ({:#x} bytes)", size)
            }
            Error::MissingIrqResource => write!(f, "no cascade interrupt line"),
            Error::MapFailed => write!(f, "failed to map register region"),
            Error::NoDescriptors => write!(f, "failed to allocate irq descriptors"),
            Error::InvalidHwIrq(hwirq) => write!(f, "wrong irq {}", hwirq),
            Error::AlreadyRegistered(hwirq) => {
                write!(f, "handler already registered for irq {}", hwirq.get())
            }
            Error::HostRejected(status) => write!(f, "cascade host error {}", status),
        }
    }
}

/// Result type used throughout the driver
pub type Result<T> = core::result::Result<T, Error>;
