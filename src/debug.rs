// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Driver Logging
//!
//! Thin logging macros used throughout the driver. With the `log` feature
//! enabled they forward to the `log` facade under the `lp8x4x_irq` target,
//! so whatever logger the kernel installs picks them up. Without the
//! feature the arguments are type-checked and dropped.
//!
//! # Usage
//!
//! ```ignore
//! log_info!("LP8X4X: base={:#x} cascade={}", base, line);
//! log_error!("LP8X4X: wrong irq {}", hwirq);
//! ```

/// Log target shared by every message from this driver
pub const LOG_TARGET: &str = "lp8x4x_irq";

#[doc(hidden)]
#[macro_export]
macro_rules! __lp8x4x_log {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "log")]
        {
            ::log::$level!(target: $crate::debug::LOG_TARGET, $($arg)*);
        }
        #[cfg(not(feature = "log"))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

/// Log a trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        $crate::__lp8x4x_log!(trace, $($arg)*)
    };
}

/// Log a debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::__lp8x4x_log!(debug, $($arg)*)
    };
}

/// Log an info message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::__lp8x4x_log!(info, $($arg)*)
    };
}

/// Log a warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::__lp8x4x_log!(warn, $($arg)*)
    };
}

/// Log an error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::__lp8x4x_log!(error, $($arg)*)
    };
}
