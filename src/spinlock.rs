// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Interrupt-Saving Spinlock
//!
//! A lock shared between thread context and the cascade handler must be
//! taken with local interrupts disabled. Otherwise the cascade can fire on
//! the CPU that holds the lock and spin on it forever. The driver does not
//! know how the platform masks interrupts, so the platform supplies the
//! save/restore pair through [`IrqSaveOps`].

use core::fmt;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard};

fn no_save() -> usize {
    0
}

fn no_restore(_state: usize) {}

/// Local interrupt save/restore hooks
///
/// `save` disables local interrupts and returns the previous state;
/// `restore` puts that state back.
#[derive(Clone, Copy)]
pub struct IrqSaveOps {
    pub save: fn() -> usize,
    pub restore: fn(usize),
}

impl IrqSaveOps {
    /// Hooks that leave interrupts alone, for callers that never take the
    /// lock from thread context on the cascade's CPU
    pub const NONE: IrqSaveOps = IrqSaveOps {
        save: no_save,
        restore: no_restore,
    };

    pub const fn new(save: fn() -> usize, restore: fn(usize)) -> Self {
        Self { save, restore }
    }
}

impl Default for IrqSaveOps {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Debug for IrqSaveOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrqSaveOps").finish_non_exhaustive()
    }
}

/// Spinlock that disables local interrupts while held
pub struct SpinLockIrqSave<T> {
    inner: Mutex<T>,
    ops: IrqSaveOps,
}

impl<T> SpinLockIrqSave<T> {
    pub const fn new(data: T, ops: IrqSaveOps) -> Self {
        Self {
            inner: Mutex::new(data),
            ops,
        }
    }

    /// Save interrupt state, then spin for the lock
    pub fn lock(&self) -> SpinLockIrqSaveGuard<'_, T> {
        let state = (self.ops.save)();
        SpinLockIrqSaveGuard {
            guard: ManuallyDrop::new(self.inner.lock()),
            state,
            restore: self.ops.restore,
        }
    }
}

/// RAII guard: releases the lock, then restores the interrupt state
pub struct SpinLockIrqSaveGuard<'a, T> {
    guard: ManuallyDrop<MutexGuard<'a, T>>,
    state: usize,
    restore: fn(usize),
}

impl<'a, T> Deref for SpinLockIrqSaveGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<'a, T> DerefMut for SpinLockIrqSaveGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<'a, T> Drop for SpinLockIrqSaveGuard<'a, T> {
    fn drop(&mut self) {
        // SAFETY: the guard is dropped exactly once, here.
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        (self.restore)(self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    static IRQS_OFF: AtomicBool = AtomicBool::new(false);
    static SAVES: AtomicU32 = AtomicU32::new(0);

    fn save() -> usize {
        SAVES.fetch_add(1, Ordering::SeqCst);
        IRQS_OFF.swap(true, Ordering::SeqCst) as usize
    }

    fn restore(state: usize) {
        IRQS_OFF.store(state != 0, Ordering::SeqCst);
    }

    #[test]
    fn test_interrupts_off_while_held() {
        let lock = SpinLockIrqSave::new(5u32, IrqSaveOps::new(save, restore));
        {
            let mut guard = lock.lock();
            assert!(IRQS_OFF.load(Ordering::SeqCst));
            *guard += 1;
        }
        assert!(!IRQS_OFF.load(Ordering::SeqCst));
        assert_eq!(SAVES.load(Ordering::SeqCst), 1);

        assert_eq!(*lock.lock(), 6);
        assert!(!IRQS_OFF.load(Ordering::SeqCst));
    }

    #[test]
    fn test_no_hooks() {
        let lock = SpinLockIrqSave::new([0u8; 2], IrqSaveOps::default());
        lock.lock()[1] = 3;
        assert_eq!(*lock.lock(), [0, 3]);
    }
}
