//! Reentrancy protection for contract operations
//!
//! The engine runs single-threaded, so the only interleaving hazard is a
//! token callback re-entering the engine synchronously. The guard lives in a
//! `Cell` so it can be checked through a shared reference, which is all a
//! re-entering caller can hold.

use std::cell::Cell;

/// Reentrancy guard preventing nested calls into protected functions.
///
/// A contract function acquires the guard before executing state-changing
/// logic and releases it on completion. Any nested call attempt fails.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: Cell<bool>,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self {
            locked: Cell::new(false),
        }
    }

    /// Acquire the guard. Returns `true` if successfully acquired.
    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&self) -> bool {
        if self.locked.get() {
            return false;
        }
        self.locked.set(true);
        true
    }

    /// Release the guard.
    pub fn release(&self) {
        self.locked.set(false);
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Acquire the guard for the lifetime of the returned scope.
    ///
    /// Returns `None` on reentrancy. The guard is released when the scope is
    /// dropped, so every early return path unlocks it.
    pub fn enter(&self) -> Option<GuardScope<'_>> {
        if self.acquire() {
            Some(GuardScope { guard: self })
        } else {
            None
        }
    }
}

/// Held for the duration of one outer call.
#[derive(Debug)]
pub struct GuardScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}
