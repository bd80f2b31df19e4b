//! Time sources used to evaluate the lock deadline

use chrono::Utc;
use std::cell::Cell;
use std::rc::Rc;
use types::numeric::Timestamp;

/// Supplies the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall clock in unix seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch system time clamps to zero
        let secs = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        Timestamp::from_secs(secs)
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    /// Move forward by `secs`, saturating at the far end of the range.
    pub fn advance(&self, secs: u64) {
        let next = self.now.get().as_secs().saturating_add(secs);
        self.now.set(Timestamp::from_secs(next));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
