//! Outstanding-write counter
//!
//! Counts writes that were admitted but not yet applied and persisted.
//! `wait` is the barrier behind `sync`.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Counter of in-flight writes with a drain barrier
///
/// Invariant: the count is zero iff no admitted write is in flight.
#[derive(Debug, Default)]
pub struct OutstandingWrites {
    pending: Mutex<usize>,
    drained: Condvar,
}

impl OutstandingWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly admitted write
    pub fn begin(&self) {
        *self.pending.lock() += 1;
    }

    /// Record a finished write (or roll back a failed admission)
    pub fn complete(&self) {
        let mut pending = self.pending.lock();
        debug_assert!(*pending > 0, "complete() without matching begin()");
        *pending = pending.saturating_sub(1);

        if *pending == 0 {
            self.drained.notify_all();
        }
    }

    /// Number of writes currently in flight
    pub fn pending(&self) -> usize {
        *self.pending.lock()
    }

    /// Block until the count reaches zero
    pub fn wait(&self) {
        let mut pending = self.pending.lock();
        while *pending > 0 {
            self.drained.wait(&mut pending);
        }
    }

    /// Block until the count reaches zero or `timeout` elapses.
    /// Returns true if drained.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();

        while *pending > 0 {
            if self.drained.wait_until(&mut pending, deadline).timed_out() {
                return *pending == 0;
            }
        }

        true
    }
}
