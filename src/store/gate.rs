//! Read Gate
//!
//! A single mutex shared by readers and the write worker, so a reader never
//! observes a store mid-mutation.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::Store;

/// Cloneable handle to the shared Store
///
/// ## Concurrency:
/// - At most one holder at a time (reader or the writer worker)
/// - The worker holds the gate across apply + persist, so readers see either
///   the state before a write or after it has been persisted
#[derive(Clone, Default)]
pub struct ReadGate {
    inner: Arc<Mutex<Store>>,
}

impl ReadGate {
    /// Wrap a Store in a new gate
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Acquire the gate
    pub fn lock(&self) -> MutexGuard<'_, Store> {
        self.inner.lock()
    }

    /// Run a closure while holding the gate
    pub fn read<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        let store = self.inner.lock();
        f(&store)
    }
}
