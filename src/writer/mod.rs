//! Write Serializer Module
//!
//! Linearizes every mutation through one queue and one worker thread.
//!
//! ## Responsibilities
//! - Admit write requests from any number of producers
//! - Apply them one at a time, in dequeue order
//! - Persist a full snapshot after each one
//! - Provide the `sync` barrier over in-flight writes
//!
//! ## Pipeline
//! ```text
//!  set/delete/clear ──► bounded queue ──► worker thread
//!        │                                   │
//!        ▼                                   ▼
//!  pending += 1            lock gate → apply → persist → unlock
//!                                            │
//!                                            ▼
//!                                      pending -= 1 ──► wakes sync()
//! ```

mod barrier;
mod request;

pub use barrier::OutstandingWrites;
pub use request::WriteRequest;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, SendTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{Result, SnapError};
use crate::persist::SnapshotPersister;
use crate::store::ReadGate;

/// Persistence failures seen by the worker since the last `sync`
#[derive(Debug, Default)]
struct FailureLog {
    last: Mutex<Option<String>>,
    total: AtomicU64,
}

impl FailureLog {
    fn record(&self, message: String) {
        self.total.fetch_add(1, Ordering::Relaxed);
        *self.last.lock() = Some(message);
    }

    fn take(&self) -> Option<String> {
        self.last.lock().take()
    }
}

/// Single-consumer write queue in front of the Store
///
/// ## Ordering:
/// - One worker thread applies requests in the order it dequeues them
/// - A single producer's writes are applied in submission order
/// - Across producers, order is whatever order the queue received them
///
/// ## Admission:
/// - `submit` blocks only while the queue is full
/// - With capacity 0 every submission is a rendezvous with the worker
pub struct WriteSerializer {
    /// Queue sender; `None` once shut down
    sender: Option<Sender<WriteRequest>>,

    /// Worker thread handle; `None` once joined
    worker: Option<JoinHandle<()>>,

    /// In-flight write counter shared with the worker
    outstanding: Arc<OutstandingWrites>,

    /// Persistence failures shared with the worker
    failures: Arc<FailureLog>,
}

impl WriteSerializer {
    const THREAD_NAME: &'static str = "snapkv-writer";

    /// Spawn the worker thread
    ///
    /// The worker takes ownership of the persister; it is the only writer to
    /// the backing file.
    pub fn spawn(gate: ReadGate, persister: SnapshotPersister, capacity: usize) -> Result<Self> {
        let (sender, receiver) = bounded::<WriteRequest>(capacity);
        let outstanding = Arc::new(OutstandingWrites::new());
        let failures = Arc::new(FailureLog::default());

        let worker = {
            let outstanding = Arc::clone(&outstanding);
            let failures = Arc::clone(&failures);

            thread::Builder::new()
                .name(Self::THREAD_NAME.to_string())
                .spawn(move || Self::run(gate, persister, receiver, outstanding, failures))?
        };

        info!("Write worker started (queue capacity {})", capacity);

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            outstanding,
            failures,
        })
    }

    /// Admit a write request
    ///
    /// Returns once the queue has accepted the request, not once it is applied.
    pub fn submit(&self, request: WriteRequest) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(SnapError::Closed)?;

        self.outstanding.begin();
        if sender.send(request).is_err() {
            self.outstanding.complete();
            return Err(SnapError::Closed);
        }

        Ok(())
    }

    /// Admit a write request, giving up if the queue stays full for `timeout`
    pub fn submit_timeout(&self, request: WriteRequest, timeout: Duration) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(SnapError::Closed)?;

        self.outstanding.begin();
        match sender.send_timeout(request, timeout) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(request)) => {
                self.outstanding.complete();
                Err(SnapError::Timeout(format!(
                    "{} request not admitted within {:?}",
                    request.kind(),
                    timeout
                )))
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                self.outstanding.complete();
                Err(SnapError::Closed)
            }
        }
    }

    /// Block until every previously admitted write is applied and persisted
    ///
    /// Returns `SnapError::Persistence` if a snapshot write failed since the
    /// last call. The in-memory state reflects those writes regardless.
    ///
    /// Failures are kept in one slot: the first caller to sync after a failure
    /// takes it, whichever thread issued the failed write.
    pub fn sync(&self) -> Result<()> {
        self.outstanding.wait();
        self.take_failure()
    }

    /// `sync` with an upper bound on the wait
    pub fn sync_timeout(&self, timeout: Duration) -> Result<()> {
        if !self.outstanding.wait_timeout(timeout) {
            return Err(SnapError::Timeout(format!(
                "{} writes still pending after {:?}",
                self.outstanding.pending(),
                timeout
            )));
        }
        self.take_failure()
    }

    /// Writes admitted but not yet applied
    pub fn pending(&self) -> usize {
        self.outstanding.pending()
    }

    /// Total snapshot failures since start
    pub fn persistence_failures(&self) -> u64 {
        self.failures.total.load(Ordering::Relaxed)
    }

    /// Close the queue, drain remaining requests, and join the worker.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        drop(self.sender.take());

        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| SnapError::Persistence("write worker panicked".to_string()))?;
            info!("Write worker stopped");
        }

        Ok(())
    }

    fn take_failure(&self) -> Result<()> {
        match self.failures.take() {
            Some(message) => Err(SnapError::Persistence(message)),
            None => Ok(()),
        }
    }

    /// Worker loop: runs until every sender is dropped and the queue is empty
    fn run(
        gate: ReadGate,
        mut persister: SnapshotPersister,
        receiver: Receiver<WriteRequest>,
        outstanding: Arc<OutstandingWrites>,
        failures: Arc<FailureLog>,
    ) {
        for request in receiver.iter() {
            let kind = request.kind();

            let outcome = {
                let mut store = gate.lock();

                match request {
                    WriteRequest::Set { key, value } => {
                        debug!("Applying set for '{}'", key);
                        store.set_raw(key, value);
                        persister.persist(&store).map(|_| ())
                    }
                    WriteRequest::Delete { key } => {
                        debug!("Applying delete for '{}'", key);
                        store.delete_raw(&key);
                        persister.persist(&store).map(|_| ())
                    }
                    WriteRequest::Clear => persister.clear(),
                }
            };

            if let Err(e) = outcome {
                error!("Snapshot after {} failed, change kept in memory only: {}", kind, e);
                failures.record(match e {
                    SnapError::Persistence(message) => message,
                    other => other.to_string(),
                });
            }

            outstanding.complete();
        }
    }
}

impl Drop for WriteSerializer {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Error shutting down write worker: {}", e);
        }
    }
}
