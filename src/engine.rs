//! Engine Module
//!
//! The database handle that coordinates all components.
//!
//! ## Responsibilities
//! - Open the backing file and load the existing snapshot
//! - Route writes through the write serializer
//! - Serve reads and queries under the read gate
//! - Shut the worker down on close/drop

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::command::Command;
use crate::config::Config;
use crate::error::Result;
use crate::persist::SnapshotPersister;
use crate::query::{self, Document};
use crate::store::{ReadGate, Store};
use crate::writer::{WriteRequest, WriteSerializer};

/// An open SnapKV database
///
/// ## Concurrency Model: Serialized Writes / Gated Reads
///
/// - **Writes** (set/delete/clear): queued and applied by one worker thread
///   - Return once queued, not once applied
///   - Applied in dequeue order; each followed by a full snapshot
///
/// - **Reads** (get/find/filter): take the read gate directly
///   - Never wait on the queue
///   - Only see writes that the worker has finished; call `sync` first
///     to observe your own writes
///
/// `Database` is `Sync`: share it by reference or `Arc` across threads.
pub struct Database {
    /// Database configuration
    config: Config,

    /// Backing file actually in use (after fallback)
    path: PathBuf,

    /// Shared store guarded by the read gate
    gate: ReadGate,

    /// Write queue and worker
    writer: WriteSerializer,
}

impl Database {
    /// Open or create a database with the given config
    ///
    /// On startup:
    /// 1. Validate config
    /// 2. Open the backing file (or the fallback file)
    /// 3. Load the existing snapshot (if `load_existing`)
    /// 4. Start the write worker
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let mut persister = SnapshotPersister::open(&config)?;

        let store = if config.load_existing {
            let store = persister.load()?;
            if !store.is_empty() {
                info!("Loaded {} entries from {}", store.len(), persister.path().display());
            }
            store
        } else {
            Store::new()
        };

        let path = persister.path().to_path_buf();
        let gate = ReadGate::new(store);
        let writer = WriteSerializer::spawn(gate.clone(), persister, config.queue_capacity)?;

        Ok(Self {
            config,
            path,
            gate,
            writer,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified backing file
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Option<String>> {
        match command {
            Command::Get { key } => self.get(&key).map(Some),
            Command::Set { key, value } => {
                self.set(key, value)?;
                Ok(None)
            }
            Command::Delete { key } => {
                self.delete(key)?;
                Ok(None)
            }
            Command::Sync => {
                self.sync()?;
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Queue a write. Visible to readers once the worker applies it.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.writer.submit(WriteRequest::set(key, value))
    }

    /// Queue a write, failing with `Timeout` if the queue stays full
    pub fn set_timeout(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        timeout: Duration,
    ) -> Result<()> {
        self.writer.submit_timeout(WriteRequest::set(key, value), timeout)
    }

    /// Serialize `value` as JSON and queue it under `key`
    pub fn set_json<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.set(key, encoded)
    }

    /// Queue a delete. Deleting an absent key is not an error.
    pub fn delete(&self, key: impl Into<String>) -> Result<()> {
        self.writer.submit(WriteRequest::delete(key))
    }

    /// Queue a delete, failing with `Timeout` if the queue stays full
    pub fn delete_timeout(&self, key: impl Into<String>, timeout: Duration) -> Result<()> {
        self.writer.submit_timeout(WriteRequest::delete(key), timeout)
    }

    /// Queue a truncation of the backing file. Memory is left untouched, so
    /// the next write puts every key back on disk.
    pub fn clear(&self) -> Result<()> {
        self.writer.submit(WriteRequest::Clear)
    }

    /// Block until all writes queued before this call are applied and persisted
    ///
    /// Returns `SnapError::Persistence` if any snapshot write failed since the
    /// previous sync. The failure is database-wide, not per caller: it is
    /// handed to whichever thread syncs first, and every other caller gets
    /// `Ok`, including the thread whose write failed. Use
    /// `persistence_failures` to observe failures from any thread.
    pub fn sync(&self) -> Result<()> {
        self.writer.sync()
    }

    /// `sync` with an upper bound on the wait
    pub fn sync_timeout(&self, timeout: Duration) -> Result<()> {
        self.writer.sync_timeout(timeout)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a value by key, or `SnapError::NotFound`
    pub fn get(&self, key: &str) -> Result<String> {
        self.gate.read(|store| store.get_raw(key).map(str::to_string))
    }

    /// Get a value by key and deserialize it from JSON
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let raw = self.get(key)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// First document matching `predicate`
    ///
    /// The read gate is held for the whole scan; `predicate` must not call
    /// back into this database.
    pub fn find<F>(&self, predicate: F) -> Result<Document>
    where
        F: FnMut(&Document) -> bool,
    {
        self.gate.read(|store| query::find(store, predicate))
    }

    /// All documents matching `predicate`
    ///
    /// Same locking rules as `find`.
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<Document>>
    where
        F: FnMut(&Document) -> bool,
    {
        self.gate.read(|store| query::filter(store, predicate))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.gate.read(|store| store.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.gate.read(Store::len)
    }

    pub fn is_empty(&self) -> bool {
        self.gate.read(Store::is_empty)
    }

    /// All keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.gate
            .read(|store| store.keys().map(str::to_string).collect())
    }

    /// Copy of the current mapping
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.gate.read(|store| store.as_map().clone())
    }

    /// Close the database gracefully
    ///
    /// Drains the queue, stops the worker, and reports the final sync result
    pub fn close(mut self) -> Result<()> {
        let synced = self.writer.sync();
        self.writer.shutdown()?;
        info!("Closed {}", self.path.display());
        synced
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes queued but not yet applied
    pub fn pending_writes(&self) -> usize {
        self.writer.pending()
    }

    /// Snapshot failures since open
    pub fn persistence_failures(&self) -> u64 {
        self.writer.persistence_failures()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
