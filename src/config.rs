//! Configuration for SnapKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SnapError};

/// Main configuration for a SnapKV database
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Backing file for the JSON snapshot.
    ///
    /// If it cannot be opened for read/write, it is treated as a directory and
    /// `{path}/{fallback_file_name}` is created and opened instead.
    pub path: PathBuf,

    /// File name created inside `path` when `path` itself cannot be opened
    pub fallback_file_name: String,

    /// Populate the store from the backing file on open
    pub load_existing: bool,

    /// fsync after every snapshot write
    pub sync_on_persist: bool,

    // -------------------------------------------------------------------------
    // Write Queue Configuration
    // -------------------------------------------------------------------------
    /// Max queued writes before `set`/`delete` block.
    /// Zero makes every submission a rendezvous with the worker.
    pub queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            fallback_file_name: "my-db.txt".to_string(),
            load_existing: true,
            sync_on_persist: true,
            queue_capacity: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration before opening a database
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(SnapError::Config("path must not be empty".to_string()));
        }

        let name = self.fallback_file_name.as_str();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(SnapError::Config(format!(
                "fallback_file_name must be a plain file name, got '{}'",
                name
            )));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backing file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the file name used when falling back to `{path}/{name}`
    pub fn fallback_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.fallback_file_name = name.into();
        self
    }

    /// Enable or disable loading existing contents on open
    pub fn load_existing(mut self, load: bool) -> Self {
        self.config.load_existing = load;
        self
    }

    /// Enable or disable fsync after each snapshot
    pub fn sync_on_persist(mut self, sync: bool) -> Self {
        self.config.sync_on_persist = sync;
        self
    }

    /// Set the write queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
