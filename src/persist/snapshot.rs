//! Snapshot Persister
//!
//! Encodes the full Store as JSON and overwrites the backing file.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, SnapError};
use crate::store::Store;

use super::open_backing_file;

/// Owns the backing file and rewrites it on demand
///
/// Cost is O(total dataset size) per call; there is no incremental log.
pub struct SnapshotPersister {
    /// Open read/write handle to the backing file
    file: File,
    /// Path actually opened (after fallback)
    path: PathBuf,
    /// fsync after each rewrite
    sync_on_persist: bool,
}

impl SnapshotPersister {
    /// Open the backing file described by `config`
    pub fn open(config: &Config) -> Result<Self> {
        let (file, path) = open_backing_file(&config.path, &config.fallback_file_name)?;
        info!("Snapshot file: {}", path.display());

        Ok(Self {
            file,
            path,
            sync_on_persist: config.sync_on_persist,
        })
    }

    /// Write the full store to the file, replacing previous contents
    ///
    /// Steps:
    /// 1. Encode the whole mapping as one JSON object
    /// 2. Truncate to zero and seek to the start
    /// 3. Write the bytes
    /// 4. fsync (if enabled)
    ///
    /// Returns the number of bytes written.
    pub fn persist(&mut self, store: &Store) -> Result<usize> {
        let bytes = serde_json::to_vec(store.as_map())
            .map_err(|e| SnapError::Persistence(format!("failed encoding store: {}", e)))?;

        self.overwrite(&bytes).map_err(|e| {
            SnapError::Persistence(format!("failed writing {}: {}", self.path.display(), e))
        })?;

        debug!(
            "Persisted {} entries ({} bytes) to {}",
            store.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(bytes.len())
    }

    /// Truncate the file to empty. In-memory state is untouched.
    pub fn clear(&mut self) -> Result<()> {
        self.overwrite(&[]).map_err(|e| {
            SnapError::Persistence(format!("failed clearing {}: {}", self.path.display(), e))
        })?;
        debug!("Cleared {}", self.path.display());
        Ok(())
    }

    /// Read the current file contents into a Store
    ///
    /// Empty (or whitespace-only) files load as an empty Store.
    pub fn load(&mut self) -> Result<Store> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        self.file.read_to_string(&mut contents)?;

        decode_snapshot(&contents).map(Store::from_map)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn overwrite(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.file.flush()?;

        if self.sync_on_persist {
            self.file.sync_all()?;
        }

        Ok(())
    }
}

/// Decode a snapshot file from disk without opening a database
pub fn read_snapshot(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = fs::read_to_string(path)?;
    decode_snapshot(&contents)
}

fn decode_snapshot(contents: &str) -> Result<BTreeMap<String, String>> {
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(contents)?)
}
