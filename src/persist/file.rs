//! Backing file resolution

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, SnapError};

/// Open the backing file for read/write, falling back to `{path}/{fallback_name}`.
///
/// The primary path is never created. If it cannot be opened it is treated as
/// a directory: the fallback file is created there (existing contents are
/// kept) and opened once more. Returns the file and the path actually used.
pub fn open_backing_file(path: &Path, fallback_name: &str) -> Result<(File, PathBuf)> {
    match open_read_write(path) {
        Ok(file) => {
            debug!("Opened backing file {}", path.display());
            Ok((file, path.to_path_buf()))
        }
        Err(e) => {
            let fallback = path.join(fallback_name);
            warn!(
                "Cannot open {} ({}), falling back to {}",
                path.display(),
                e,
                fallback.display()
            );

            OpenOptions::new()
                .write(true)
                .create(true)
                .open(&fallback)
                .map_err(|source| SnapError::Open {
                    path: fallback.clone(),
                    source,
                })?;

            let file = open_read_write(&fallback).map_err(|source| SnapError::Open {
                path: fallback.clone(),
                source,
            })?;

            Ok((file, fallback))
        }
    }
}

fn open_read_write(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().read(true).write(true).open(path)
}
