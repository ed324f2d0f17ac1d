//! Persist Module
//!
//! Full-snapshot persistence of the Store to a single JSON file.
//!
//! ## Responsibilities
//! - Resolve the backing file (with directory fallback)
//! - Rewrite the whole file after every mutation
//! - Load an existing snapshot on open
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ {"key-a":"raw value","key-b":"{\"x\":1}"} │
//! └─────────────────────────────────────────┘
//! ```
//! One JSON object, keys sorted, values are the raw stored strings.
//! No header, no version, no framing. An empty file is an empty store.

mod file;
mod snapshot;

pub use file::open_backing_file;
pub use snapshot::{read_snapshot, SnapshotPersister};
