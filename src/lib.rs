//! # SnapKV
//!
//! An embedded, single-process key-value store with:
//! - The whole dataset held in memory
//! - Every write serialized through one worker thread
//! - A full JSON snapshot of the data rewritten after each mutation
//! - Predicate queries (`find` / `filter`) over JSON-encoded values
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │                  (many caller threads)                       │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ set / delete / clear          │ get / find / filter
//!                ▼                               │
//!   ┌─────────────────────────┐                  │
//!   │     Write Serializer    │                  │
//!   │ (bounded queue, 1 thread)│                 │
//!   └────────────┬────────────┘                  │
//!                │                               │
//!                ▼                               ▼
//!         ┌─────────────────────────────────────────────┐
//!         │            Read Gate (Mutex<Store>)          │
//!         └──────────────────────┬──────────────────────┘
//!                                │ after every write
//!                                ▼
//!                       ┌─────────────────┐
//!                       │ Snapshot (JSON) │
//!                       │  whole-file     │
//!                       └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use snapkv::Database;
//!
//! // A directory resolves to ./my-db.txt, created on first open
//! let db = Database::open_path(".")?;
//! db.set("user:1", r#"{"name": "ada", "admin": true}"#)?;
//! db.sync()?;
//!
//! let admin = db.find(|doc| doc["admin"] == true)?;
//! assert_eq!(admin.get_str("name"), Some("ada"));
//! # Ok::<(), snapkv::SnapError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod command;

pub mod store;
pub mod persist;
pub mod writer;
pub mod query;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use command::Command;
pub use config::Config;
pub use engine::Database;
pub use error::{Result, SnapError};
pub use query::Document;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SnapKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
