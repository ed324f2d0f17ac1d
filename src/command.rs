//! Command definitions
//!
//! Single-key operations routed through `Database::execute`.

/// Commands understood by `Database::execute`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read a value
    Get { key: String },

    /// Queue a write
    Set { key: String, value: String },

    /// Queue a delete
    Delete { key: String },

    /// Wait for queued writes to be applied and persisted
    Sync,
}
