//! Write request definitions
//!
//! The mutations that travel through the write queue.

/// A single queued mutation
///
/// Ownership moves into the queue on submission; the worker consumes each
/// request exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteRequest {
    /// Insert or overwrite a key
    Set { key: String, value: String },

    /// Remove a key (no-op if absent)
    Delete { key: String },

    /// Truncate the backing file, leaving memory untouched
    Clear,
}

impl WriteRequest {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        WriteRequest::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        WriteRequest::Delete { key: key.into() }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            WriteRequest::Set { .. } => "set",
            WriteRequest::Delete { .. } => "delete",
            WriteRequest::Clear => "clear",
        }
    }
}
