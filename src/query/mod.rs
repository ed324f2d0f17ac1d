//! Query Module
//!
//! Predicate search over stored values decoded as JSON objects.
//!
//! ## Semantics
//! - Linear scan in key order; no indexes
//! - Each value is decoded as it is reached
//! - The first value that fails to decode aborts the scan with
//!   `SnapError::Decode`, even if a later value would have matched
//!
//! Both functions take a `&Store`; the caller holds the `ReadGate`.

mod document;

pub use document::Document;

use crate::error::{Result, SnapError};
use crate::store::Store;

/// Return the first document for which `predicate` holds
///
/// Fails with `SnapError::NotFound` after a full scan with no match.
pub fn find<F>(store: &Store, mut predicate: F) -> Result<Document>
where
    F: FnMut(&Document) -> bool,
{
    for (key, raw) in store {
        let document = Document::parse(key, raw)?;
        if predicate(&document) {
            return Ok(document);
        }
    }

    Err(SnapError::NotFound(
        "no document matched the predicate".to_string(),
    ))
}

/// Return every document for which `predicate` holds (possibly none)
pub fn filter<F>(store: &Store, mut predicate: F) -> Result<Vec<Document>>
where
    F: FnMut(&Document) -> bool,
{
    let mut matches = Vec::new();

    for (key, raw) in store {
        let document = Document::parse(key, raw)?;
        if predicate(&document) {
            matches.push(document);
        }
    }

    Ok(matches)
}
