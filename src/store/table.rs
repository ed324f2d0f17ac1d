//! Store implementation
//!
//! BTreeMap-based key/value table. Not thread-safe on its own; callers hold the
//! `ReadGate` or are the sole writer.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::error::{Result, SnapError};

/// In-memory mapping from key to raw value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    data: BTreeMap<String, String>,
}

impl Store {
    /// Create a new empty Store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a Store from an existing mapping (snapshot load)
    pub fn from_map(data: BTreeMap<String, String>) -> Self {
        Self { data }
    }

    /// Insert or overwrite a value, returning the previous one
    pub fn set_raw(&mut self, key: String, value: String) -> Option<String> {
        self.data.insert(key, value)
    }

    /// Look up a value by key
    pub fn get_raw(&self, key: &str) -> Result<&str> {
        self.data
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| SnapError::NotFound(format!("no value for key '{}'", key)))
    }

    /// Remove a key. Absent keys are a no-op.
    pub fn delete_raw(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Entries in sorted key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.data.iter()
    }

    /// Borrow the underlying mapping (for snapshot encoding)
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
