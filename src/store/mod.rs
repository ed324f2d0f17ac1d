//! Store Module
//!
//! The authoritative in-memory state.
//!
//! ## Responsibilities
//! - Map string keys to raw string values
//! - Raw set/get/delete with no synchronization of its own
//! - Shared access through the `ReadGate`
//!
//! ## Data Structure Choice
//! Using BTreeMap behind a single Mutex:
//! - Sorted keys give a deterministic snapshot encoding
//! - One writer thread plus short reader critical sections
//! - Values are kept as raw strings and only decoded by queries

mod gate;
mod table;

pub use gate::ReadGate;
pub use table::Store;
