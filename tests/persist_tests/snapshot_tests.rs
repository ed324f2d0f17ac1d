//! Snapshot Persister Tests
//!
//! These tests verify:
//! - Backing file resolution and directory fallback
//! - Full rewrite on every persist (no stale tail bytes)
//! - Clear truncates the file only
//! - Loading existing snapshots

use std::collections::BTreeMap;
use std::fs;

use snapkv::config::Config;
use snapkv::persist::{open_backing_file, read_snapshot, SnapshotPersister};
use snapkv::store::Store;
use snapkv::SnapError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_persister() -> (TempDir, SnapshotPersister) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    fs::write(&path, "").unwrap();

    let config = Config::builder().path(&path).build();
    let persister = SnapshotPersister::open(&config).unwrap();
    (temp_dir, persister)
}

fn store_of(pairs: &[(&str, &str)]) -> Store {
    let mut store = Store::new();
    for (k, v) in pairs {
        store.set_raw(k.to_string(), v.to_string());
    }
    store
}

// =============================================================================
// File Resolution Tests
// =============================================================================

#[test]
fn test_open_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    fs::write(&path, "{}").unwrap();

    let (_file, used) = open_backing_file(&path, "my-db.txt").unwrap();

    assert_eq!(used, path);
}

#[test]
fn test_open_directory_falls_back() {
    let temp_dir = TempDir::new().unwrap();

    let (_file, used) = open_backing_file(temp_dir.path(), "my-db.txt").unwrap();

    assert_eq!(used, temp_dir.path().join("my-db.txt"));
    assert!(used.exists());
}

#[test]
fn test_fallback_keeps_existing_contents() {
    let temp_dir = TempDir::new().unwrap();
    let fallback = temp_dir.path().join("my-db.txt");
    fs::write(&fallback, r#"{"k":"v"}"#).unwrap();

    let (_file, used) = open_backing_file(temp_dir.path(), "my-db.txt").unwrap();

    assert_eq!(used, fallback);
    assert_eq!(fs::read_to_string(&fallback).unwrap(), r#"{"k":"v"}"#);
}

#[test]
fn test_open_fails_when_fallback_cannot_be_created() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing").join("db.json");

    let err = open_backing_file(&path, "my-db.txt").unwrap_err();

    match err {
        SnapError::Open { path: failed, .. } => {
            assert_eq!(failed, path.join("my-db.txt"));
        }
        other => panic!("expected Open error, got {:?}", other),
    }
}

// =============================================================================
// Persist Tests
// =============================================================================

#[test]
fn test_persist_writes_json_object() {
    let (_temp, mut persister) = setup_temp_persister();
    let store = store_of(&[("b", "2"), ("a", r#"{"x":1}"#)]);

    let written = persister.persist(&store).unwrap();

    let contents = fs::read_to_string(persister.path()).unwrap();
    assert_eq!(contents, r#"{"a":"{\"x\":1}","b":"2"}"#);
    assert_eq!(written, contents.len());
}

#[test]
fn test_persist_replaces_longer_previous_contents() {
    let (_temp, mut persister) = setup_temp_persister();

    persister
        .persist(&store_of(&[("key", "a-rather-long-value-that-takes-space")]))
        .unwrap();
    persister.persist(&store_of(&[("key", "short")])).unwrap();

    let contents = fs::read_to_string(persister.path()).unwrap();
    assert_eq!(contents, r#"{"key":"short"}"#);
}

#[test]
fn test_persist_empty_store() {
    let (_temp, mut persister) = setup_temp_persister();

    persister.persist(&Store::new()).unwrap();

    assert_eq!(fs::read_to_string(persister.path()).unwrap(), "{}");
}

#[test]
fn test_clear_truncates_file() {
    let (_temp, mut persister) = setup_temp_persister();
    persister.persist(&store_of(&[("k", "v")])).unwrap();

    persister.clear().unwrap();

    assert_eq!(fs::metadata(persister.path()).unwrap().len(), 0);
}

// =============================================================================
// Load Tests
// =============================================================================

#[test]
fn test_load_empty_file() {
    let (_temp, mut persister) = setup_temp_persister();

    let store = persister.load().unwrap();

    assert!(store.is_empty());
}

#[test]
fn test_load_after_persist() {
    let (_temp, mut persister) = setup_temp_persister();
    let original = store_of(&[("a", "1"), ("b", r#"{"v":true}"#)]);
    persister.persist(&original).unwrap();

    let loaded = persister.load().unwrap();

    assert_eq!(loaded, original);
}

#[test]
fn test_load_rejects_non_object_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let config = Config::builder().path(&path).build();
    let mut persister = SnapshotPersister::open(&config).unwrap();

    assert!(matches!(persister.load(), Err(SnapError::Serialization(_))));
}

#[test]
fn test_read_snapshot_matches_store() {
    let (_temp, mut persister) = setup_temp_persister();
    persister.persist(&store_of(&[("x", "1"), ("y", "2")])).unwrap();

    let map = read_snapshot(persister.path()).unwrap();

    let mut expected = BTreeMap::new();
    expected.insert("x".to_string(), "1".to_string());
    expected.insert("y".to_string(), "2".to_string());
    assert_eq!(map, expected);
}

#[test]
fn test_persist_without_fsync() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path())
        .sync_on_persist(false)
        .build();
    let mut persister = SnapshotPersister::open(&config).unwrap();

    persister.persist(&store_of(&[("k", "v")])).unwrap();

    assert_eq!(read_snapshot(persister.path()).unwrap().len(), 1);
}
