//! Write Serializer Tests
//!
//! These tests verify:
//! - Requests are applied in submission order
//! - Every write is followed by a snapshot
//! - sync waits for the worker
//! - Timed admission and timed sync
//! - Shutdown drains the queue

use std::fs;
use std::thread;
use std::time::Duration;

use snapkv::config::Config;
use snapkv::persist::{read_snapshot, SnapshotPersister};
use snapkv::store::{ReadGate, Store};
use snapkv::writer::{WriteRequest, WriteSerializer};
use snapkv::SnapError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_serializer(capacity: usize) -> (TempDir, ReadGate, WriteSerializer, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().path(temp_dir.path()).build();
    let persister = SnapshotPersister::open(&config).unwrap();
    let path = persister.path().to_path_buf();

    let gate = ReadGate::new(Store::new());
    let writer = WriteSerializer::spawn(gate.clone(), persister, capacity).unwrap();
    (temp_dir, gate, writer, path)
}

fn get(gate: &ReadGate, key: &str) -> Option<String> {
    gate.read(|store| store.get_raw(key).ok().map(str::to_string))
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_single_producer_order_is_preserved() {
    let (_temp, gate, writer, _path) = setup_serializer(16);

    for i in 0..100 {
        writer.submit(WriteRequest::set("key", i.to_string())).unwrap();
    }
    writer.sync().unwrap();

    assert_eq!(get(&gate, "key"), Some("99".to_string()));
}

#[test]
fn test_set_then_delete_is_ordered() {
    let (_temp, gate, writer, _path) = setup_serializer(16);

    writer.submit(WriteRequest::set("key", "value")).unwrap();
    writer.submit(WriteRequest::delete("key")).unwrap();
    writer.sync().unwrap();

    assert_eq!(get(&gate, "key"), None);
}

#[test]
fn test_rendezvous_queue() {
    let (_temp, gate, writer, _path) = setup_serializer(0);

    for i in 0..20 {
        writer
            .submit(WriteRequest::set(format!("k{}", i), i.to_string()))
            .unwrap();
    }
    writer.sync().unwrap();

    assert_eq!(gate.read(Store::len), 20);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_snapshot_matches_store_after_sync() {
    let (_temp, gate, writer, path) = setup_serializer(16);

    writer.submit(WriteRequest::set("a", "1")).unwrap();
    writer.submit(WriteRequest::set("b", "2")).unwrap();
    writer.submit(WriteRequest::delete("a")).unwrap();
    writer.sync().unwrap();

    let on_disk = read_snapshot(&path).unwrap();
    assert_eq!(on_disk, gate.read(|store| store.as_map().clone()));
}

#[test]
fn test_clear_request_truncates_file_only() {
    let (_temp, gate, writer, path) = setup_serializer(16);

    writer.submit(WriteRequest::set("a", "1")).unwrap();
    writer.submit(WriteRequest::Clear).unwrap();
    writer.sync().unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert_eq!(get(&gate, "a"), Some("1".to_string()));
}

// =============================================================================
// Timeout Tests
// =============================================================================

#[test]
fn test_submit_timeout_and_sync_timeout_while_worker_blocked() {
    let (_temp, gate, writer, _path) = setup_serializer(1);

    {
        // Holding the gate stalls the worker on its first request
        let _held = gate.lock();

        writer.submit(WriteRequest::set("first", "1")).unwrap();
        writer.submit(WriteRequest::set("second", "2")).unwrap();

        let err = writer
            .submit_timeout(WriteRequest::set("third", "3"), Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, SnapError::Timeout(_)));

        let err = writer.sync_timeout(Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, SnapError::Timeout(_)));
        assert_eq!(writer.pending(), 2);
    }

    writer.sync().unwrap();
    assert_eq!(writer.pending(), 0);
    assert_eq!(get(&gate, "first"), Some("1".to_string()));
    assert_eq!(get(&gate, "second"), Some("2".to_string()));
    assert_eq!(get(&gate, "third"), None);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_shutdown_drains_queue() {
    let (_temp, gate, mut writer, path) = setup_serializer(64);

    for i in 0..50 {
        writer
            .submit(WriteRequest::set(format!("k{}", i), i.to_string()))
            .unwrap();
    }
    writer.shutdown().unwrap();

    assert_eq!(gate.read(Store::len), 50);
    assert_eq!(read_snapshot(&path).unwrap().len(), 50);
}

#[test]
fn test_submit_after_shutdown_is_closed() {
    let (_temp, _gate, mut writer, _path) = setup_serializer(4);

    writer.shutdown().unwrap();
    writer.shutdown().unwrap();

    let err = writer.submit(WriteRequest::set("k", "v")).unwrap_err();
    assert!(matches!(err, SnapError::Closed));
    assert_eq!(writer.pending(), 0);
}

#[test]
fn test_concurrent_producers() {
    let (_temp, gate, writer, _path) = setup_serializer(8);

    thread::scope(|s| {
        for t in 0..4 {
            let writer = &writer;
            s.spawn(move || {
                for i in 0..25 {
                    writer
                        .submit(WriteRequest::set(format!("t{}-{}", t, i), i.to_string()))
                        .unwrap();
                }
            });
        }
    });
    writer.sync().unwrap();

    assert_eq!(gate.read(Store::len), 100);
}

#[cfg(target_os = "linux")]
#[test]
fn test_persistence_failure_reported_by_sync() {
    // Writes to /dev/full always fail with ENOSPC
    let config = Config::builder().path("/dev/full").build();
    let persister = match SnapshotPersister::open(&config) {
        Ok(p) => p,
        Err(_) => return,
    };
    let gate = ReadGate::new(Store::new());
    let writer = WriteSerializer::spawn(gate.clone(), persister, 4).unwrap();

    writer.submit(WriteRequest::set("k", "v")).unwrap();

    assert!(matches!(writer.sync(), Err(SnapError::Persistence(_))));
    assert_eq!(writer.persistence_failures(), 1);
    assert_eq!(get(&gate, "k"), Some("v".to_string()));

    // Failure is reported once
    writer.sync().unwrap();
}

#[cfg(target_os = "linux")]
#[test]
fn test_persistence_failure_goes_to_first_syncer() {
    let config = Config::builder().path("/dev/full").build();
    let persister = match SnapshotPersister::open(&config) {
        Ok(p) => p,
        Err(_) => return,
    };
    let gate = ReadGate::new(Store::new());
    let writer = WriteSerializer::spawn(gate, persister, 4).unwrap();

    // This thread's write fails, but another thread syncs first
    writer.submit(WriteRequest::set("k", "v")).unwrap();
    let other = thread::scope(|s| s.spawn(|| writer.sync()).join().unwrap());
    assert!(matches!(other, Err(SnapError::Persistence(_))));

    writer.sync().unwrap();
    assert_eq!(writer.persistence_failures(), 1);
}
