// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use braid_core::test_support::{bead_created, project_registered};
use braid_core::Priority;
use tempfile::tempdir;

fn sample_state() -> MaterializedState {
    let mut state = MaterializedState::default();
    state.apply_event(&project_registered("proj"));
    state.apply_event(&bead_created("proj-1", "proj", Priority::P0));
    state
}

#[test]
fn write_and_read_roundtrips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");

    let snapshot = Snapshot::new(42, sample_state(), 1_000_000);
    snapshot.write(&path).unwrap();

    let loaded = Snapshot::read(&path).unwrap();
    assert_eq!(loaded.version, CURRENT_SNAPSHOT_VERSION);
    assert_eq!(loaded.seq, 42);
    assert_eq!(loaded.state.beads["proj-1"], sample_state().beads["proj-1"]);
}

#[test]
fn readiness_cache_is_not_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");

    let mut state = sample_state();
    state.readiness.insert(
        "proj".to_string(),
        braid_core::Readiness { ready: true, issues: vec![], checked_at_ms: 1 },
    );
    Snapshot::new(1, state, 1_000_000).write(&path).unwrap();

    let loaded = Snapshot::read(&path).unwrap();
    assert!(loaded.state.readiness.is_empty());
}

#[test]
fn missing_snapshot_loads_none() {
    let dir = tempdir().unwrap();
    assert!(load_snapshot(&dir.path().join("nope.bin")).is_none());
}

#[test]
fn corrupt_snapshot_loads_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");
    std::fs::write(&path, b"not a snapshot").unwrap();
    assert!(load_snapshot(&path).is_none());
}

#[test]
fn write_replaces_atomically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.bin");

    Snapshot::new(1, sample_state(), 1_000_000).write(&path).unwrap();
    Snapshot::new(2, sample_state(), 2_000_000).write(&path).unwrap();

    let loaded = Snapshot::read(&path).unwrap();
    assert_eq!(loaded.seq, 2);
    assert!(!path.with_extension("tmp").exists());
}
