// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! braid-storage: durable persistence for the braid daemon.
//!
//! Events are the source of truth: every mutation is appended to the WAL
//! and folded into [`MaterializedState`]. Recovery loads the newest
//! snapshot and replays the WAL tail. Two mirrors exist for interop, not
//! recovery: a relational SQLite database and the per-project
//! `issues.jsonl` bead store.

mod beadstore;
mod snapshot;
mod sqlite;
mod state;
mod store;
mod wal;

pub use beadstore::{
    append_bead, is_bead_store, load_bead_store, write_bead_store, BeadStoreError,
};
pub use snapshot::{load_snapshot, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use sqlite::{SqliteMirror, StoreError};
pub use state::{MaterializedState, WorkGraph, WorkGraphEdge};
pub use store::{Store, StoreOpenError};
pub use wal::{Wal, WalEntry, WalError};
