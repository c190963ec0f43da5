// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The composed durable store: WAL + materialized state + mirrors.
//!
//! `commit` is the single write path. Persisted events go WAL-first, then
//! fold into state, then mirror to SQLite; transient events only touch
//! state. Recovery is snapshot + WAL tail replay.

use crate::snapshot::{load_snapshot, Snapshot, SnapshotError};
use crate::sqlite::{SqliteMirror, StoreError};
use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use braid_core::Event;
use parking_lot::{Mutex, MutexGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Events between automatic checkpoints (the history bound).
pub const CHECKPOINT_EVERY: u64 = 10_000;

const WAL_FILE: &str = "events.wal";
const SNAPSHOT_FILE: &str = "snapshot.bin";

/// Fatal errors opening the store at boot.
#[derive(Debug, thiserror::Error)]
pub enum StoreOpenError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] StoreError),
}

/// Durable store shared by the engine and the listener.
pub struct Store {
    state: Arc<Mutex<MaterializedState>>,
    wal: Mutex<Wal>,
    wal_path: PathBuf,
    snapshot_path: PathBuf,
    mirror: Option<SqliteMirror>,
    since_checkpoint: Mutex<u64>,
}

impl Store {
    /// Open the store under `state_dir`, replaying snapshot + WAL tail.
    ///
    /// Returns the store and the number of replayed WAL entries.
    pub fn open(state_dir: &Path, db_file: Option<&Path>) -> Result<(Self, u64), StoreOpenError> {
        let wal_path = state_dir.join(WAL_FILE);
        let snapshot_path = state_dir.join(SNAPSHOT_FILE);

        let (mut state, processed_seq) = match load_snapshot(&snapshot_path) {
            Some(snapshot) => (snapshot.state, snapshot.seq),
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(&wal_path, processed_seq)?;
        let mut replayed = 0;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq);
            replayed += 1;
        }

        let mirror = match db_file {
            Some(path) => {
                let mirror = SqliteMirror::open(path)?;
                // Hydration check: converge the relational mirror with the
                // replayed truth.
                mirror.resync(&state)?;
                Some(mirror)
            }
            None => None,
        };

        tracing::info!(
            replayed,
            seq = wal.write_seq(),
            beads = state.beads.len(),
            agents = state.agents.len(),
            providers = state.providers.len(),
            "store opened"
        );

        Ok((
            Self {
                state: Arc::new(Mutex::new(state)),
                wal: Mutex::new(wal),
                wal_path,
                snapshot_path,
                mirror,
                since_checkpoint: Mutex::new(0),
            },
            replayed,
        ))
    }

    /// Shared handle to the materialized state.
    pub fn state(&self) -> Arc<Mutex<MaterializedState>> {
        Arc::clone(&self.state)
    }

    pub fn lock_state(&self) -> MutexGuard<'_, MaterializedState> {
        self.state.lock()
    }

    /// Commit an event: WAL append (unless transient), apply, mirror.
    pub fn commit(&self, event: &Event) -> Result<(), WalError> {
        let mut state = self.state.lock();
        self.commit_with(&mut state, event)
    }

    /// Commit while already holding the state lock.
    ///
    /// This is the atomicity primitive: compare-and-set operations validate
    /// against `state` and commit under the same guard, so no other writer
    /// can interleave.
    pub fn commit_with(
        &self,
        state: &mut MaterializedState,
        event: &Event,
    ) -> Result<(), WalError> {
        if !event.is_transient() {
            let mut wal = self.wal.lock();
            wal.append(event)?;
            wal.flush()?;
            let seq = wal.write_seq();
            wal.mark_processed(seq);
            *self.since_checkpoint.lock() += 1;
        }

        state.apply_event(event);

        if !event.is_transient() {
            if let Some(mirror) = &self.mirror {
                if let Err(e) = mirror.mirror(event, state) {
                    // The mirror is interop, not truth; a failed write-through
                    // is logged and resynced at next boot.
                    tracing::warn!(error = %e, event = event.type_tag(), "sqlite mirror write failed");
                }
            }
        }
        Ok(())
    }

    /// Whether enough events accumulated to warrant a checkpoint.
    pub fn checkpoint_due(&self) -> bool {
        *self.since_checkpoint.lock() >= CHECKPOINT_EVERY
    }

    /// Write a snapshot and truncate the WAL (the continue-as-new analog).
    pub fn checkpoint(&self, now_ms: u64) -> Result<(), StoreOpenError> {
        let state = self.state.lock();
        let mut wal = self.wal.lock();
        let snapshot = Snapshot::new(wal.write_seq(), state.clone(), now_ms);
        snapshot.write(&self.snapshot_path)?;
        wal.truncate(&self.wal_path)?;
        *self.since_checkpoint.lock() = 0;
        tracing::info!(seq = snapshot.seq, "checkpoint written");
        Ok(())
    }

    /// Flush and checkpoint on graceful shutdown.
    pub fn close(&self, now_ms: u64) {
        if let Err(e) = self.checkpoint(now_ms) {
            tracing::warn!(error = %e, "final checkpoint failed");
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
