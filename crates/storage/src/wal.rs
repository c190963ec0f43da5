// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log: an append-only JSONL journal of events.
//!
//! Each line is `{"seq": N, "event": {...}}`. Recovery opens the log with
//! the snapshot's processed sequence; entries after it are replayed via
//! [`Wal::next_unprocessed`].

use braid_core::Event;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors from WAL operations.
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

/// Append-only event journal.
pub struct Wal {
    writer: BufWriter<File>,
    /// Entries not yet handed out by `next_unprocessed`: the on-disk tail
    /// found at open plus everything appended this session.
    unread: VecDeque<WalEntry>,
    write_seq: u64,
    processed_seq: u64,
}

impl Wal {
    /// Open (or create) the journal, queueing entries after `processed_seq`
    /// for replay.
    ///
    /// Lines that fail to parse are skipped with a warning; a torn final
    /// write must not brick recovery.
    pub fn open(path: &Path, processed_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).read(true).append(true).open(path)?;

        let mut unread = VecDeque::new();
        let mut write_seq = 0;
        let reader = BufReader::new(file.try_clone()?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WalEntry>(&line) {
                Ok(entry) => {
                    write_seq = write_seq.max(entry.seq);
                    if entry.seq > processed_seq {
                        unread.push_back(entry);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unparseable WAL line");
                }
            }
        }

        Ok(Self {
            writer: BufWriter::new(file),
            unread,
            write_seq,
            processed_seq,
        })
    }

    /// Append an event, returning its sequence number.
    ///
    /// The entry is immediately visible to `next_unprocessed`; durability
    /// requires a `flush`.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, event: event.clone() };
        let line = serde_json::to_string(&entry)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.unread.push_back(entry);
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Next entry after the processed cursor, if any.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        Ok(self.unread.pop_front())
    }

    /// Advance the processed cursor. Never moves backwards.
    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// Highest sequence ever appended.
    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    /// Highest sequence marked processed.
    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Truncate the journal after a checkpoint has captured everything.
    ///
    /// Keeps the sequence counter monotonic: future appends continue from
    /// `write_seq`, only the bytes are dropped.
    pub fn truncate(&mut self, path: &Path) -> Result<(), WalError> {
        self.writer.flush()?;
        OpenOptions::new().write(true).truncate(true).open(path)?;
        let file = OpenOptions::new().append(true).open(path)?;
        self.writer = BufWriter::new(file);
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
