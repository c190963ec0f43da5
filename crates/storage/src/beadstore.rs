// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project `issues.jsonl` bead store mirror.
//!
//! The store is log-structured for interop with external CLIs: each write
//! appends the current body of the touched beads, and a reload takes the
//! last record per id. `write_bead_store` rewrites the file compacted;
//! `append_bead` adds one record in place.

use braid_core::Bead;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// File name inside the project's bead store directory.
pub const STORE_FILE: &str = "issues.jsonl";

#[derive(Debug, Error)]
pub enum BeadStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rewrite the store with the given beads, compacted and sorted by id.
pub fn write_bead_store(dir: &Path, beads: &[&Bead]) -> Result<(), BeadStoreError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(STORE_FILE);
    let tmp = path.with_extension("jsonl.tmp");

    let mut sorted: Vec<&&Bead> = beads.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        for bead in sorted {
            let line = serde_json::to_string(bead)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// Append a single bead body (cheap incremental mirror).
pub fn append_bead(dir: &Path, bead: &Bead) -> Result<(), BeadStoreError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(STORE_FILE);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(bead)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Load the store, last record per id wins. Unparseable lines are skipped.
pub fn load_bead_store(dir: &Path) -> Result<Vec<Bead>, BeadStoreError> {
    let path = dir.join(STORE_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(&path)?);
    let mut latest: HashMap<String, Bead> = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Bead>(&line) {
            Ok(bead) => {
                latest.insert(bead.id.as_str().to_string(), bead);
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping unparseable bead store line");
            }
        }
    }
    let mut beads: Vec<Bead> = latest.into_values().collect();
    beads.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(beads)
}

/// Whether a directory looks like a bead store (`issues.jsonl` or `beads/`).
pub fn is_bead_store(dir: &Path) -> bool {
    dir.join(STORE_FILE).exists() || dir.join("beads").is_dir()
}

#[cfg(test)]
#[path = "beadstore_tests.rs"]
mod tests;
