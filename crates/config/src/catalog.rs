// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model catalog: quality scores used for negotiation and selection.

use serde::{Deserialize, Serialize};

/// One `[[model]]` entry. `pattern` matches model names by substring
/// (case-insensitive), so one entry covers tag variants like
/// `llama3:70b-instruct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub pattern: String,
    pub quality: u32,
    #[serde(default)]
    pub context_window: Option<u32>,
}

/// Ordered model catalog. Earlier entries win ties.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    entries: Vec<CatalogEntry>,
}

impl ModelCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_for(&self, model: &str) -> Option<&CatalogEntry> {
        let lower = model.to_ascii_lowercase();
        self.entries.iter().find(|e| lower.contains(&e.pattern.to_ascii_lowercase()))
    }

    /// Quality score for a model name; unknown models score 0.
    pub fn score(&self, model: &str) -> u32 {
        self.entry_for(model).map(|e| e.quality).unwrap_or(0)
    }

    pub fn context_window(&self, model: &str) -> Option<u32> {
        self.entry_for(model).and_then(|e| e.context_window)
    }

    /// The highest-scoring model among `available`, if any scores above zero.
    pub fn best<'a>(&self, available: &'a [String]) -> Option<&'a str> {
        available
            .iter()
            .map(|m| (self.score(m), m))
            .filter(|(score, _)| *score > 0)
            .max_by_key(|(score, _)| *score)
            .map(|(_, m)| m.as_str())
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
