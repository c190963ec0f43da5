// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project records and the readiness cache entry.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Readiness cache TTL.
pub const READINESS_TTL_MS: u64 = 2 * 60 * 1000;

/// Minimum spacing between auto-filed readiness beads for the same issue set.
pub const READINESS_REFILE_MS: u64 = 30 * 60 * 1000;

/// How a project's git remote is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    None,
    Ssh,
}

crate::simple_display! {
    AuthMethod {
        None => "none",
        Ssh => "ssh",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
}

crate::simple_display! {
    ProjectStatus {
        Active => "active",
        Archived => "archived",
    }
}

/// A tenant owning beads and agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Stable operator-chosen id (also the default bead prefix).
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub auth: AuthMethod,
    /// Cloned work tree location.
    pub work_tree: PathBuf,
    /// Bead store path, relative to the work tree.
    pub bead_path: PathBuf,
    /// Prefix for bead ids filed under this project.
    pub prefix: String,
    /// Sticky projects survive database truncation.
    #[serde(default)]
    pub sticky: bool,
    /// Reserved for a future auto-reopen policy; currently only persisted.
    #[serde(default)]
    pub perpetual: bool,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl Project {
    /// Absolute path of the on-disk bead store.
    pub fn bead_store_dir(&self) -> PathBuf {
        self.work_tree.join(&self.bead_path)
    }
}

/// Cached result of the project readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    pub checked_at_ms: u64,
}

impl Readiness {
    pub fn fresh(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.checked_at_ms) < READINESS_TTL_MS
    }
}

crate::builder! {
    pub struct ProjectBuilder => Project {
        into {
            id: String = "proj",
            name: String = "Test Project",
            prefix: String = "proj",
        }
        set {
            auth: AuthMethod = AuthMethod::None,
            work_tree: PathBuf = PathBuf::from("/tmp/proj"),
            bead_path: PathBuf = PathBuf::from(".beads"),
            sticky: bool = false,
            perpetual: bool = false,
            status: ProjectStatus = ProjectStatus::Active,
        }
        option {
            source_url: String = None,
        }
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
