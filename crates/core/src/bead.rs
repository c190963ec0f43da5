// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bead records and the bead state machine.
//!
//! A bead is one unit of work: it belongs to a project, carries a priority
//! and a status, and participates in the per-project dependency graph via
//! `depends_on` and `blocked_by` edges.

use crate::agent::AgentId;
use crate::decision::DecisionState;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::HashMap;

/// Well-known keys in a bead's free-form context map.
pub mod ctx {
    /// Number of times the dispatcher has re-assigned this bead.
    pub const REDISPATCH_COUNT: &str = "redispatch_count";
    /// Agent a redispatched bead must return to.
    pub const RETURNED_TO: &str = "returned_to";
    /// Set by the router when it detects an agent loop.
    pub const LOOP_DETECTED: &str = "loop_detected";
    /// Set once a loop/hop guard has escalated, so it fires only once.
    pub const ESCALATED: &str = "escalated";
    /// Escalation target recorded on CEO decisions.
    pub const ESCALATED_TO: &str = "escalated_to";
    /// Rationale written back to a bead the CEO denied.
    pub const CEO_COMMENT: &str = "ceo_comment";
    /// Original bug reference carried by apply-fix beads.
    pub const ORIGINAL_BUG: &str = "original_bug";
}

/// Unique identifier for a bead.
///
/// Bead ids carry the owning project's configured prefix
/// (`{prefix}-{10-char nanoid}`), so unlike the fixed-prefix ids they are
/// backed by a [`SmolStr`] rather than an inline buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct BeadId(SmolStr);

impl BeadId {
    /// Generate a new random id under the given project prefix.
    pub fn generate(prefix: &str) -> Self {
        Self(SmolStr::new(format!("{}-{}", prefix, nanoid::nanoid!(10))))
    }

    pub fn from_string(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for BeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BeadId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for BeadId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for BeadId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::borrow::Borrow<str> for BeadId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<str> for BeadId {
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl PartialEq<&str> for BeadId {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_str() == *other
    }
}

/// Bead priority. `P0` is the most urgent and sorts first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P0,
    P1,
    #[default]
    P2,
    P3,
}

crate::simple_display! {
    Priority {
        P0 => "P0",
        P1 => "P1",
        P2 => "P2",
        P3 => "P3",
    }
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p0" | "0" => Some(Priority::P0),
            "p1" | "1" => Some(Priority::P1),
            "p2" | "2" => Some(Priority::P2),
            "p3" | "3" => Some(Priority::P3),
            _ => None,
        }
    }
}

/// Bead lifecycle status. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BeadStatus {
    #[default]
    Open,
    InProgress,
    Blocked,
    Closed,
}

crate::simple_display! {
    BeadStatus {
        Open => "open",
        InProgress => "in_progress",
        Blocked => "blocked",
        Closed => "closed",
    }
}

impl BeadStatus {
    /// Closed beads never transition again (scheduling-wise).
    pub fn is_terminal(&self) -> bool {
        matches!(self, BeadStatus::Closed)
    }
}

/// What kind of work a bead represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BeadKind {
    #[default]
    Task,
    Bug,
    Decision,
    Chore,
}

crate::simple_display! {
    BeadKind {
        Task => "task",
        Bug => "bug",
        Decision => "decision",
        Chore => "chore",
    }
}

/// Kind of dependency edge between two beads.
///
/// `from depends_on to`: ordering only; `from blocks to` means `from` is
/// blocked until `to` closes (the edge a decision adds to its parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepKind {
    Blocks,
    DependsOn,
}

crate::simple_display! {
    DepKind {
        Blocks => "blocks",
        DependsOn => "depends_on",
    }
}

/// A unit of work owned by one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bead {
    pub id: BeadId,
    pub project: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: BeadKind,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: BeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Free-form string map; merged last-write-wins on update.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
    /// Beads this bead is ordered after.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<BeadId>,
    /// Beads (usually decisions) that must close before this bead is ready.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<BeadId>,
    /// Decision payload; present iff `kind == Decision`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionState>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at_ms: Option<u64>,
}

impl Bead {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_decision(&self) -> bool {
        self.kind == BeadKind::Decision
    }

    /// Whether the claim compare-and-set would currently succeed.
    pub fn is_claimable(&self) -> bool {
        self.status == BeadStatus::Open && self.assigned_to.is_none() && !self.is_decision()
    }

    /// How many times the dispatcher has moved this bead between agents.
    pub fn redispatch_count(&self) -> u32 {
        self.context
            .get(ctx::REDISPATCH_COUNT)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Agent this bead must be dispatched back to, if pinned.
    pub fn returned_to(&self) -> Option<AgentId> {
        self.context.get(ctx::RETURNED_TO).map(AgentId::from_string)
    }

    pub fn loop_detected(&self) -> bool {
        self.context.get(ctx::LOOP_DETECTED).map(|v| v == "true").unwrap_or(false)
    }

    /// Whether a hop/loop guard has already escalated this bead.
    pub fn escalated(&self) -> bool {
        self.context.contains_key(ctx::ESCALATED)
    }
}

/// Errors from bead graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BeadError {
    #[error("unknown project: {0}")]
    InvalidProject(String),

    #[error("bead not found: {0}")]
    NotFound(String),

    #[error("bead {0} is closed; closed is terminal")]
    TerminalBead(String),

    #[error("dependency {from} -> {to} would create a cycle")]
    CycleDetected { from: String, to: String },

    #[error("unknown bead reference: {0}")]
    UnknownRef(String),

    /// Lost the claim race. Soft error; callers retry or move on.
    #[error("bead {0} already claimed")]
    Conflict(String),

    #[error("unknown field: {0}")]
    UnknownField(String),
}

crate::builder! {
    pub struct BeadBuilder => Bead {
        into {
            project: String = "proj",
            title: String = "test bead",
            description: String = "",
        }
        set {
            kind: BeadKind = BeadKind::Task,
            priority: Priority = Priority::P2,
            status: BeadStatus = BeadStatus::Open,
            tags: Vec<String> = Vec::new(),
            context: HashMap<String, String> = HashMap::new(),
            depends_on: Vec<BeadId> = Vec::new(),
            blocked_by: Vec<BeadId> = Vec::new(),
            created_at_ms: u64 = 1_000_000,
            updated_at_ms: u64 = 1_000_000,
        }
        option {
            assigned_to: AgentId = None,
            decision: DecisionState = None,
            closed_at_ms: u64 = None,
        }
        computed {
            id: BeadId = BeadId::generate("proj"),
        }
    }
}

#[cfg(test)]
#[path = "bead_tests.rs"]
mod tests;
