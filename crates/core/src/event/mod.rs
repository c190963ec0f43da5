// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event types for the braid system

mod methods;

use crate::agent::{AgentId, AgentStatus};
use crate::bead::{BeadId, BeadKind, BeadStatus, DepKind, Priority};
use crate::decision::DecisionOption;
use crate::motivation::MotivationId;
use crate::persona::Persona;
use crate::project::AuthMethod;
use crate::provider::{ProviderId, QueryId};
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Result of one provider heartbeat probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeartbeatOutcome {
    Healthy {
        latency_ms: u64,
        model: String,
        score: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context_window: Option<u32>,
    },
    Unhealthy {
        error: String,
    },
}

/// Result of an ephemeral provider chat query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Ok {
        response: String,
        model: String,
        tokens: u32,
        latency_ms: u64,
    },
    Err {
        error: String,
    },
}

/// Why the dispatcher skipped a project or bead during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReason {
    pub subject: String,
    pub reason: String,
}

impl SkipReason {
    pub fn new(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { subject: subject.into(), reason: reason.into() }
    }
}

/// Events that trigger state transitions in the system.
///
/// Serializes with `{"type": "scope:name", ...fields}` format. Persisted
/// events are appended to the WAL and replayed into materialized state;
/// transient events (see [`Event::is_transient`]) only ride the bus.
/// Unknown type tags deserialize to `Custom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- project --
    #[serde(rename = "project:registered")]
    ProjectRegistered {
        id: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_url: Option<String>,
        #[serde(default)]
        auth: AuthMethod,
        work_tree: PathBuf,
        bead_path: PathBuf,
        prefix: String,
        #[serde(default)]
        sticky: bool,
        #[serde(default)]
        perpetual: bool,
    },

    /// Readiness probe result (cache refresh; transient).
    #[serde(rename = "project:readiness")]
    ProjectReadiness {
        id: String,
        ready: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        issues: Vec<String>,
        checked_at_ms: u64,
        /// Public key embedded when an SSH issue was found.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        public_key: Option<String>,
    },

    // -- bead --
    #[serde(rename = "bead:created")]
    BeadCreated {
        id: BeadId,
        project: String,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        kind: BeadKind,
        #[serde(default)]
        priority: Priority,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tags: Vec<String>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: HashMap<String, String>,
        created_at_ms: u64,
    },

    /// Field merge; absent fields are left untouched, `context` merges
    /// last-write-wins.
    #[serde(rename = "bead:updated")]
    BeadUpdated {
        id: BeadId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        priority: Option<Priority>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: HashMap<String, String>,
        updated_at_ms: u64,
    },

    #[serde(rename = "bead:status_changed")]
    BeadStatusChanged {
        id: BeadId,
        status: BeadStatus,
        updated_at_ms: u64,
    },

    #[serde(rename = "bead:assigned")]
    BeadAssigned {
        id: BeadId,
        /// `None` clears the assignment.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        agent: Option<AgentId>,
        updated_at_ms: u64,
    },

    /// Successful claim: open→in_progress plus assignment, one atomic fact.
    #[serde(rename = "bead:claimed")]
    BeadClaimed {
        id: BeadId,
        agent: AgentId,
        claimed_at_ms: u64,
    },

    #[serde(rename = "bead:completed")]
    BeadCompleted {
        id: BeadId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<String>,
        closed_at_ms: u64,
    },

    #[serde(rename = "bead:dep_added")]
    BeadDepAdded {
        from: BeadId,
        to: BeadId,
        kind: DepKind,
    },

    #[serde(rename = "bead:dep_removed")]
    BeadDepRemoved { from: BeadId, to: BeadId },

    /// A bead became ready because a blocking decision resolved (transient).
    #[serde(rename = "bead:unblocked")]
    BeadUnblocked { id: BeadId, decision: BeadId },

    // -- decision --
    /// Creates the decision bead and, when `parent` is set, the
    /// `parent blocked_by decision` edge.
    #[serde(rename = "decision:created")]
    DecisionCreated {
        id: BeadId,
        project: String,
        title: String,
        question: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<DecisionOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recommendation: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<BeadId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        requester: Option<AgentId>,
        #[serde(default)]
        priority: Priority,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        context: HashMap<String, String>,
        created_at_ms: u64,
    },

    #[serde(rename = "decision:claimed")]
    DecisionClaimed { id: BeadId, decider: String },

    /// Sets the payload and closes the bead in one atomic fact
    /// (`decided_at set ⇒ closed`).
    #[serde(rename = "decision:resolved")]
    DecisionResolved {
        id: BeadId,
        decider: String,
        decision: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
        resolved_at_ms: u64,
    },

    /// The 48-hour timer fired before anyone resolved.
    #[serde(rename = "decision:timed_out")]
    DecisionTimedOut { id: BeadId, at_ms: u64 },

    // -- agent --
    #[serde(rename = "agent:spawned")]
    AgentSpawned {
        id: AgentId,
        name: String,
        role: String,
        persona_name: String,
        #[serde(default, skip_serializing_if = "Persona::is_empty")]
        persona: Persona,
        project: String,
        created_at_ms: u64,
    },

    #[serde(rename = "agent:status_changed")]
    AgentStatusChanged {
        id: AgentId,
        status: AgentStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        at_ms: u64,
    },

    /// Provider attachment: sets the provider and moves the agent to idle.
    #[serde(rename = "agent:attached")]
    AgentAttached {
        id: AgentId,
        provider: ProviderId,
        at_ms: u64,
    },

    /// Terminal: the agent leaves the schedulable set.
    #[serde(rename = "agent:stopped")]
    AgentStopped {
        id: AgentId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        at_ms: u64,
    },

    // -- provider --
    #[serde(rename = "provider:registered")]
    ProviderRegistered {
        id: ProviderId,
        name: String,
        kind: String,
        endpoint: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        configured_model: Option<String>,
        registered_at_ms: u64,
    },

    #[serde(rename = "provider:updated")]
    ProviderUpdated {
        id: ProviderId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        configured_model: Option<String>,
    },

    #[serde(rename = "provider:deleted")]
    ProviderDeleted { id: ProviderId },

    /// Heartbeat write-through: health, latency, and the negotiated model.
    #[serde(rename = "provider:heartbeat")]
    ProviderHeartbeat {
        id: ProviderId,
        outcome: HeartbeatOutcome,
        at_ms: u64,
    },

    // -- query --
    /// Ephemeral provider chat query finished (transient).
    #[serde(rename = "query:completed")]
    QueryCompleted { id: QueryId, outcome: QueryOutcome },

    // -- dispatch --
    /// One dispatcher pass finished (transient telemetry).
    #[serde(rename = "dispatch:tick")]
    DispatchTick {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<String>,
        dispatched: u32,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        skipped: Vec<SkipReason>,
    },

    // -- motivation --
    #[serde(rename = "motivation:registered")]
    MotivationRegistered {
        id: MotivationId,
        motivation: crate::motivation::Motivation,
    },

    #[serde(rename = "motivation:triggered")]
    MotivationTriggered { id: MotivationId, at_ms: u64 },

    // -- timer --
    /// A scheduled timer elapsed (transient; routed via [`crate::TimerKind`]).
    #[serde(rename = "timer:fired")]
    TimerFired { id: TimerId },

    // -- system --
    #[serde(rename = "system:shutdown")]
    Shutdown,

    /// Catch-all for unknown event types (extensibility)
    #[serde(other, skip_serializing)]
    Custom,
}

#[cfg(test)]
#[path = "../event_tests.rs"]
mod tests;
