// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutating requests accepted by the daemon.

use braid_core::{BeadKind, DepKind, Persona, Priority, SelectionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::query::Query;

/// Partial bead update; absent fields stay untouched, `context` merges
/// last-write-wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BeadChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
}

/// A workflow signal addressed by stable workflow id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Bead workflow: assignment.
    AssignAgent { agent: String },
    /// Bead workflow: status transition.
    StatusChange { status: String },
    /// Bead workflow: terminal completion.
    Complete {
        #[serde(default)]
        result: Option<String>,
    },
    /// Agent workflow: status update.
    UpdateStatus { status: String },
    /// Agent workflow: work handoff.
    AssignBead { bead: String },
    /// Agent workflow: terminal shutdown.
    Shutdown {
        #[serde(default)]
        reason: Option<String>,
    },
    /// Decision workflow: resolution.
    Resolve {
        decision: String,
        decider: String,
        #[serde(default)]
        rationale: Option<String>,
    },
    /// Dispatcher workflow: immediate wake.
    Trigger,
}

/// Request from a client to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Version handshake
    Hello { version: String },

    /// Health check
    Ping,

    // -- beads --
    CreateBead {
        project: String,
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        priority: Priority,
        #[serde(default)]
        kind: BeadKind,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default)]
        context: HashMap<String, String>,
    },

    UpdateBead {
        id: String,
        changes: BeadChanges,
    },

    AddDependency {
        from: String,
        to: String,
        kind: DepKind,
    },

    ClaimBead {
        id: String,
        agent: String,
    },

    // -- decisions --
    CreateDecision {
        project: String,
        question: String,
        #[serde(default)]
        options: Vec<String>,
        #[serde(default)]
        recommendation: Option<String>,
        #[serde(default)]
        parent: Option<String>,
        #[serde(default)]
        requester: Option<String>,
        #[serde(default)]
        priority: Priority,
    },

    ClaimDecision {
        id: String,
        decider: String,
    },

    ResolveDecision {
        id: String,
        decider: String,
        decision: String,
        #[serde(default)]
        rationale: Option<String>,
    },

    EscalateBead {
        id: String,
        reason: String,
        #[serde(default)]
        returned_to: Option<String>,
    },

    // -- agents --
    SpawnAgent {
        project: String,
        name: String,
        role: String,
        #[serde(default)]
        persona_name: String,
        #[serde(default)]
        persona: Persona,
    },

    StopAgent {
        id: String,
        #[serde(default)]
        reason: Option<String>,
    },

    // -- providers --
    RegisterProvider {
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        kind: Option<String>,
        endpoint: String,
        #[serde(default)]
        model: Option<String>,
    },

    UpdateProvider {
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },

    DeleteProvider {
        id: String,
    },

    /// Re-run model negotiation against the provider's live model list.
    NegotiateModel {
        id: String,
    },

    /// Ephemeral chat completion through a selected or named provider.
    QueryProvider {
        #[serde(default)]
        provider: Option<String>,
        #[serde(default)]
        policy: Option<SelectionPolicy>,
        #[serde(default)]
        system: Option<String>,
        message: String,
        #[serde(default = "default_temperature")]
        temperature: f32,
        #[serde(default = "default_max_tokens")]
        max_tokens: u32,
    },

    // -- workflows --
    SignalWorkflow {
        workflow: String,
        signal: Signal,
    },

    // -- dispatch --
    DispatchNow {
        #[serde(default)]
        project: Option<String>,
    },

    /// Read-only query
    Query { query: Query },

    /// Graceful daemon shutdown
    Shutdown,
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
