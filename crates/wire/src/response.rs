// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::query::QueryReply;
use crate::types::{
    AgentSummary, BeadDetail, BeadSummary, DecisionSummary, ErrorKind, ProviderSummary,
    StatusSummary,
};

/// Response from daemon to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    /// A bead was created or looked up
    Bead { bead: Option<Box<BeadDetail>> },

    /// List of beads
    Beads { beads: Vec<BeadSummary> },

    /// Dependency graph (serialized nodes + edges)
    Graph { graph: serde_json::Value },

    /// List of decisions
    Decisions { decisions: Vec<DecisionSummary> },

    /// A decision was created; returns its bead id
    Decision { id: String },

    /// An agent was spawned; returns its id
    Agent { id: String },

    /// List of agents
    Agents { agents: Vec<AgentSummary> },

    /// List of providers
    Providers { providers: Vec<ProviderSummary> },

    /// Ephemeral provider query result
    QueryResult {
        response: String,
        model: String,
        tokens: u32,
        latency_ms: u64,
    },

    /// Workflow query reply
    Workflow { reply: QueryReply },

    /// Dispatch pass counters
    Dispatched {
        dispatched: u32,
        skipped: Vec<(String, String)>,
    },

    /// Daemon status
    Status { status: StatusSummary },

    /// Stable error kind + human message
    Error { kind: ErrorKind, message: String },
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error { kind, message: message.into() }
    }
}
