// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query types for reading daemon state.

use serde::{Deserialize, Serialize};

/// Side-effect-free workflow queries, addressed by stable workflow id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowQuery {
    GetStatus,
    GetAssignedAgent,
    GetCurrentBead,
}

/// Reply to a workflow query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryReply {
    Status { status: String },
    Agent { agent: Option<String> },
    Bead { bead: Option<String> },
}

/// Query types for reading daemon state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    /// List beads, optionally filtered
    ListBeads {
        #[serde(default)]
        project: Option<String>,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        assigned_to: Option<String>,
        #[serde(default)]
        tag: Option<String>,
    },

    /// Single bead details (prefix match supported)
    GetBead { id: String },

    /// Beads ready for dispatch, in dispatch order
    ReadyBeads { project: String },

    /// Dependency graph of a project
    WorkGraph { project: String },

    /// Pending decisions, optionally per project
    ListDecisions {
        #[serde(default)]
        project: Option<String>,
        #[serde(default)]
        pending_only: bool,
    },

    /// List agents, optionally per project
    ListAgents {
        #[serde(default)]
        project: Option<String>,
    },

    /// List providers
    ListProviders {
        #[serde(default)]
        active_only: bool,
    },

    /// Workflow query by stable workflow id
    QueryWorkflow {
        workflow: String,
        query: WorkflowQuery,
    },

    /// Daemon status
    Status,
}
