// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol DTOs: summaries and details sent back to clients.

use braid_core::{Agent, Bead, Provider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable error kinds clients can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Terminal,
    Cycle,
    DeciderMismatch,
    AlreadyClaimed,
    Unavailable,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeadSummary {
    pub id: String,
    pub project: String,
    pub title: String,
    pub kind: String,
    pub priority: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at_ms: u64,
}

impl From<&Bead> for BeadSummary {
    fn from(bead: &Bead) -> Self {
        Self {
            id: bead.id.as_str().to_string(),
            project: bead.project.clone(),
            title: bead.title.clone(),
            kind: bead.kind.to_string(),
            priority: bead.priority.to_string(),
            status: bead.status.to_string(),
            assigned_to: bead.assigned_to.as_ref().map(|a| a.as_str().to_string()),
            tags: bead.tags.clone(),
            created_at_ms: bead.created_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeadDetail {
    #[serde(flatten)]
    pub summary: BeadSummary,
    pub description: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionSummary>,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at_ms: Option<u64>,
}

impl From<&Bead> for BeadDetail {
    fn from(bead: &Bead) -> Self {
        Self {
            summary: bead.into(),
            description: bead.description.clone(),
            context: bead.context.clone(),
            depends_on: bead.depends_on.iter().map(|d| d.as_str().to_string()).collect(),
            blocked_by: bead.blocked_by.iter().map(|d| d.as_str().to_string()).collect(),
            decision: bead.decision.as_ref().map(|d| DecisionSummary {
                id: bead.id.as_str().to_string(),
                question: d.question.clone(),
                options: d.options.iter().map(|o| o.label.clone()).collect(),
                recommendation: d.recommendation.clone(),
                decider: d.decider.clone(),
                decision: d.decision.clone(),
                rationale: d.rationale.clone(),
                decided_at_ms: d.decided_at_ms,
                timed_out: d.timed_out,
            }),
            updated_at_ms: bead.updated_at_ms,
            closed_at_ms: bead.closed_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionSummary {
    pub id: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at_ms: Option<u64>,
    #[serde(default)]
    pub timed_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub role: String,
    pub project: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_bead: Option<String>,
    pub last_active_ms: u64,
}

impl From<&Agent> for AgentSummary {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id.as_str().to_string(),
            name: agent.name.clone(),
            role: agent.role.clone(),
            project: agent.project.clone(),
            status: agent.status.to_string(),
            provider: agent.provider.as_ref().map(|p| p.as_str().to_string()),
            current_bead: agent.current_bead.as_ref().map(|b| b.as_str().to_string()),
            last_active_ms: agent.last_active_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub endpoint: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<&Provider> for ProviderSummary {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id.as_str().to_string(),
            name: provider.name.clone(),
            kind: provider.kind.clone(),
            endpoint: provider.endpoint.clone(),
            status: provider.status.to_string(),
            selected_model: provider.selected_model.clone(),
            latency_ms: provider.last_latency_ms,
            last_error: provider.last_error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusSummary {
    pub uptime_secs: u64,
    pub projects: usize,
    pub beads_open: usize,
    pub beads_in_progress: usize,
    pub agents_idle: usize,
    pub agents_working: usize,
    pub providers_healthy: usize,
}
