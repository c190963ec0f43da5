// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision payload for human-in-the-loop beads.
//!
//! A decision is a bead of kind `Decision` carrying this payload. Resolving
//! it closes the bead and unblocks every parent that carried a blocking edge
//! to it.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Option labels offered on CEO escalations.
pub const CEO_APPROVE: &str = "approve";
pub const CEO_DENY: &str = "deny";
pub const CEO_NEEDS_MORE_INFO: &str = "needs_more_info";

/// A single option the decider can choose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub recommended: bool,
}

impl DecisionOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), description: None, recommended: false }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn recommended(mut self) -> Self {
        self.recommended = true;
        self
    }
}

/// Payload carried by a decision bead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DecisionState {
    pub question: String,
    #[serde(default)]
    pub options: Vec<DecisionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Agent (or caller) that raised the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<AgentId>,
    /// Sticky once set: a different decider gets `DeciderMismatch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decider: Option<String>,
    /// The chosen text, set exactly once on resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at_ms: Option<u64>,
    /// Set when the 48-hour timer fired before anyone resolved.
    #[serde(default)]
    pub timed_out: bool,
}

impl DecisionState {
    pub fn new(question: impl Into<String>, options: Vec<DecisionOption>) -> Self {
        Self { question: question.into(), options, ..Default::default() }
    }

    pub fn is_resolved(&self) -> bool {
        self.decided_at_ms.is_some()
    }

    /// Whether `decider` may claim or resolve this decision.
    pub fn accepts_decider(&self, decider: &str) -> bool {
        match self.decider.as_deref() {
            Some(existing) => existing == decider,
            None => true,
        }
    }
}

/// Errors from decision operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    #[error("decision not found: {0}")]
    NotFound(String),

    #[error("bead {0} is not a decision")]
    NotADecision(String),

    #[error("decision {id} already claimed by {decider}")]
    AlreadyClaimed { id: String, decider: String },

    #[error("decision {id} is claimed by {claimed_by}, not {decider}")]
    DeciderMismatch { id: String, claimed_by: String, decider: String },

    #[error("decision {0} already resolved")]
    AlreadyResolved(String),
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
