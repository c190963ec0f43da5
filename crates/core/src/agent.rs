// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent worker identities.
//!
//! An agent is a persona-driven worker bound to one project and at most one
//! provider. Agents are created paused (no provider) and become idle when a
//! healthy provider attaches.

use crate::bead::BeadId;
use crate::persona::Persona;
use crate::provider::ProviderId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an agent.
    pub struct AgentId("agt-");
}

/// Agent scheduling status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Working,
    /// No provider, or provider unhealthy. Not schedulable.
    #[default]
    Paused,
    /// Terminal: removed from the schedulable set, locks released.
    Stopped,
}

crate::simple_display! {
    AgentStatus {
        Idle => "idle",
        Working => "working",
        Paused => "paused",
        Stopped => "stopped",
    }
}

impl AgentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Stopped)
    }

    /// Whether the dispatcher may hand this agent work.
    pub fn is_schedulable(&self) -> bool {
        matches!(self, AgentStatus::Idle)
    }
}

/// A worker identity bound to a persona and (optionally) a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub persona_name: String,
    /// In-memory persona data; `working ⇒ current_bead` is assigned to us.
    #[serde(default, skip_serializing_if = "Persona::is_empty")]
    pub persona: Persona,
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_bead: Option<BeadId>,
    #[serde(default)]
    pub last_active_ms: u64,
}

impl Agent {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Idle, attached, and the attachment points at a live provider id.
    pub fn is_dispatchable(&self) -> bool {
        self.status.is_schedulable() && self.provider.is_some()
    }
}

crate::builder! {
    pub struct AgentBuilder => Agent {
        into {
            name: String = "worker",
            role: String = "engineer",
            persona_name: String = "default",
            project: String = "proj",
        }
        set {
            persona: Persona = Persona::default(),
            status: AgentStatus = AgentStatus::Paused,
            last_active_ms: u64 = 1_000_000,
        }
        option {
            provider: ProviderId = None,
            current_bead: BeadId = None,
        }
        computed {
            id: AgentId = AgentId::new(),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
