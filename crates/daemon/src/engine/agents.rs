// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent manager: spawn, stop, and status transitions.

use super::{Runtime, RuntimeError};
use braid_core::{Agent, AgentId, AgentStatus, Clock, Event, Persona};

/// Arguments for spawning an agent.
pub struct SpawnAgent {
    pub project: String,
    pub name: String,
    pub role: String,
    pub persona_name: String,
    pub persona: Persona,
}

impl<C: Clock> Runtime<C> {
    /// Spawn a worker identity. Agents are created paused; the provider
    /// attachment protocol resumes them.
    pub fn spawn_agent(&self, params: SpawnAgent) -> Result<Agent, RuntimeError> {
        if !self.settings.allowed_roles.is_empty()
            && !self.settings.allowed_roles.contains(&params.role)
        {
            return Err(RuntimeError::RoleNotAllowed {
                role: params.role,
                allowed: self.settings.allowed_roles.join(", "),
            });
        }
        let exists =
            self.lock_state(|state| state.projects.contains_key(&params.project));
        if !exists {
            return Err(braid_core::BeadError::InvalidProject(params.project).into());
        }

        let id = AgentId::new();
        let event = Event::AgentSpawned {
            id,
            name: params.name,
            role: params.role,
            persona_name: params.persona_name,
            persona: params.persona,
            project: params.project,
            created_at_ms: self.now_ms(),
        };
        self.emit(event)?;

        // A healthy provider may already be available; attach immediately
        // instead of waiting for its next beat.
        if let Some(provider) = self.registry.select(self.settings.selection_policy) {
            self.emit(Event::AgentAttached {
                id,
                provider: provider.id,
                at_ms: self.now_ms(),
            })?;
        }

        self.lock_state(|state| state.agents.get(id.as_str()).cloned())
            .ok_or_else(|| RuntimeError::AgentNotFound(id.as_str().to_string()))
    }

    /// Stop an agent: terminal, releases its claim and file locks.
    pub fn stop_agent(&self, id: &str, reason: Option<&str>) -> Result<(), RuntimeError> {
        let agent_id = self
            .lock_state(|state| state.get_agent(id).map(|a| a.id))
            .ok_or_else(|| RuntimeError::AgentNotFound(id.to_string()))?;
        self.emit(Event::AgentStopped {
            id: agent_id,
            reason: reason.map(String::from),
            at_ms: self.now_ms(),
        })?;
        Ok(())
    }

    /// Agent workflow signal: update_status.
    pub fn update_agent_status(&self, id: &str, status: AgentStatus) -> Result<(), RuntimeError> {
        let agent_id = self
            .lock_state(|state| state.get_agent(id).map(|a| a.id))
            .ok_or_else(|| RuntimeError::AgentNotFound(id.to_string()))?;
        if status == AgentStatus::Stopped {
            return self.stop_agent(id, Some("shutdown signal"));
        }
        self.emit(Event::AgentStatusChanged {
            id: agent_id,
            status,
            reason: None,
            at_ms: self.now_ms(),
        })?;
        Ok(())
    }
}
