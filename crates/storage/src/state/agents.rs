// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent event handlers.

use super::MaterializedState;
use braid_core::{Agent, AgentStatus, BeadStatus, Event};

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::AgentSpawned { id, name, role, persona_name, persona, project, created_at_ms } => {
            // Idempotency: skip if already exists
            if state.agents.contains_key(id.as_str()) {
                return;
            }
            state.agents.insert(
                id.as_str().to_string(),
                Agent {
                    id: *id,
                    name: name.clone(),
                    role: role.clone(),
                    persona_name: persona_name.clone(),
                    persona: persona.clone(),
                    project: project.clone(),
                    provider: None,
                    // Agents are born paused; a healthy provider attaching
                    // moves them to idle.
                    status: AgentStatus::Paused,
                    current_bead: None,
                    last_active_ms: *created_at_ms,
                },
            );
        }

        Event::AgentStatusChanged { id, status, at_ms, .. } => {
            if let Some(agent) = state.agents.get_mut(id.as_str()) {
                // Stopped is terminal.
                if agent.status.is_terminal() {
                    return;
                }
                agent.status = *status;
                agent.last_active_ms = *at_ms;
            }
        }

        Event::AgentAttached { id, provider, at_ms } => {
            if let Some(agent) = state.agents.get_mut(id.as_str()) {
                if agent.status.is_terminal() {
                    return;
                }
                agent.provider = Some(*provider);
                agent.last_active_ms = *at_ms;
                if agent.status == AgentStatus::Paused {
                    agent.status = AgentStatus::Idle;
                }
            }
        }

        Event::AgentStopped { id, at_ms, .. } => {
            let freed_bead = match state.agents.get_mut(id.as_str()) {
                Some(agent) => {
                    agent.status = AgentStatus::Stopped;
                    agent.last_active_ms = *at_ms;
                    agent.current_bead.take()
                }
                None => return,
            };
            // The stopped agent's claim is released so the bead can be
            // redispatched; the release counts as one hop.
            if let Some(bead_id) = freed_bead {
                if let Some(bead) = state.beads.get_mut(bead_id.as_str()) {
                    if bead.status == BeadStatus::InProgress
                        && bead.assigned_to.as_ref().map(|a| a.as_str()) == Some(id.as_str())
                    {
                        bead.status = BeadStatus::Open;
                        bead.assigned_to = None;
                        bead.updated_at_ms = *at_ms;
                        let hops = bead.redispatch_count() + 1;
                        bead.context.insert(
                            braid_core::bead::ctx::REDISPATCH_COUNT.to_string(),
                            hops.to_string(),
                        );
                    }
                }
            }
        }

        _ => {}
    }
}
