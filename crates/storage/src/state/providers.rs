// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider event handlers, including the agent attachment protocol.

use super::MaterializedState;
use braid_core::{
    AgentStatus, Event, HeartbeatOutcome, Provider, ProviderId, ProviderStatus, FAILURES_TO_FAILED,
};

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::ProviderRegistered { id, name, kind, endpoint, configured_model, registered_at_ms } => {
            // Idempotency: skip if already exists
            if state.providers.contains_key(id.as_str()) {
                return;
            }
            state.providers.insert(
                id.as_str().to_string(),
                Provider {
                    id: *id,
                    name: name.clone(),
                    kind: kind.clone(),
                    endpoint: endpoint.clone(),
                    configured_model: configured_model.clone(),
                    selected_model: None,
                    selected_model_score: 0,
                    context_window: None,
                    status: ProviderStatus::Pending,
                    consecutive_failures: 0,
                    last_heartbeat_ms: None,
                    last_latency_ms: None,
                    last_error: None,
                    registered_at_ms: *registered_at_ms,
                },
            );
        }

        Event::ProviderUpdated { id, name, endpoint, configured_model } => {
            if let Some(provider) = state.providers.get_mut(id.as_str()) {
                if let Some(n) = name {
                    provider.name = n.clone();
                }
                if let Some(e) = endpoint {
                    // A moved endpoint invalidates the old health verdict.
                    if *e != provider.endpoint {
                        provider.endpoint = e.clone();
                        provider.status = ProviderStatus::Pending;
                        provider.consecutive_failures = 0;
                    }
                }
                if let Some(m) = configured_model {
                    provider.configured_model = Some(m.clone());
                }
            }
        }

        Event::ProviderDeleted { id } => {
            state.providers.remove(id.as_str());
            detach_agents(state, id);
        }

        Event::ProviderHeartbeat { id, outcome, at_ms } => {
            let healthy = match state.providers.get_mut(id.as_str()) {
                Some(provider) => match outcome {
                    HeartbeatOutcome::Healthy { latency_ms, model, score, context_window } => {
                        provider.status = ProviderStatus::Healthy;
                        provider.consecutive_failures = 0;
                        provider.selected_model = Some(model.clone());
                        provider.selected_model_score = *score;
                        provider.context_window = *context_window;
                        provider.last_heartbeat_ms = Some(*at_ms);
                        provider.last_latency_ms = Some(*latency_ms);
                        provider.last_error = None;
                        true
                    }
                    HeartbeatOutcome::Unhealthy { error } => {
                        provider.consecutive_failures += 1;
                        provider.status = if provider.consecutive_failures >= FAILURES_TO_FAILED {
                            ProviderStatus::Failed
                        } else {
                            ProviderStatus::Unhealthy
                        };
                        provider.last_error = Some(error.clone());
                        false
                    }
                },
                None => return,
            };

            // Attach runs on every healthy beat, not only transitions: it is
            // idempotent (only uncovered agents move) and also picks up
            // agents spawned since the last beat.
            if healthy {
                attach_agents(state, id, *at_ms);
            } else {
                pause_attached_agents(state, id, *at_ms);
            }
        }

        _ => {}
    }
}

/// Attachment protocol: a provider turning healthy picks up every agent
/// that has no provider or whose provider is no longer healthy. Agents keep
/// their claimed work; paused ones return to idle.
fn attach_agents(state: &mut MaterializedState, provider_id: &ProviderId, at_ms: u64) {
    let healthy: std::collections::HashSet<String> = state
        .providers
        .values()
        .filter(|p| p.is_healthy())
        .map(|p| p.id.as_str().to_string())
        .collect();

    for agent in state.agents.values_mut() {
        if agent.status.is_terminal() {
            continue;
        }
        let covered = agent
            .provider
            .as_ref()
            .map(|p| healthy.contains(p.as_str()))
            .unwrap_or(false);
        if covered {
            continue;
        }
        agent.provider = Some(*provider_id);
        agent.last_active_ms = at_ms;
        if agent.status == AgentStatus::Paused {
            // Resume where the pause left off: mid-bead agents go back to
            // working, the rest to the idle pool.
            agent.status = if agent.current_bead.is_some() {
                AgentStatus::Working
            } else {
                AgentStatus::Idle
            };
        }
    }
}

/// A provider going unhealthy pauses its agents. The attachment is
/// retained so the agent resumes on the same provider if it recovers first.
fn pause_attached_agents(state: &mut MaterializedState, provider_id: &ProviderId, at_ms: u64) {
    for agent in state.agents.values_mut() {
        if agent.provider.as_ref() == Some(provider_id) && !agent.status.is_terminal() {
            if agent.status != AgentStatus::Paused {
                agent.status = AgentStatus::Paused;
                agent.last_active_ms = at_ms;
            }
        }
    }
}

/// Deleting a provider fully detaches its agents.
fn detach_agents(state: &mut MaterializedState, provider_id: &ProviderId) {
    for agent in state.agents.values_mut() {
        if agent.provider.as_ref() == Some(provider_id) && !agent.status.is_terminal() {
            agent.provider = None;
            agent.status = AgentStatus::Paused;
        }
    }
}
