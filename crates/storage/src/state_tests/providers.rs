// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use braid_core::{AgentStatus, ProviderId, ProviderStatus};

#[test]
fn registration_starts_pending() {
    let state = state_from(&[provider_registered("prv-1", "http://localhost:11434")]);
    let p = &state.providers["prv-1"];
    assert_eq!(p.status, ProviderStatus::Pending);
    assert!(p.selected_model.is_none());
}

#[test]
fn healthy_heartbeat_selects_model() {
    let state = state_from(&[
        provider_registered("prv-1", "http://localhost:11434"),
        provider_healthy("prv-1", "llama3", 15),
    ]);
    let p = &state.providers["prv-1"];
    assert_eq!(p.status, ProviderStatus::Healthy);
    assert_eq!(p.selected_model.as_deref(), Some("llama3"));
    assert_eq!(p.last_latency_ms, Some(15));
    assert_eq!(p.consecutive_failures, 0);
    assert_invariants(&state);
}

/// Three consecutive failures ⇒ failed, excluded from scoring.
#[test]
fn three_failures_mark_failed() {
    let mut state = state_from(&[provider_registered("prv-1", "http://localhost:11434")]);
    state.apply_event(&provider_unhealthy("prv-1", "connection refused"));
    assert_eq!(state.providers["prv-1"].status, ProviderStatus::Unhealthy);
    state.apply_event(&provider_unhealthy("prv-1", "connection refused"));
    assert_eq!(state.providers["prv-1"].status, ProviderStatus::Unhealthy);
    state.apply_event(&provider_unhealthy("prv-1", "connection refused"));

    let p = &state.providers["prv-1"];
    assert_eq!(p.status, ProviderStatus::Failed);
    assert_eq!(p.consecutive_failures, 3);
    assert_eq!(p.last_error.as_deref(), Some("connection refused"));
    assert!(state.active_providers().is_empty());
}

#[test]
fn recovery_resets_failure_count() {
    let state = state_from(&[
        provider_registered("prv-1", "http://localhost:11434"),
        provider_unhealthy("prv-1", "timeout"),
        provider_unhealthy("prv-1", "timeout"),
        provider_healthy("prv-1", "llama3", 20),
    ]);
    let p = &state.providers["prv-1"];
    assert_eq!(p.status, ProviderStatus::Healthy);
    assert_eq!(p.consecutive_failures, 0);
    assert!(p.last_error.is_none());
}

#[test]
fn healthy_provider_attaches_paused_agents() {
    let state = state_from(&[
        agent_spawned("agt-a", "proj", "engineer"),
        provider_registered("prv-1", "http://localhost:11434"),
        provider_healthy("prv-1", "llama3", 10),
    ]);
    let agent = &state.agents["agt-a"];
    assert_eq!(agent.status, AgentStatus::Idle);
    assert_eq!(agent.provider, Some(ProviderId::from_string("prv-1")));
}

/// Provider flap: failure pauses the agent but retains the
/// attachment; a new healthy provider picks the agent up.
#[test]
fn provider_flap_scenario() {
    let mut state = state_from(&[
        agent_spawned("agt-a", "proj", "engineer"),
        provider_registered("prv-1", "http://localhost:11434"),
        provider_healthy("prv-1", "llama3", 10),
    ]);
    assert_eq!(state.agents["agt-a"].status, AgentStatus::Idle);

    for _ in 0..3 {
        state.apply_event(&provider_unhealthy("prv-1", "connection refused"));
    }
    assert_eq!(state.providers["prv-1"].status, ProviderStatus::Failed);
    let agent = &state.agents["agt-a"];
    assert_eq!(agent.status, AgentStatus::Paused);
    // provider_id retained while paused
    assert_eq!(agent.provider, Some(ProviderId::from_string("prv-1")));

    // New provider turns healthy: agent reattaches and goes idle
    state.apply_event(&provider_registered("prv-2", "http://backup:11434"));
    state.apply_event(&provider_healthy("prv-2", "qwen2.5-coder", 25));

    let agent = &state.agents["agt-a"];
    assert_eq!(agent.status, AgentStatus::Idle);
    assert_eq!(agent.provider, Some(ProviderId::from_string("prv-2")));
    assert_invariants(&state);
}

#[test]
fn reattached_mid_bead_agent_resumes_working() {
    let mut state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        agent_spawned("agt-a", "proj", "engineer"),
        provider_registered("prv-1", "http://localhost:11434"),
        provider_healthy("prv-1", "llama3", 10),
        claim("proj-1", "agt-a", 2_000_000),
    ]);
    for _ in 0..3 {
        state.apply_event(&provider_unhealthy("prv-1", "gone"));
    }
    assert_eq!(state.agents["agt-a"].status, AgentStatus::Paused);

    state.apply_event(&provider_healthy("prv-1", "llama3", 10));
    assert_eq!(state.agents["agt-a"].status, AgentStatus::Working);
    assert_invariants(&state);
}

#[test]
fn delete_detaches_agents() {
    let state = state_from(&[
        agent_spawned("agt-a", "proj", "engineer"),
        provider_registered("prv-1", "http://localhost:11434"),
        provider_healthy("prv-1", "llama3", 10),
        Event::ProviderDeleted { id: ProviderId::from_string("prv-1") },
    ]);
    assert!(state.providers.is_empty());
    let agent = &state.agents["agt-a"];
    assert!(agent.provider.is_none());
    assert_eq!(agent.status, AgentStatus::Paused);
}

#[test]
fn endpoint_change_resets_health() {
    let state = state_from(&[
        provider_registered("prv-1", "http://localhost:11434"),
        provider_healthy("prv-1", "llama3", 10),
        Event::ProviderUpdated {
            id: ProviderId::from_string("prv-1"),
            name: None,
            endpoint: Some("http://moved:11434".to_string()),
            configured_model: None,
        },
    ]);
    let p = &state.providers["prv-1"];
    assert_eq!(p.status, ProviderStatus::Pending);
    assert_eq!(p.endpoint, "http://moved:11434");
}
