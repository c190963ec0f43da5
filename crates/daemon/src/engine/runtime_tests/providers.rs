// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Harness;
use crate::engine::{RegisterProvider, RuntimeError};
use braid_core::test_support::{agent_spawned, provider_unhealthy};
use braid_core::{AgentStatus, ProviderId, ProviderStatus};

fn register_params(endpoint: &str) -> RegisterProvider {
    RegisterProvider {
        id: Some(ProviderId::from_string("prv-reg")),
        name: Some("reg".to_string()),
        kind: "openai".to_string(),
        endpoint: endpoint.to_string(),
        configured_model: None,
    }
}

#[tokio::test]
async fn register_persists_and_schedules_heartbeat() {
    let harness = Harness::new();
    let provider = harness
        .runtime
        .register_provider(register_params("http://localhost:11434"))
        .await
        .unwrap();

    assert_eq!(provider.status, ProviderStatus::Pending);
    // Mirrored to the registry and a first beat queued immediately.
    assert_eq!(harness.runtime.registry.len(), 1);
    assert!(harness.scheduler_has("provider-beat:prv-reg"));
}

#[tokio::test]
async fn heartbeat_handler_refreshes_registry_and_reschedules() {
    let harness = Harness::new();
    harness
        .runtime
        .register_provider(register_params("http://localhost:11434"))
        .await
        .unwrap();
    harness.commit(braid_core::test_support::provider_healthy("prv-reg", "llama3", 10));

    harness
        .runtime
        .handle_event(&braid_core::test_support::provider_healthy("prv-reg", "llama3", 10))
        .await
        .unwrap();

    let mirrored = harness.runtime.registry.get(&ProviderId::from_string("prv-reg")).unwrap();
    assert_eq!(mirrored.status, ProviderStatus::Healthy);
    assert_eq!(mirrored.selected_model.as_deref(), Some("llama3"));
    assert!(harness.scheduler_has("provider-beat:prv-reg"));
}

#[tokio::test]
async fn delete_removes_registry_entry_and_timer() {
    let harness = Harness::new();
    harness
        .runtime
        .register_provider(register_params("http://localhost:11434"))
        .await
        .unwrap();

    harness.runtime.delete_provider("prv-reg").await.unwrap();
    assert!(harness.runtime.registry.is_empty());
    assert!(!harness.scheduler_has("provider-beat:prv-reg"));
}

#[tokio::test]
async fn delete_unknown_provider_is_not_found() {
    let harness = Harness::new();
    let err = harness.runtime.delete_provider("prv-ghost").await.unwrap_err();
    assert!(matches!(err, RuntimeError::ProviderNotFound(_)));
}

/// A flapping provider pauses its agents, then a replacement revives them.
#[tokio::test]
async fn provider_flap_pauses_and_revives_agents() {
    let harness = Harness::new().with_project("proj");
    harness.commit(agent_spawned("agt-a", "proj", "engineer"));
    harness.ensure_provider();
    assert_eq!(harness.agent("agt-a").status, AgentStatus::Idle);

    for _ in 0..3 {
        harness.commit(provider_unhealthy("prv-test", "connection refused"));
    }
    let agent = harness.agent("agt-a");
    assert_eq!(agent.status, AgentStatus::Paused);
    assert_eq!(agent.provider.as_ref().map(|p| p.as_str()), Some("prv-test"));

    // A new healthy provider reattaches within one heartbeat.
    harness.commit(braid_core::test_support::provider_registered(
        "prv-backup",
        "http://backup:11434",
    ));
    harness.commit(braid_core::test_support::provider_healthy("prv-backup", "llama3", 30));

    let agent = harness.agent("agt-a");
    assert_eq!(agent.status, AgentStatus::Idle);
    assert_eq!(agent.provider.as_ref().map(|p| p.as_str()), Some("prv-backup"));
}

#[tokio::test]
async fn negotiate_model_requires_a_known_provider() {
    let harness = Harness::new();
    let err = harness.runtime.negotiate_model("prv-ghost").await.unwrap_err();
    assert!(matches!(err, RuntimeError::ProviderNotFound(_)));

    harness
        .runtime
        .register_provider(register_params("http://localhost:11434"))
        .await
        .unwrap();
    harness.runtime.negotiate_model("prv-reg").await.unwrap();
}

#[tokio::test]
async fn probe_provider_ignores_deleted_providers() {
    let harness = Harness::new();
    // No provider registered; the probe is a quiet no-op.
    harness.runtime.probe_provider("prv-ghost").await.unwrap();
}

#[tokio::test]
async fn update_endpoint_resets_health_and_reprobes() {
    let harness = Harness::new();
    harness
        .runtime
        .register_provider(register_params("http://localhost:11434"))
        .await
        .unwrap();
    harness.commit(braid_core::test_support::provider_healthy("prv-reg", "llama3", 10));

    let updated = harness
        .runtime
        .update_provider("prv-reg", None, Some("http://moved:8000".to_string()), None)
        .await
        .unwrap();
    assert_eq!(updated.status, ProviderStatus::Pending);
    assert!(harness.scheduler_has("provider-beat:prv-reg"));
}
