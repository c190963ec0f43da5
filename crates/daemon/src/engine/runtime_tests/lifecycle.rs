// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Harness;
use braid_config::Config;
use braid_core::test_support::decision_created;

const BOOT_CONFIG: &str = r#"
[[project]]
id = "web"
prefix = "web"

[[provider]]
id = "prv-local"
endpoint = "http://localhost:11434"
model = "qwen2.5-coder"

[[motivation]]
id = "daily"
kind = "calendar"
params = { interval_ms = "86400000" }
"#;

#[tokio::test]
async fn startup_registers_config_declarations() {
    let config = Config::parse(BOOT_CONFIG).unwrap();
    let harness = Harness::with_config(config.clone());

    harness.runtime.startup(&config).await.unwrap();

    harness.runtime.lock_state(|state| {
        assert!(state.projects.contains_key("web"));
        assert!(state.providers.contains_key("prv-local"));
        assert!(state.motivations.contains_key("mtv-daily"));
    });
    assert_eq!(harness.runtime.registry.len(), 1);
}

#[tokio::test]
async fn startup_is_idempotent_across_restarts() {
    let config = Config::parse(BOOT_CONFIG).unwrap();
    let harness = Harness::with_config(config.clone());

    harness.runtime.startup(&config).await.unwrap();
    harness.runtime.startup(&config).await.unwrap();

    harness.runtime.lock_state(|state| {
        assert_eq!(state.projects.len(), 1);
        assert_eq!(state.providers.len(), 1);
        assert_eq!(state.motivations.len(), 1);
    });
}

#[tokio::test]
async fn startup_reconciles_core_timers() {
    let config = Config::parse(BOOT_CONFIG).unwrap();
    let harness = Harness::with_config(config.clone());

    harness.runtime.startup(&config).await.unwrap();

    assert!(harness.scheduler_has("dispatch"));
    assert!(harness.scheduler_has("master-beat"));
    assert!(harness.scheduler_has("provider-beat:prv-local"));
}

#[tokio::test]
async fn startup_resumes_open_decision_timers() {
    let config = Config::parse(BOOT_CONFIG).unwrap();
    let harness = Harness::with_config(config.clone());
    harness.commit(braid_core::test_support::project_registered("proj"));
    harness.commit(decision_created("proj-d", "proj", None));

    harness.runtime.startup(&config).await.unwrap();
    assert!(harness.scheduler_has("decision-timeout:proj-d"));
}

#[tokio::test]
async fn resolved_decisions_get_no_timer() {
    let config = Config::parse(BOOT_CONFIG).unwrap();
    let harness = Harness::with_config(config.clone());
    harness.commit(braid_core::test_support::project_registered("proj"));
    harness.commit(decision_created("proj-d", "proj", None));
    harness
        .runtime
        .resolve_decision("proj-d", "alice", "approve", None)
        .await
        .unwrap();

    harness.runtime.startup(&config).await.unwrap();
    assert!(!harness.scheduler_has("decision-timeout:proj-d"));
}
