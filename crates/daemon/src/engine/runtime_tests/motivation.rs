// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Harness;
use braid_core::test_support::bead_created;
use braid_core::{Event, Motivation, MotivationId, MotivationKind, Priority};
use std::collections::HashMap;

fn calendar(id: &str, interval_ms: u64, cooldown_ms: u64) -> Motivation {
    let mut params = HashMap::new();
    params.insert("interval_ms".to_string(), interval_ms.to_string());
    Motivation {
        id: MotivationId::from_string(id),
        kind: MotivationKind::Calendar,
        condition: String::new(),
        role: None,
        agent: None,
        project: Some("proj".to_string()),
        params,
        cooldown_ms,
        last_triggered_ms: None,
        enabled: true,
    }
}

fn idle(id: &str) -> Motivation {
    Motivation {
        id: MotivationId::from_string(id),
        kind: MotivationKind::Idle,
        condition: String::new(),
        role: None,
        agent: None,
        project: Some("proj".to_string()),
        params: HashMap::new(),
        cooldown_ms: 0,
        last_triggered_ms: None,
        enabled: true,
    }
}

fn register(harness: &Harness, motivation: Motivation) {
    harness.commit(Event::MotivationRegistered { id: motivation.id.clone(), motivation });
}

#[tokio::test]
async fn calendar_motivation_fires_and_respects_cooldown() {
    let harness = Harness::new().with_project("proj");
    register(&harness, calendar("mtv-cal", 60_000, 120_000));

    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 1);
    // Cooldown holds on the immediate next beat.
    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 0);

    harness.clock.advance(std::time::Duration::from_millis(120_001));
    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 1);
}

#[tokio::test]
async fn disabled_motivations_never_fire() {
    let harness = Harness::new().with_project("proj");
    let mut m = calendar("mtv-off", 1, 0);
    m.enabled = false;
    register(&harness, m);
    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 0);
}

#[tokio::test]
async fn idle_motivation_requires_idle_agent_and_no_inflight() {
    let harness = Harness::new().with_project("proj");
    register(&harness, idle("mtv-idle"));

    // No agents at all: nothing fires.
    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 0);

    harness.ensure_provider();
    harness.commit(braid_core::test_support::agent_spawned("agt-a", "proj", "engineer"));
    harness.ensure_provider();
    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 1);

    // In-progress work suppresses the idle trigger.
    harness.commit(bead_created("proj-1", "proj", Priority::P1));
    harness.runtime.claim_bead("proj-1", "agt-a").unwrap();
    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 0);
}

#[tokio::test]
async fn storm_cap_bounds_triggers_per_tick() {
    let mut config = braid_config::Config::default();
    config.workflow.motivation_storm_cap = 2;
    let harness = Harness::with_config(config).with_project("proj");
    for i in 0..5 {
        register(&harness, calendar(&format!("mtv-{i}"), 1, 0));
    }
    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 2);
}

#[tokio::test]
async fn external_kinds_are_never_swept() {
    let harness = Harness::new().with_project("proj");
    let mut m = calendar("mtv-ext", 1, 0);
    m.kind = MotivationKind::External;
    register(&harness, m);
    assert_eq!(harness.runtime.sweep_motivations().unwrap(), 0);
}
