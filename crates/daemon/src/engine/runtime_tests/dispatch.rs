// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Harness;
use braid_config::{Config, ReadinessMode};
use braid_core::bead::ctx;
use braid_core::test_support::bead_created;
use braid_core::{AgentStatus, BeadStatus, Clock, Event, Priority};

fn readiness(project: &str, ready: bool, checked_at_ms: u64) -> Event {
    Event::ProjectReadiness {
        id: project.to_string(),
        ready,
        issues: if ready { vec![] } else { vec!["bead store missing".to_string()] },
        checked_at_ms,
        public_key: None,
    }
}

/// Mark the project ready so the gate lets dispatch through.
fn make_ready(harness: &Harness) {
    let now = harness.clock.epoch_ms();
    harness.commit(readiness("proj", true, now));
}

#[tokio::test]
async fn dispatches_ready_bead_to_idle_agent() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    make_ready(&harness);
    harness.commit(bead_created("proj-1", "proj", Priority::P1));

    let outcome = harness.runtime.dispatch_once(Some("proj")).await;

    assert_eq!(outcome.dispatched, 1);
    assert_eq!(harness.bead_status("proj-1"), BeadStatus::InProgress);
    let agent = harness.agent("agt-a");
    assert_eq!(agent.status, AgentStatus::Working);
    assert_eq!(agent.current_bead.as_ref().map(|b| b.as_str()), Some("proj-1"));
}

#[tokio::test]
async fn p0_is_dispatched_before_p1() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    make_ready(&harness);
    harness.commit(bead_created("proj-low", "proj", Priority::P1));
    harness.commit(bead_created("proj-urgent", "proj", Priority::P0));

    // One agent: only the P0 bead can win it this tick.
    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 1);
    assert_eq!(harness.bead_status("proj-urgent"), BeadStatus::InProgress);
    assert_eq!(harness.bead_status("proj-low"), BeadStatus::Open);
}

#[tokio::test]
async fn skips_project_with_no_eligible_agents() {
    let harness = Harness::new().with_project("proj");
    make_ready(&harness);
    harness.commit(bead_created("proj-1", "proj", Priority::P1));

    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 0);
    assert!(outcome.skipped.iter().any(|s| s.reason.contains("no eligible agent")));
}

#[tokio::test]
async fn paused_agents_are_not_eligible() {
    let harness = Harness::new().with_project("proj");
    make_ready(&harness);
    // Spawned but never attached: stays paused.
    harness.commit(braid_core::test_support::agent_spawned("agt-a", "proj", "engineer"));
    harness.commit(bead_created("proj-1", "proj", Priority::P1));

    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 0);
}

#[tokio::test]
async fn role_map_restricts_agents() {
    let mut config = Config::default();
    config
        .dispatch
        .role_map
        .insert("bug".to_string(), "engineer".to_string());
    let harness = Harness::with_config(config)
        .with_project("proj")
        .with_ready_agent("agt-reviewer", "proj", "reviewer");
    make_ready(&harness);

    let mut bug = bead_created("proj-bug", "proj", Priority::P0);
    if let Event::BeadCreated { kind, .. } = &mut bug {
        *kind = braid_core::BeadKind::Bug;
    }
    harness.commit(bug);

    // Reviewer does not match the bug -> engineer mapping.
    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 0);

    let harness = harness.with_ready_agent("agt-engineer", "proj", "engineer");
    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 1);
    let bead = harness.bead("proj-bug");
    assert_eq!(
        bead.assigned_to.as_ref().map(|a| a.as_str()),
        Some("agt-engineer")
    );
}

#[tokio::test]
async fn returned_to_pins_the_bead() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer")
        .with_ready_agent("agt-b", "proj", "engineer");
    make_ready(&harness);

    let mut bead = bead_created("proj-1", "proj", Priority::P0);
    if let Event::BeadCreated { context, .. } = &mut bead {
        context.insert(ctx::RETURNED_TO.to_string(), "agt-b".to_string());
    }
    harness.commit(bead);

    harness.runtime.dispatch_once(Some("proj")).await;
    let bead = harness.bead("proj-1");
    assert_eq!(bead.assigned_to.as_ref().map(|a| a.as_str()), Some("agt-b"));
}

#[tokio::test]
async fn tiebreak_prefers_fewest_in_flight_then_longest_idle() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-busy", "proj", "engineer")
        .with_ready_agent("agt-free", "proj", "engineer");
    make_ready(&harness);

    // agt-busy carries one in-flight bead already.
    harness.commit(bead_created("proj-old", "proj", Priority::P1));
    harness.runtime.claim_bead("proj-old", "agt-busy").unwrap();
    // ... and is idle again for eligibility purposes.
    harness.commit(Event::AgentStatusChanged {
        id: braid_core::AgentId::from_string("agt-busy"),
        status: AgentStatus::Idle,
        reason: None,
        at_ms: harness.clock.epoch_ms(),
    });

    harness.commit(bead_created("proj-new", "proj", Priority::P1));
    harness.runtime.dispatch_once(Some("proj")).await;

    let bead = harness.bead("proj-new");
    assert_eq!(bead.assigned_to.as_ref().map(|a| a.as_str()), Some("agt-free"));
}

#[tokio::test]
async fn readiness_block_mode_skips_project() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    harness.commit(readiness("proj", false, harness.clock.epoch_ms()));
    harness.commit(bead_created("proj-1", "proj", Priority::P0));

    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 0);
    assert!(outcome.skipped.iter().any(|s| s.subject == "proj"));
    assert_eq!(harness.bead_status("proj-1"), BeadStatus::Open);
}

#[tokio::test]
async fn readiness_warn_mode_proceeds() {
    let mut config = Config::default();
    config.dispatch.readiness_mode = ReadinessMode::Warn;
    let harness = Harness::with_config(config)
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    harness.commit(readiness("proj", false, harness.clock.epoch_ms()));
    harness.commit(bead_created("proj-1", "proj", Priority::P0));

    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 1);
}

#[tokio::test]
async fn stale_readiness_cache_requeues_check() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    // Fresh at first...
    make_ready(&harness);
    harness.commit(bead_created("proj-1", "proj", Priority::P0));
    // ...then the cache ages past the 2-minute TTL.
    harness.clock.advance(std::time::Duration::from_secs(3 * 60));

    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 0);
    assert!(outcome.skipped.iter().any(|s| s.reason.contains("readiness unknown")));
}

#[tokio::test]
async fn hop_limit_escalates_to_ceo() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    make_ready(&harness);

    let mut bead = bead_created("proj-hot", "proj", Priority::P2);
    if let Event::BeadCreated { context, .. } = &mut bead {
        context.insert(ctx::REDISPATCH_COUNT.to_string(), "3".to_string());
    }
    harness.commit(bead);

    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 0);
    assert!(outcome.skipped.iter().any(|s| s.reason.contains("max hops")));

    // The bead escalated: P0 now, blocked by a CEO decision.
    let bead = harness.bead("proj-hot");
    assert_eq!(bead.priority, Priority::P0);
    assert!(bead.escalated());
    assert_eq!(bead.blocked_by.len(), 1);
    let decision = harness.find_decision("proj").unwrap();
    assert!(decision.title.starts_with("[CEO]"));

    // Escalation fires once; the next tick leaves it alone.
    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 0);
    assert_eq!(
        harness
            .runtime
            .lock_state(|s| s.beads.values().filter(|b| b.is_decision()).count()),
        1
    );
}

#[tokio::test]
async fn loop_detection_escalates_once() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    make_ready(&harness);

    let mut bead = bead_created("proj-loop", "proj", Priority::P2);
    if let Event::BeadCreated { context, .. } = &mut bead {
        context.insert(ctx::LOOP_DETECTED.to_string(), "true".to_string());
    }
    harness.commit(bead);

    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert!(outcome.skipped.iter().any(|s| s.reason.contains("loop detected")));
    assert!(harness.find_decision("proj").is_some());
}

#[tokio::test]
async fn shutdown_stops_claiming_mid_tick() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    make_ready(&harness);
    harness.commit(bead_created("proj-1", "proj", Priority::P0));

    harness.runtime.stop();
    let outcome = harness.runtime.dispatch_once(Some("proj")).await;
    assert_eq!(outcome.dispatched, 0);
    assert!(outcome.skipped.iter().any(|s| s.reason == "shutting down"));
    assert_eq!(harness.bead_status("proj-1"), BeadStatus::Open);
}

#[tokio::test]
async fn tick_gate_coalesces_overlapping_wakes() {
    let harness = Harness::new().with_project("proj");
    assert!(harness.runtime.begin_dispatch());
    // A wake during the tick is remembered, not run concurrently.
    assert!(!harness.runtime.begin_dispatch());
    assert!(harness.runtime.end_dispatch(), "pending wake surfaces at tick end");
    assert!(!harness.runtime.end_dispatch());
}
