// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{bead_created, provider_healthy};
use crate::Priority;

#[test]
fn events_serialize_with_type_tag() {
    let event = bead_created("proj-1", "proj", Priority::P0);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "bead:created");
    assert_eq!(json["id"], "proj-1");
    assert_eq!(json["priority"], "p0");
}

#[test]
fn events_deserialize_from_type_tag() {
    let json = r#"{"type":"bead:claimed","id":"proj-1","agent":"agt-a1","claimed_at_ms":5}"#;
    let event: Event = serde_json::from_str(json).unwrap();
    match event {
        Event::BeadClaimed { id, agent, claimed_at_ms } => {
            assert_eq!(id, "proj-1");
            assert_eq!(agent, "agt-a1");
            assert_eq!(claimed_at_ms, 5);
        }
        other => panic!("wrong variant: {other:?}"),
    }
}

#[test]
fn unknown_type_tags_become_custom() {
    let json = r#"{"type":"widget:frobnicated","id":"x"}"#;
    let event: Event = serde_json::from_str(json).unwrap();
    assert_eq!(event, Event::Custom);
}

#[test]
fn type_tag_matches_serialization() {
    let event = provider_healthy("prv-1", "llama3", 12);
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], event.type_tag());
}

#[yare::parameterized(
    readiness  = { Event::ProjectReadiness { id: "p".into(), ready: true, issues: vec![], checked_at_ms: 0, public_key: None } },
    unblocked  = { Event::BeadUnblocked { id: BeadId::from_string("p-1"), decision: BeadId::from_string("p-2") } },
    tick       = { Event::DispatchTick { project: None, dispatched: 0, skipped: vec![] } },
    timer      = { Event::TimerFired { id: TimerId::new("dispatch") } },
    shutdown   = { Event::Shutdown },
)]
fn transient_events(event: Event) {
    assert!(event.is_transient());
}

#[yare::parameterized(
    created   = { bead_created("p-1", "p", Priority::P2) },
    heartbeat = { provider_healthy("prv-1", "m", 1) },
)]
fn persisted_events(event: Event) {
    assert!(!event.is_transient());
}

#[test]
fn project_id_extraction() {
    let event = bead_created("p-1", "webshop", Priority::P2);
    assert_eq!(event.project_id(), Some("webshop"));
    assert_eq!(Event::Shutdown.project_id(), None);
}

#[test]
fn heartbeat_outcome_roundtrips() {
    let outcome = HeartbeatOutcome::Healthy {
        latency_ms: 12,
        model: "llama3".to_string(),
        score: 9,
        context_window: Some(8192),
    };
    let json = serde_json::to_string(&outcome).unwrap();
    let parsed: HeartbeatOutcome = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, outcome);
}

#[test]
fn log_summary_is_single_line() {
    let event = provider_healthy("prv-1", "llama3", 12);
    let summary = event.log_summary();
    assert!(summary.contains("prv-1"));
    assert!(!summary.contains('\n'));
}
