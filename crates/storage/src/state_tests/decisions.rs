// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn resolve(id: &str, decider: &str, text: &str, at: u64) -> Event {
    Event::DecisionResolved {
        id: BeadId::from_string(id),
        decider: decider.to_string(),
        decision: text.to_string(),
        rationale: Some("because".to_string()),
        resolved_at_ms: at,
    }
}

#[test]
fn decision_blocks_its_parent() {
    let state = state_from(&[
        bead_created("proj-b", "proj", Priority::P1),
        decision_created("proj-d", "proj", Some("proj-b")),
    ]);
    let parent = &state.beads["proj-b"];
    assert_eq!(parent.blocked_by, vec![BeadId::from_string("proj-d")]);
    assert!(state.ready_beads("proj").is_empty());
}

/// Resolving the decision unblocks the parent without touching its
/// status.
#[test]
fn resolve_unblocks_parent() {
    let state = state_from(&[
        bead_created("proj-b", "proj", Priority::P1),
        decision_created("proj-d", "proj", Some("proj-b")),
        resolve("proj-d", "alice", "approve", 2_000_000),
    ]);
    let parent = &state.beads["proj-b"];
    assert!(parent.blocked_by.is_empty());
    assert_eq!(parent.status, BeadStatus::Open);

    let ready: Vec<&str> = state.ready_beads("proj").iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ready, vec!["proj-b"]);

    let decision = &state.beads["proj-d"];
    assert_eq!(decision.status, BeadStatus::Closed);
    let payload = decision.decision.as_ref().unwrap();
    assert_eq!(payload.decision.as_deref(), Some("approve"));
    assert_eq!(payload.decided_at_ms, Some(2_000_000));
    assert_invariants(&state);
}

#[test]
fn decision_blocks_multiple_parents() {
    let state = state_from(&[
        bead_created("proj-b1", "proj", Priority::P1),
        bead_created("proj-b2", "proj", Priority::P1),
        decision_created("proj-d", "proj", Some("proj-b1")),
        dep("proj-b2", "proj-d", braid_core::DepKind::Blocks),
        resolve("proj-d", "alice", "approve", 2_000_000),
    ]);
    assert!(state.beads["proj-b1"].blocked_by.is_empty());
    assert!(state.beads["proj-b2"].blocked_by.is_empty());
    assert_eq!(state.ready_beads("proj").len(), 2);
}

/// A double resolve from the same decider is a no-op.
#[test]
fn double_resolve_is_noop() {
    let mut state = state_from(&[
        decision_created("proj-d", "proj", None),
        resolve("proj-d", "alice", "approve", 2_000_000),
    ]);
    state.apply_event(&resolve("proj-d", "alice", "deny", 9_000_000));

    let payload = state.beads["proj-d"].decision.as_ref().unwrap();
    assert_eq!(payload.decision.as_deref(), Some("approve"));
    assert_eq!(payload.decided_at_ms, Some(2_000_000));
}

#[test]
fn claim_binds_decider_and_starts_progress() {
    let state = state_from(&[
        decision_created("proj-d", "proj", None),
        Event::DecisionClaimed {
            id: BeadId::from_string("proj-d"),
            decider: "alice".to_string(),
        },
    ]);
    let bead = &state.beads["proj-d"];
    assert_eq!(bead.status, BeadStatus::InProgress);
    assert_eq!(bead.decision.as_ref().unwrap().decider.as_deref(), Some("alice"));
    assert_invariants(&state);
}

#[test]
fn claim_by_second_decider_is_ignored() {
    let state = state_from(&[
        decision_created("proj-d", "proj", None),
        Event::DecisionClaimed {
            id: BeadId::from_string("proj-d"),
            decider: "alice".to_string(),
        },
        Event::DecisionClaimed {
            id: BeadId::from_string("proj-d"),
            decider: "bob".to_string(),
        },
    ]);
    assert_eq!(
        state.beads["proj-d"].decision.as_ref().unwrap().decider.as_deref(),
        Some("alice")
    );
}

#[test]
fn timeout_closes_unresolved_decision() {
    let state = state_from(&[
        bead_created("proj-b", "proj", Priority::P1),
        decision_created("proj-d", "proj", Some("proj-b")),
        Event::DecisionTimedOut { id: BeadId::from_string("proj-d"), at_ms: 5_000_000 },
    ]);
    let decision = &state.beads["proj-d"];
    assert_eq!(decision.status, BeadStatus::Closed);
    let payload = decision.decision.as_ref().unwrap();
    assert!(payload.timed_out);
    assert!(payload.decision.is_none());
    // Parents are not blocked forever by an expired decision.
    assert!(state.beads["proj-b"].blocked_by.is_empty());
}

#[test]
fn timeout_after_resolve_is_ignored() {
    let state = state_from(&[
        decision_created("proj-d", "proj", None),
        resolve("proj-d", "alice", "approve", 2_000_000),
        Event::DecisionTimedOut { id: BeadId::from_string("proj-d"), at_ms: 5_000_000 },
    ]);
    let payload = state.beads["proj-d"].decision.as_ref().unwrap();
    assert!(!payload.timed_out);
    assert_eq!(payload.decision.as_deref(), Some("approve"));
}
