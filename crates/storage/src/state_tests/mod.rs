// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod beads;
mod decisions;
mod graph;
mod providers;

use super::*;
use braid_core::test_support::*;
use braid_core::{AgentId, BeadId, BeadStatus, Event, Priority};

/// Fold a sequence of events into fresh state.
pub(crate) fn state_from(events: &[Event]) -> MaterializedState {
    let mut state = MaterializedState::default();
    for event in events {
        state.apply_event(event);
    }
    state
}

pub(crate) fn claim(id: &str, agent: &str, at: u64) -> Event {
    Event::BeadClaimed {
        id: BeadId::from_string(id),
        agent: AgentId::from_string(agent),
        claimed_at_ms: at,
    }
}

pub(crate) fn close(id: &str, at: u64) -> Event {
    Event::BeadCompleted { id: BeadId::from_string(id), result: None, closed_at_ms: at }
}

pub(crate) fn dep(from: &str, to: &str, kind: braid_core::DepKind) -> Event {
    Event::BeadDepAdded {
        from: BeadId::from_string(from),
        to: BeadId::from_string(to),
        kind,
    }
}

#[test]
fn replay_is_deterministic() {
    let events = vec![
        project_registered("proj"),
        bead_created("proj-1", "proj", Priority::P0),
        bead_created("proj-2", "proj", Priority::P1),
        agent_spawned("agt-a", "proj", "engineer"),
        provider_registered("prv-1", "http://localhost:11434"),
        provider_healthy("prv-1", "llama3", 10),
        claim("proj-1", "agt-a", 2_000_000),
        close("proj-1", 3_000_000),
    ];
    let a = state_from(&events);
    let b = state_from(&events);

    assert_eq!(a.beads["proj-1"], b.beads["proj-1"]);
    assert_eq!(a.agents["agt-a"], b.agents["agt-a"]);
    assert_eq!(a.providers["prv-1"], b.providers["prv-1"]);
}

#[test]
fn double_apply_is_idempotent() {
    let events = vec![
        project_registered("proj"),
        bead_created("proj-1", "proj", Priority::P0),
        agent_spawned("agt-a", "proj", "engineer"),
        claim("proj-1", "agt-a", 2_000_000),
    ];
    let mut state = state_from(&events);
    // Apply everything again (at-least-once delivery)
    for event in &events {
        state.apply_event(event);
    }
    assert_eq!(state.beads["proj-1"].status, BeadStatus::InProgress);
    assert_eq!(
        state.beads["proj-1"].assigned_to,
        Some(AgentId::from_string("agt-a"))
    );
}

#[test]
fn get_by_unique_prefix() {
    let state = state_from(&[
        bead_created("proj-abc123", "proj", Priority::P2),
        bead_created("proj-xyz789", "proj", Priority::P2),
    ]);
    assert!(state.get_bead("proj-abc").is_some());
    assert!(state.get_bead("proj-a").is_some());
    // Ambiguous prefix
    assert!(state.get_bead("proj-").is_none());
    // Exact match always works
    assert!(state.get_bead("proj-abc123").is_some());
}

/// Invariant: in_progress ⇒ assigned_to ≠ ∅, working ⇒ current_bead points back.
pub(crate) fn assert_invariants(state: &MaterializedState) {
    for bead in state.beads.values() {
        if bead.status == BeadStatus::InProgress {
            assert!(
                bead.assigned_to.is_some(),
                "in_progress bead {} has no assignee",
                bead.id
            );
        }
        if bead.status == BeadStatus::Closed {
            // No open bead may still be blocked by a closed one.
            for other in state.beads.values() {
                assert!(
                    !other.blocked_by.contains(&bead.id),
                    "bead {} still blocked by closed {}",
                    other.id,
                    bead.id
                );
            }
        }
    }
    for agent in state.agents.values() {
        if agent.status == braid_core::AgentStatus::Working {
            let bead_id = agent.current_bead.as_ref().unwrap_or_else(|| {
                panic!("working agent {} has no current bead", agent.id)
            });
            let bead = &state.beads[bead_id.as_str()];
            assert_eq!(
                bead.assigned_to.as_ref(),
                Some(&agent.id),
                "agent {} works on {} but it is assigned elsewhere",
                agent.id,
                bead_id
            );
        }
    }
    for provider in state.providers.values() {
        if provider.is_healthy() {
            assert!(
                provider.selected_model.is_some(),
                "healthy provider {} has no selected model",
                provider.id
            );
        }
    }
}
