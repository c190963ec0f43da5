// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use braid_core::DepKind;
use std::collections::HashMap;

#[test]
fn created_bead_is_open_and_unassigned() {
    let state = state_from(&[bead_created("proj-1", "proj", Priority::P1)]);
    let bead = &state.beads["proj-1"];
    assert_eq!(bead.status, BeadStatus::Open);
    assert!(bead.assigned_to.is_none());
    assert_eq!(bead.priority, Priority::P1);
}

#[test]
fn duplicate_create_is_ignored() {
    let mut state = state_from(&[bead_created("proj-1", "proj", Priority::P1)]);
    state.apply_event(&bead_created("proj-1", "proj", Priority::P0));
    // First fact wins
    assert_eq!(state.beads["proj-1"].priority, Priority::P1);
}

#[test]
fn update_merges_context_last_write_wins() {
    let mut state = state_from(&[bead_created("proj-1", "proj", Priority::P1)]);
    let mut first = HashMap::new();
    first.insert("a".to_string(), "1".to_string());
    first.insert("b".to_string(), "1".to_string());
    state.apply_event(&Event::BeadUpdated {
        id: BeadId::from_string("proj-1"),
        title: None,
        description: None,
        priority: None,
        tags: None,
        context: first,
        updated_at_ms: 2_000_000,
    });
    let mut second = HashMap::new();
    second.insert("b".to_string(), "2".to_string());
    state.apply_event(&Event::BeadUpdated {
        id: BeadId::from_string("proj-1"),
        title: None,
        description: None,
        priority: Some(Priority::P0),
        tags: None,
        context: second,
        updated_at_ms: 3_000_000,
    });

    let bead = &state.beads["proj-1"];
    assert_eq!(bead.context["a"], "1");
    assert_eq!(bead.context["b"], "2");
    assert_eq!(bead.priority, Priority::P0);
    assert_eq!(bead.updated_at_ms, 3_000_000);
}

#[test]
fn closed_is_terminal_for_status_changes() {
    let mut state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        close("proj-1", 2_000_000),
    ]);
    state.apply_event(&Event::BeadStatusChanged {
        id: BeadId::from_string("proj-1"),
        status: BeadStatus::Open,
        updated_at_ms: 3_000_000,
    });
    assert_eq!(state.beads["proj-1"].status, BeadStatus::Closed);
}

#[test]
fn double_close_is_noop() {
    let mut state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        close("proj-1", 2_000_000),
    ]);
    state.apply_event(&close("proj-1", 9_000_000));
    // First close's timestamp is retained
    assert_eq!(state.beads["proj-1"].closed_at_ms, Some(2_000_000));
}

#[test]
fn claim_sets_assignment_and_agent_state() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        agent_spawned("agt-a", "proj", "engineer"),
        claim("proj-1", "agt-a", 2_000_000),
    ]);
    let bead = &state.beads["proj-1"];
    assert_eq!(bead.status, BeadStatus::InProgress);
    assert_eq!(bead.assigned_to, Some(AgentId::from_string("agt-a")));

    let agent = &state.agents["agt-a"];
    assert_eq!(agent.status, braid_core::AgentStatus::Working);
    assert_eq!(agent.current_bead, Some(BeadId::from_string("proj-1")));
    assert_invariants(&state);
}

#[test]
fn second_claim_loses() {
    let mut state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        agent_spawned("agt-a", "proj", "engineer"),
        agent_spawned("agt-b", "proj", "engineer"),
        claim("proj-1", "agt-a", 2_000_000),
    ]);
    state.apply_event(&claim("proj-1", "agt-b", 2_000_001));

    assert_eq!(state.beads["proj-1"].assigned_to, Some(AgentId::from_string("agt-a")));
    // The loser stays idle... (still paused here, never attached)
    assert!(state.agents["agt-b"].current_bead.is_none());
    assert_invariants(&state);
}

#[test]
fn completion_frees_the_agent() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        agent_spawned("agt-a", "proj", "engineer"),
        claim("proj-1", "agt-a", 2_000_000),
        close("proj-1", 3_000_000),
    ]);
    let agent = &state.agents["agt-a"];
    assert_eq!(agent.status, braid_core::AgentStatus::Idle);
    assert!(agent.current_bead.is_none());
    assert_invariants(&state);
}

#[test]
fn stopped_agent_releases_its_claim() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        agent_spawned("agt-a", "proj", "engineer"),
        claim("proj-1", "agt-a", 2_000_000),
        Event::AgentStopped {
            id: AgentId::from_string("agt-a"),
            reason: Some("operator".to_string()),
            at_ms: 3_000_000,
        },
    ]);
    let bead = &state.beads["proj-1"];
    assert_eq!(bead.status, BeadStatus::Open);
    assert!(bead.assigned_to.is_none());
    assert_eq!(state.agents["agt-a"].status, braid_core::AgentStatus::Stopped);
    assert_invariants(&state);
}

#[test]
fn dep_added_is_idempotent() {
    let mut state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        bead_created("proj-2", "proj", Priority::P1),
        dep("proj-1", "proj-2", DepKind::DependsOn),
    ]);
    state.apply_event(&dep("proj-1", "proj-2", DepKind::DependsOn));
    assert_eq!(state.beads["proj-1"].depends_on.len(), 1);
}

#[test]
fn in_flight_count_ignores_closed() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        bead_created("proj-2", "proj", Priority::P1),
        agent_spawned("agt-a", "proj", "engineer"),
        claim("proj-1", "agt-a", 2_000_000),
        close("proj-1", 3_000_000),
        claim("proj-2", "agt-a", 4_000_000),
    ]);
    assert_eq!(state.in_flight_count("agt-a"), 1);
}
