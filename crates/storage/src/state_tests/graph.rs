// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use braid_core::DepKind;

/// Ready-bead selection: B1(P0 open, no deps), B2(P1 open, depends on
/// B1), B3(P0 closed). get_ready returns [B1].
#[test]
fn ready_selection_scenario() {
    let state = state_from(&[
        bead_created("proj-b1", "proj", Priority::P0),
        bead_created("proj-b2", "proj", Priority::P1),
        bead_created("proj-b3", "proj", Priority::P0),
        dep("proj-b2", "proj-b1", DepKind::DependsOn),
        close("proj-b3", 2_000_000),
    ]);
    let ready: Vec<&str> = state.ready_beads("proj").iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ready, vec!["proj-b1"]);
}

#[test]
fn ready_sorts_by_priority_then_age_then_id() {
    let mut old_p1 = bead_created("proj-old", "proj", Priority::P1);
    if let Event::BeadCreated { created_at_ms, .. } = &mut old_p1 {
        *created_at_ms = 500_000;
    }
    let state = state_from(&[
        bead_created("proj-b", "proj", Priority::P1),
        bead_created("proj-a", "proj", Priority::P1),
        old_p1,
        bead_created("proj-z", "proj", Priority::P0),
    ]);
    let ready: Vec<&str> = state.ready_beads("proj").iter().map(|b| b.id.as_str()).collect();
    // P0 first, then oldest, then lexicographic id
    assert_eq!(ready, vec!["proj-z", "proj-old", "proj-a", "proj-b"]);
}

#[test]
fn decisions_are_never_ready() {
    let state = state_from(&[decision_created("proj-d1", "proj", None)]);
    assert!(state.ready_beads("proj").is_empty());
}

#[test]
fn assigned_beads_are_not_ready() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        agent_spawned("agt-a", "proj", "engineer"),
        claim("proj-1", "agt-a", 2_000_000),
    ]);
    assert!(state.ready_beads("proj").is_empty());
}

#[test]
fn open_dependency_blocks_readiness() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        bead_created("proj-2", "proj", Priority::P1),
        dep("proj-1", "proj-2", DepKind::Blocks),
    ]);
    let ready: Vec<&str> = state.ready_beads("proj").iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ready, vec!["proj-2"]);
}

#[test]
fn missing_neighbor_counts_as_satisfied() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        dep("proj-1", "proj-gone", DepKind::DependsOn),
    ]);
    assert_eq!(state.ready_beads("proj").len(), 1);
}

#[test]
fn self_edge_is_a_cycle() {
    let state = state_from(&[bead_created("proj-1", "proj", Priority::P1)]);
    assert!(state.would_cycle("proj-1", "proj-1"));
}

#[test]
fn two_node_cycle_detected() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        bead_created("proj-2", "proj", Priority::P1),
        dep("proj-1", "proj-2", DepKind::DependsOn),
    ]);
    // proj-2 -> proj-1 would close the loop
    assert!(state.would_cycle("proj-2", "proj-1"));
    // unrelated direction is fine
    assert!(!state.would_cycle("proj-1", "proj-2"));
}

#[test]
fn transitive_cycle_detected() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        bead_created("proj-2", "proj", Priority::P1),
        bead_created("proj-3", "proj", Priority::P1),
        dep("proj-1", "proj-2", DepKind::DependsOn),
        dep("proj-2", "proj-3", DepKind::Blocks),
    ]);
    assert!(state.would_cycle("proj-3", "proj-1"));
}

#[test]
fn work_graph_lists_nodes_and_edges() {
    let state = state_from(&[
        bead_created("proj-1", "proj", Priority::P1),
        bead_created("proj-2", "proj", Priority::P1),
        bead_created("other-1", "other", Priority::P1),
        dep("proj-1", "proj-2", DepKind::DependsOn),
    ]);
    let graph = state.work_graph("proj");
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].from, "proj-1");
    assert_eq!(graph.edges[0].to, "proj-2");
    assert_eq!(graph.edges[0].kind, DepKind::DependsOn);
}
