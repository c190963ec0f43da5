// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency graph algorithms over the bead map.
//!
//! The graph is small per project (thousands at most) and predominantly
//! read, so the algorithms walk the `{id → bead}` map directly instead of
//! maintaining separate adjacency structures.

use super::MaterializedState;
use braid_core::{Bead, BeadStatus, DepKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Serializable view of a project's dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkGraph {
    pub nodes: Vec<Bead>,
    pub edges: Vec<WorkGraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkGraphEdge {
    pub from: String,
    pub to: String,
    pub kind: DepKind,
}

/// Would inserting the edge `from -> to` create a cycle?
///
/// Incremental DFS from the new edge's target: a path from `to` back to
/// `from` over existing edges means the insert closes a loop. A self-edge
/// is a cycle by definition.
pub(crate) fn would_cycle(beads: &HashMap<String, Bead>, from: &str, to: &str) -> bool {
    if from == to {
        return true;
    }
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![to];
    while let Some(id) = stack.pop() {
        if id == from {
            return true;
        }
        if !visited.insert(id) {
            continue;
        }
        if let Some(bead) = beads.get(id) {
            stack.extend(bead.depends_on.iter().map(|d| d.as_str()));
            stack.extend(bead.blocked_by.iter().map(|d| d.as_str()));
        }
    }
    false
}

/// A bead is ready iff it is open, not a decision, unassigned, and every
/// dependency (both kinds) is closed.
///
/// Edges to beads that no longer exist are treated as satisfied: a pruned
/// neighbor must not block work forever.
pub(crate) fn is_ready(state: &MaterializedState, bead: &Bead) -> bool {
    if bead.status != BeadStatus::Open || bead.is_decision() || bead.assigned_to.is_some() {
        return false;
    }
    bead.depends_on
        .iter()
        .chain(bead.blocked_by.iter())
        .all(|dep| match state.beads.get(dep.as_str()) {
            Some(neighbor) => neighbor.status == BeadStatus::Closed,
            None => true,
        })
}

/// Ready beads sorted by (priority, created_at, id).
///
/// P0 sorts first; the id tiebreak makes the order total so dispatch is
/// deterministic under equal priority and age.
pub(crate) fn ready_beads<'a>(state: &'a MaterializedState, project: &str) -> Vec<&'a Bead> {
    let mut ready: Vec<&Bead> = state
        .beads
        .values()
        .filter(|b| b.project == project && is_ready(state, b))
        .collect();
    ready.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.created_at_ms.cmp(&b.created_at_ms))
            .then(a.id.cmp(&b.id))
    });
    ready
}

pub(crate) fn work_graph(state: &MaterializedState, project: &str) -> WorkGraph {
    let mut nodes: Vec<Bead> = state
        .beads
        .values()
        .filter(|b| b.project == project)
        .cloned()
        .collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut edges = Vec::new();
    for bead in &nodes {
        for dep in &bead.depends_on {
            edges.push(WorkGraphEdge {
                from: bead.id.as_str().to_string(),
                to: dep.as_str().to_string(),
                kind: DepKind::DependsOn,
            });
        }
        for dep in &bead.blocked_by {
            edges.push(WorkGraphEdge {
                from: bead.id.as_str().to_string(),
                to: dep.as_str().to_string(),
                kind: DepKind::Blocks,
            });
        }
    }
    WorkGraph { nodes, edges }
}
