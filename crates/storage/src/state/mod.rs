// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

mod agents;
mod beads;
mod decisions;
mod graph;
mod helpers;
mod projects;
mod providers;

pub use graph::{WorkGraph, WorkGraphEdge};

use braid_core::{Agent, Bead, Event, Motivation, Project, Provider, Readiness};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Materialized state built from WAL replay.
///
/// Events are facts about what happened; state is derived from those facts.
/// Every applier must be idempotent: replays and at-least-once delivery
/// re-apply events, and duplicate terminal transitions must be no-ops.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub projects: HashMap<String, Project>,
    pub beads: HashMap<String, Bead>,
    pub agents: HashMap<String, Agent>,
    pub providers: HashMap<String, Provider>,
    #[serde(default)]
    pub motivations: HashMap<String, Motivation>,
    /// Runtime-only readiness cache (2-minute TTL). Not persisted;
    /// repopulates on the first dispatch tick after restart.
    #[serde(skip)]
    pub readiness: HashMap<String, Readiness>,
}

impl MaterializedState {
    /// Apply an event to derive state changes.
    pub fn apply_event(&mut self, event: &Event) {
        beads::apply(self, event);
        decisions::apply(self, event);
        agents::apply(self, event);
        providers::apply(self, event);
        projects::apply(self, event);
    }

    /// Get a bead by ID or unique prefix (like git commit hashes)
    pub fn get_bead(&self, id: &str) -> Option<&Bead> {
        helpers::find_by_prefix(&self.beads, id)
    }

    pub fn get_agent(&self, id: &str) -> Option<&Agent> {
        helpers::find_by_prefix(&self.agents, id)
    }

    pub fn get_provider(&self, id: &str) -> Option<&Provider> {
        helpers::find_by_prefix(&self.providers, id)
    }

    /// Ready beads for a project, in dispatch order.
    pub fn ready_beads(&self, project: &str) -> Vec<&Bead> {
        graph::ready_beads(self, project)
    }

    /// Whether a single bead is currently ready.
    pub fn bead_is_ready(&self, bead: &Bead) -> bool {
        graph::is_ready(self, bead)
    }

    /// Would adding `from -> to` close a cycle?
    pub fn would_cycle(&self, from: &str, to: &str) -> bool {
        graph::would_cycle(&self.beads, from, to)
    }

    /// Nodes and edges of a project's dependency graph.
    pub fn work_graph(&self, project: &str) -> WorkGraph {
        graph::work_graph(self, project)
    }

    /// Number of non-terminal beads currently assigned to an agent.
    pub fn in_flight_count(&self, agent_id: &str) -> usize {
        self.beads
            .values()
            .filter(|b| {
                !b.is_terminal() && b.assigned_to.as_ref().map(|a| a.as_str()) == Some(agent_id)
            })
            .count()
    }

    /// Agents belonging to a project.
    pub fn agents_for_project(&self, project: &str) -> Vec<&Agent> {
        let mut agents: Vec<&Agent> =
            self.agents.values().filter(|a| a.project == project).collect();
        agents.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        agents
    }

    /// Beads belonging to a project (unsorted).
    pub fn beads_for_project(&self, project: &str) -> Vec<&Bead> {
        self.beads.values().filter(|b| b.project == project).collect()
    }

    /// Healthy providers, for selection.
    pub fn active_providers(&self) -> Vec<&Provider> {
        self.providers.values().filter(|p| p.is_healthy()).collect()
    }
}

#[cfg(test)]
#[path = "../state_tests/mod.rs"]
mod tests;
