// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bead manager: the public contract over the bead graph.
//!
//! Every mutation validates against materialized state and commits its
//! event under the same state guard, so claims and terminal transitions
//! are single critical sections.

use super::{Runtime, RuntimeError};
use braid_core::{
    AgentId, Bead, BeadError, BeadId, BeadKind, BeadStatus, Clock, DepKind, Event, Priority,
};
use std::collections::HashMap;

/// Arguments for creating a bead.
pub struct CreateBead {
    pub project: String,
    pub title: String,
    pub description: String,
    pub kind: BeadKind,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub context: HashMap<String, String>,
}

/// Partial update, merged onto the bead.
#[derive(Default)]
pub struct BeadChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<BeadStatus>,
    pub assigned_to: Option<Option<AgentId>>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub context: HashMap<String, String>,
}

impl<C: Clock> Runtime<C> {
    /// Create a bead under a project's prefix. Fails `InvalidProject` for
    /// unknown projects; emits `bead:created`.
    pub fn create_bead(&self, params: CreateBead) -> Result<Bead, RuntimeError> {
        let now = self.now_ms();
        let mut state = self.store.lock_state();
        let prefix = state
            .projects
            .get(&params.project)
            .map(|p| p.prefix.clone())
            .ok_or_else(|| BeadError::InvalidProject(params.project.clone()))?;

        let id = BeadId::generate(&prefix);
        let event = Event::BeadCreated {
            id: id.clone(),
            project: params.project,
            title: params.title,
            description: params.description,
            kind: params.kind,
            priority: params.priority,
            tags: params.tags,
            context: params.context,
            created_at_ms: now,
        };
        self.store.commit_with(&mut state, &event)?;
        let bead = state
            .beads
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| BeadError::NotFound(id.as_str().to_string()))?;
        drop(state);

        let _ = self.executor.sink().bus().publish(event);
        Ok(bead)
    }

    /// Merge changes into a bead. Terminal-status transitions fail
    /// `TerminalBead`; the events emitted depend on what changed.
    pub fn update_bead(&self, id: &str, changes: BeadChanges) -> Result<Bead, RuntimeError> {
        let now = self.now_ms();
        let mut state = self.store.lock_state();
        let bead = state.get_bead(id).ok_or_else(|| BeadError::NotFound(id.to_string()))?;
        let bead_id = bead.id.clone();
        let was_closed = bead.status == BeadStatus::Closed;

        if was_closed && changes.status.map(|s| s != BeadStatus::Closed).unwrap_or(false) {
            return Err(BeadError::TerminalBead(id.to_string()).into());
        }

        let mut events = Vec::new();
        if changes.title.is_some()
            || changes.description.is_some()
            || changes.priority.is_some()
            || changes.tags.is_some()
            || !changes.context.is_empty()
        {
            events.push(Event::BeadUpdated {
                id: bead_id.clone(),
                title: changes.title,
                description: changes.description,
                priority: changes.priority,
                tags: changes.tags,
                context: changes.context,
                updated_at_ms: now,
            });
        }

        if let Some(assigned) = changes.assigned_to {
            events.push(Event::BeadAssigned {
                id: bead_id.clone(),
                agent: assigned,
                updated_at_ms: now,
            });
        }

        let current = state.beads.get(bead_id.as_str()).map(|b| b.status);
        match changes.status {
            // Re-closing a closed bead is a success no-op: no event, no error.
            Some(BeadStatus::Closed) if !was_closed => {
                events.push(Event::BeadCompleted {
                    id: bead_id.clone(),
                    result: None,
                    closed_at_ms: now,
                });
            }
            Some(status) if status != BeadStatus::Closed && Some(status) != current => {
                events.push(Event::BeadStatusChanged {
                    id: bead_id.clone(),
                    status,
                    updated_at_ms: now,
                });
            }
            _ => {}
        }

        for event in &events {
            self.store.commit_with(&mut state, event)?;
        }
        let updated = state
            .beads
            .get(bead_id.as_str())
            .cloned()
            .ok_or_else(|| BeadError::NotFound(bead_id.as_str().to_string()))?;
        drop(state);

        for event in events {
            let _ = self.executor.sink().bus().publish(event);
        }
        Ok(updated)
    }

    /// Add a dependency edge, rejecting cycles and unknown endpoints.
    pub fn add_dependency(&self, from: &str, to: &str, kind: DepKind) -> Result<(), RuntimeError> {
        let mut state = self.store.lock_state();
        let from_id = state
            .get_bead(from)
            .map(|b| b.id.clone())
            .ok_or_else(|| BeadError::UnknownRef(from.to_string()))?;
        let to_id = state
            .get_bead(to)
            .map(|b| b.id.clone())
            .ok_or_else(|| BeadError::UnknownRef(to.to_string()))?;

        if state.would_cycle(from_id.as_str(), to_id.as_str()) {
            return Err(BeadError::CycleDetected {
                from: from_id.as_str().to_string(),
                to: to_id.as_str().to_string(),
            }
            .into());
        }

        let event = Event::BeadDepAdded { from: from_id, to: to_id, kind };
        self.store.commit_with(&mut state, &event)?;
        drop(state);
        let _ = self.executor.sink().bus().publish(event);
        Ok(())
    }

    /// Atomic claim: open→in_progress iff unassigned. `Conflict` is soft.
    pub fn claim_bead(&self, id: &str, agent: &str) -> Result<(), RuntimeError> {
        let now = self.now_ms();
        let mut state = self.store.lock_state();
        // Re-read inside the critical section: the answer may have changed
        // since the caller looked.
        let bead = state.get_bead(id).ok_or_else(|| BeadError::NotFound(id.to_string()))?;
        if !bead.is_claimable() {
            return Err(BeadError::Conflict(id.to_string()).into());
        }
        let agent_id = state
            .get_agent(agent)
            .map(|a| a.id)
            .ok_or_else(|| RuntimeError::AgentNotFound(agent.to_string()))?;

        let event = Event::BeadClaimed { id: bead.id.clone(), agent: agent_id, claimed_at_ms: now };
        self.store.commit_with(&mut state, &event)?;
        drop(state);
        let _ = self.executor.sink().bus().publish(event);
        Ok(())
    }

    /// Remove a resolved decision's blocking edges and announce beads that
    /// became ready.
    ///
    /// The state-side edge removal already happened in the applier; this
    /// emits the transient `bead:unblocked` notifications.
    pub(crate) fn announce_unblocked(&self, decision: &BeadId, parents: &[BeadId]) {
        let ready: Vec<BeadId> = self.lock_state(|state| {
            parents
                .iter()
                .filter(|id| {
                    state
                        .beads
                        .get(id.as_str())
                        .map(|b| state.bead_is_ready(b))
                        .unwrap_or(false)
                })
                .cloned()
                .collect()
        });
        for id in ready {
            let event = Event::BeadUnblocked { id, decision: decision.clone() };
            if let Err(e) = self.executor.sink().emit(&event) {
                tracing::warn!(error = %e, "failed to announce unblock");
            }
        }
    }
}
