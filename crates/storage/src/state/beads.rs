// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bead event handlers.

use super::helpers;
use super::MaterializedState;
use braid_core::{AgentStatus, Bead, BeadStatus, DepKind, Event};

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::BeadCreated {
            id,
            project,
            title,
            description,
            kind,
            priority,
            tags,
            context,
            created_at_ms,
        } => {
            // Idempotency: skip if already exists
            if state.beads.contains_key(id.as_str()) {
                return;
            }
            state.beads.insert(
                id.as_str().to_string(),
                Bead {
                    id: id.clone(),
                    project: project.clone(),
                    title: title.clone(),
                    description: description.clone(),
                    kind: *kind,
                    priority: *priority,
                    status: BeadStatus::Open,
                    assigned_to: None,
                    tags: tags.clone(),
                    context: context.clone(),
                    depends_on: Vec::new(),
                    blocked_by: Vec::new(),
                    decision: None,
                    created_at_ms: *created_at_ms,
                    updated_at_ms: *created_at_ms,
                    closed_at_ms: None,
                },
            );
        }

        Event::BeadUpdated { id, title, description, priority, tags, context, updated_at_ms } => {
            if let Some(bead) = state.beads.get_mut(id.as_str()) {
                if let Some(t) = title {
                    bead.title = t.clone();
                }
                if let Some(d) = description {
                    bead.description = d.clone();
                }
                if let Some(p) = priority {
                    bead.priority = *p;
                }
                if let Some(t) = tags {
                    bead.tags = t.clone();
                }
                helpers::merge_context(&mut bead.context, context);
                bead.updated_at_ms = *updated_at_ms;
            }
        }

        Event::BeadStatusChanged { id, status, updated_at_ms } => {
            let mut unblock_from = None;
            if let Some(bead) = state.beads.get_mut(id.as_str()) {
                // Closed is terminal; duplicate transitions are no-ops.
                if bead.status == BeadStatus::Closed {
                    return;
                }
                bead.status = *status;
                bead.updated_at_ms = *updated_at_ms;
                if *status == BeadStatus::Closed {
                    bead.closed_at_ms = Some(*updated_at_ms);
                    unblock_from = Some(bead.id.clone());
                }
            }
            if let Some(closed) = unblock_from {
                release_assignee(state, closed.as_str());
                remove_blocking_edges(state, closed.as_str());
            }
        }

        Event::BeadAssigned { id, agent, updated_at_ms } => {
            let previous = match state.beads.get_mut(id.as_str()) {
                Some(bead) => {
                    let previous = bead.assigned_to.take();
                    bead.assigned_to = agent.clone();
                    bead.updated_at_ms = *updated_at_ms;
                    previous
                }
                None => return,
            };
            // Reassignment releases the previous holder.
            if let Some(previous) = previous.filter(|p| Some(p) != agent.as_ref()) {
                if let Some(holder) = state.agents.get_mut(previous.as_str()) {
                    if holder.current_bead.as_ref().map(|b| b.as_str()) == Some(id.as_str()) {
                        holder.current_bead = None;
                        if holder.status == AgentStatus::Working {
                            holder.status = AgentStatus::Idle;
                        }
                    }
                }
            }
        }

        Event::BeadClaimed { id, agent, claimed_at_ms } => {
            let claimed = match state.beads.get_mut(id.as_str()) {
                Some(bead) => {
                    let duplicate = bead.status == BeadStatus::InProgress
                        && bead.assigned_to.as_ref() == Some(agent);
                    if !bead.is_claimable() && !duplicate {
                        // Lost race replayed out of order; facts later in the
                        // WAL already superseded this one.
                        return;
                    }
                    bead.status = BeadStatus::InProgress;
                    bead.assigned_to = Some(agent.clone());
                    bead.updated_at_ms = *claimed_at_ms;
                    bead.id.clone()
                }
                None => return,
            };
            if let Some(agent) = state.agents.get_mut(agent.as_str()) {
                agent.current_bead = Some(claimed);
                agent.status = AgentStatus::Working;
                agent.last_active_ms = *claimed_at_ms;
            }
        }

        Event::BeadCompleted { id, result, closed_at_ms } => {
            let mut closed = None;
            if let Some(bead) = state.beads.get_mut(id.as_str()) {
                if bead.status == BeadStatus::Closed {
                    return;
                }
                bead.status = BeadStatus::Closed;
                bead.closed_at_ms = Some(*closed_at_ms);
                bead.updated_at_ms = *closed_at_ms;
                if let Some(r) = result {
                    bead.context.insert("result".to_string(), r.clone());
                }
                closed = Some(bead.id.clone());
            }
            if let Some(closed) = closed {
                release_assignee(state, closed.as_str());
                remove_blocking_edges(state, closed.as_str());
            }
        }

        Event::BeadDepAdded { from, to, kind } => {
            if let Some(bead) = state.beads.get_mut(from.as_str()) {
                let edges = match kind {
                    DepKind::DependsOn => &mut bead.depends_on,
                    DepKind::Blocks => &mut bead.blocked_by,
                };
                if !edges.contains(to) {
                    edges.push(to.clone());
                }
            }
        }

        Event::BeadDepRemoved { from, to } => {
            if let Some(bead) = state.beads.get_mut(from.as_str()) {
                bead.depends_on.retain(|d| d != to);
                bead.blocked_by.retain(|d| d != to);
            }
        }

        _ => {}
    }
}

/// Return a closed bead's agent to the idle pool.
fn release_assignee(state: &mut MaterializedState, bead_id: &str) {
    let assignee = state
        .beads
        .get(bead_id)
        .and_then(|b| b.assigned_to.as_ref())
        .map(|a| a.as_str().to_string());
    let Some(assignee) = assignee else {
        return;
    };
    if let Some(agent) = state.agents.get_mut(&assignee) {
        if agent.current_bead.as_ref().map(|b| b.as_str()) == Some(bead_id) {
            agent.current_bead = None;
            if agent.status == AgentStatus::Working {
                agent.status = AgentStatus::Idle;
            }
        }
    }
}

/// Drop blocking edges pointing at a closed bead.
///
/// Keeps invariant: a closed decision leaves no `blocked_by` edge behind.
/// `depends_on` edges stay; readiness treats closed neighbors as
/// satisfied, and the history is useful in the work graph.
pub(crate) fn remove_blocking_edges(state: &mut MaterializedState, closed_id: &str) {
    for bead in state.beads.values_mut() {
        bead.blocked_by.retain(|d| d.as_str() != closed_id);
    }
}
