// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision event handlers.

use super::beads::remove_blocking_edges;
use super::MaterializedState;
use braid_core::{AgentId, Bead, BeadKind, BeadStatus, DecisionState, Event};

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::DecisionCreated {
            id,
            project,
            title,
            question,
            options,
            recommendation,
            parent,
            requester,
            priority,
            context,
            created_at_ms,
        } => {
            // Idempotency: skip if already exists
            if !state.beads.contains_key(id.as_str()) {
                let mut decision = DecisionState::new(question.clone(), options.clone());
                decision.recommendation = recommendation.clone();
                decision.requester = requester.clone();
                state.beads.insert(
                    id.as_str().to_string(),
                    Bead {
                        id: id.clone(),
                        project: project.clone(),
                        title: title.clone(),
                        description: question.clone(),
                        kind: BeadKind::Decision,
                        priority: *priority,
                        status: BeadStatus::Open,
                        assigned_to: None,
                        tags: Vec::new(),
                        context: context.clone(),
                        depends_on: Vec::new(),
                        blocked_by: Vec::new(),
                        decision: Some(decision),
                        created_at_ms: *created_at_ms,
                        updated_at_ms: *created_at_ms,
                        closed_at_ms: None,
                    },
                );
            }

            // The decision blocks its parent until resolved.
            if let Some(parent_id) = parent {
                if let Some(parent_bead) = state.beads.get_mut(parent_id.as_str()) {
                    if !parent_bead.blocked_by.contains(id) {
                        parent_bead.blocked_by.push(id.clone());
                    }
                }
            }
        }

        Event::DecisionClaimed { id, decider } => {
            if let Some(bead) = state.beads.get_mut(id.as_str()) {
                if bead.status == BeadStatus::Closed {
                    return;
                }
                let Some(decision) = bead.decision.as_mut() else {
                    return;
                };
                if decision.is_resolved() || !decision.accepts_decider(decider) {
                    return;
                }
                decision.decider = Some(decider.clone());
                // The decider binding doubles as the assignment, keeping the
                // in_progress ⇒ assigned invariant for decision beads too.
                bead.status = BeadStatus::InProgress;
                bead.assigned_to = Some(AgentId::from_string(decider));
            }
        }

        Event::DecisionResolved { id, decider, decision, rationale, resolved_at_ms } => {
            let mut resolved = None;
            if let Some(bead) = state.beads.get_mut(id.as_str()) {
                let Some(payload) = bead.decision.as_mut() else {
                    return;
                };
                // Duplicate resolutions and expired decisions are no-ops.
                if payload.is_resolved() || bead.status == BeadStatus::Closed {
                    return;
                }
                payload.decider = Some(decider.clone());
                payload.decision = Some(decision.clone());
                payload.rationale = rationale.clone();
                payload.decided_at_ms = Some(*resolved_at_ms);
                // decided_at set ⇒ closed, atomically.
                bead.status = BeadStatus::Closed;
                bead.closed_at_ms = Some(*resolved_at_ms);
                bead.updated_at_ms = *resolved_at_ms;
                resolved = Some(bead.id.clone());
            }
            if let Some(resolved) = resolved {
                remove_blocking_edges(state, resolved.as_str());
            }
        }

        Event::DecisionTimedOut { id, at_ms } => {
            let mut timed_out = None;
            if let Some(bead) = state.beads.get_mut(id.as_str()) {
                let Some(payload) = bead.decision.as_mut() else {
                    return;
                };
                if payload.is_resolved() || bead.status == BeadStatus::Closed {
                    return;
                }
                payload.timed_out = true;
                // The decision expires unresolved; close it so parents are
                // not blocked forever.
                bead.status = BeadStatus::Closed;
                bead.closed_at_ms = Some(*at_ms);
                bead.updated_at_ms = *at_ms;
                timed_out = Some(bead.id.clone());
            }
            if let Some(timed_out) = timed_out {
                remove_blocking_edges(state, timed_out.as_str());
            }
        }

        _ => {}
    }
}
