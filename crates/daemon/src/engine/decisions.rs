// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision manager: create, claim, resolve, CEO escalation, apply-fix.

use super::{Runtime, RuntimeError};
use braid_core::decision::{CEO_APPROVE, CEO_DENY, CEO_NEEDS_MORE_INFO};
use braid_core::{
    bead::ctx, AgentId, Bead, BeadError, BeadId, BeadStatus, Clock, DecisionError, DecisionOption,
    Effect, Event, Priority, TimerId,
};
use std::collections::HashMap;

/// Arguments for creating a decision bead.
pub struct CreateDecision {
    pub project: String,
    pub question: String,
    pub options: Vec<DecisionOption>,
    pub recommendation: Option<String>,
    pub parent: Option<BeadId>,
    pub requester: Option<AgentId>,
    pub priority: Priority,
    pub title: Option<String>,
    pub context: HashMap<String, String>,
}

impl<C: Clock> Runtime<C> {
    /// Create a decision bead; when `parent` is given it gains a blocking
    /// edge to the decision.
    pub fn create_decision(&self, params: CreateDecision) -> Result<Bead, RuntimeError> {
        let now = self.now_ms();
        let mut state = self.store.lock_state();
        let prefix = state
            .projects
            .get(&params.project)
            .map(|p| p.prefix.clone())
            .ok_or_else(|| BeadError::InvalidProject(params.project.clone()))?;

        let parent = match &params.parent {
            Some(parent) => Some(
                state
                    .get_bead(parent.as_str())
                    .map(|b| b.id.clone())
                    .ok_or_else(|| BeadError::UnknownRef(parent.as_str().to_string()))?,
            ),
            None => None,
        };

        let id = BeadId::generate(&prefix);
        let title = params
            .title
            .unwrap_or_else(|| format!("Decision: {}", braid_core::short(&params.question, 60)));
        let event = Event::DecisionCreated {
            id: id.clone(),
            project: params.project,
            title,
            question: params.question,
            options: params.options,
            recommendation: params.recommendation,
            parent,
            requester: params.requester,
            priority: params.priority,
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

    /// Bind a decider. Fails `AlreadyClaimed` when a different decider
    /// holds the decision.
    pub fn claim_decision(&self, id: &str, decider: &str) -> Result<(), RuntimeError> {
        let mut state = self.store.lock_state();
        let bead = state.get_bead(id).ok_or_else(|| DecisionError::NotFound(id.to_string()))?;
        let payload = bead
            .decision
            .as_ref()
            .ok_or_else(|| DecisionError::NotADecision(id.to_string()))?;
        if payload.is_resolved() || bead.status == BeadStatus::Closed {
            return Err(DecisionError::AlreadyResolved(id.to_string()).into());
        }
        if !payload.accepts_decider(decider) {
            return Err(DecisionError::AlreadyClaimed {
                id: id.to_string(),
                decider: payload.decider.clone().unwrap_or_default(),
            }
            .into());
        }

        let event =
            Event::DecisionClaimed { id: bead.id.clone(), decider: decider.to_string() };
        self.store.commit_with(&mut state, &event)?;
        drop(state);
        let _ = self.executor.sink().bus().publish(event);
        Ok(())
    }

    /// Resolve exactly once. Same-decider duplicates are success no-ops;
    /// a different decider gets `DeciderMismatch`. Resolution closes the
    /// decision, unblocks parents, and runs the escalation cascade.
    pub async fn resolve_decision(
        &self,
        id: &str,
        decider: &str,
        decision: &str,
        rationale: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let now = self.now_ms();
        let (decision_id, parents) = {
            let mut state = self.store.lock_state();
            let bead =
                state.get_bead(id).ok_or_else(|| DecisionError::NotFound(id.to_string()))?;
            let decision_id = bead.id.clone();
            let payload = bead
                .decision
                .as_ref()
                .ok_or_else(|| DecisionError::NotADecision(id.to_string()))?;

            if payload.is_resolved() {
                // Idempotent for the decider who resolved it.
                let claimed_by = payload.decider.clone().unwrap_or_default();
                if claimed_by == decider {
                    return Ok(());
                }
                return Err(DecisionError::DeciderMismatch {
                    id: id.to_string(),
                    claimed_by,
                    decider: decider.to_string(),
                }
                .into());
            }
            // A timed-out decision is terminal without a resolution.
            if bead.status == BeadStatus::Closed {
                return Err(DecisionError::AlreadyResolved(id.to_string()).into());
            }
            if !payload.accepts_decider(decider) {
                return Err(DecisionError::DeciderMismatch {
                    id: id.to_string(),
                    claimed_by: payload.decider.clone().unwrap_or_default(),
                    decider: decider.to_string(),
                }
                .into());
            }

            // Parents captured before the applier strips the edges.
            let parents: Vec<BeadId> = state
                .beads
                .values()
                .filter(|b| b.blocked_by.contains(&decision_id))
                .map(|b| b.id.clone())
                .collect();

            let event = Event::DecisionResolved {
                id: decision_id.clone(),
                decider: decider.to_string(),
                decision: decision.to_string(),
                rationale: rationale.map(String::from),
                resolved_at_ms: now,
            };
            self.store.commit_with(&mut state, &event)?;
            drop(state);
            let _ = self.executor.sink().bus().publish(event);
            (decision_id, parents)
        };

        self.executor
            .execute(Effect::CancelTimer { id: TimerId::decision_timeout(&decision_id) })
            .await
            .ok();

        self.announce_unblocked(&decision_id, &parents);
        self.run_resolution_cascade(&decision_id, decision, &parents).await?;
        Ok(())
    }

    /// Expire a pending decision (the 48-hour timer fired).
    pub(crate) fn timeout_decision(&self, id: &str) -> Result<(), RuntimeError> {
        let now = self.now_ms();
        let mut state = self.store.lock_state();
        let Some(bead) = state.get_bead(id) else {
            return Ok(());
        };
        let Some(payload) = bead.decision.as_ref() else {
            return Ok(());
        };
        if payload.is_resolved() || bead.status == BeadStatus::Closed {
            return Ok(());
        }
        let parents: Vec<BeadId> = state
            .beads
            .values()
            .filter(|b| b.blocked_by.contains(&bead.id))
            .map(|b| b.id.clone())
            .collect();
        let event = Event::DecisionTimedOut { id: bead.id.clone(), at_ms: now };
        let decision_id = bead.id.clone();
        self.store.commit_with(&mut state, &event)?;
        drop(state);
        let _ = self.executor.sink().bus().publish(event);
        self.announce_unblocked(&decision_id, &parents);
        Ok(())
    }

    /// Escalate a bead to the CEO: P0 decision with
    /// approve/deny/needs_more_info, parent raised to P0.
    pub fn escalate_to_ceo(
        &self,
        bead_id: &str,
        reason: &str,
        returned_to: Option<&str>,
    ) -> Result<Bead, RuntimeError> {
        let (project, parent_id, title) = self.lock_state(|state| {
            state
                .get_bead(bead_id)
                .map(|b| (b.project.clone(), b.id.clone(), b.title.clone()))
                .ok_or_else(|| BeadError::NotFound(bead_id.to_string()))
        })?;

        let mut context = HashMap::new();
        context.insert(ctx::ESCALATED_TO.to_string(), "ceo".to_string());
        if let Some(agent) = returned_to {
            context.insert(ctx::RETURNED_TO.to_string(), agent.to_string());
        }

        let decision = self.create_decision(CreateDecision {
            project,
            question: format!("Escalated: {title}: {reason}"),
            options: vec![
                DecisionOption::new(CEO_APPROVE),
                DecisionOption::new(CEO_DENY),
                DecisionOption::new(CEO_NEEDS_MORE_INFO),
            ],
            recommendation: None,
            parent: Some(parent_id.clone()),
            requester: returned_to.map(AgentId::from_string),
            priority: Priority::P0,
            title: Some(format!("[CEO] {title}")),
            context,
        })?;

        // Raise the parent and mark it escalated so guards fire once.
        let mut parent_context = HashMap::new();
        parent_context.insert(ctx::ESCALATED.to_string(), "true".to_string());
        self.update_bead(
            parent_id.as_str(),
            super::beads::BeadChanges {
                priority: Some(Priority::P0),
                context: parent_context,
                ..Default::default()
            },
        )?;

        tracing::info!(bead = %parent_id, decision = %decision.id, reason, "escalated to CEO");
        Ok(decision)
    }

    /// Post-resolution semantics: the CEO cascade and auto-apply-fix.
    async fn run_resolution_cascade(
        &self,
        decision_id: &BeadId,
        decision_text: &str,
        parents: &[BeadId],
    ) -> Result<(), RuntimeError> {
        let decision = self.lock_state(|state| state.beads.get(decision_id.as_str()).cloned());
        let Some(decision) = decision else {
            return Ok(());
        };

        if decision.context.get(ctx::ESCALATED_TO).map(String::as_str) == Some("ceo") {
            self.run_ceo_cascade(&decision, decision_text, parents)?;
        }

        self.maybe_create_apply_fix(&decision, decision_text)?;
        Ok(())
    }

    fn run_ceo_cascade(
        &self,
        decision: &Bead,
        decision_text: &str,
        parents: &[BeadId],
    ) -> Result<(), RuntimeError> {
        let rationale = decision
            .decision
            .as_ref()
            .and_then(|d| d.rationale.clone())
            .unwrap_or_else(|| decision_text.to_string());
        let verdict = decision_text.to_ascii_lowercase();

        for parent_id in parents {
            let Some(parent) =
                self.lock_state(|state| state.beads.get(parent_id.as_str()).cloned())
            else {
                continue;
            };

            if verdict.contains(CEO_NEEDS_MORE_INFO) {
                // Back to the requesting agent, flagged for redispatch.
                let mut context = HashMap::new();
                if let Some(agent) = decision.context.get(ctx::RETURNED_TO) {
                    context.insert(ctx::RETURNED_TO.to_string(), agent.clone());
                }
                context.insert(
                    ctx::REDISPATCH_COUNT.to_string(),
                    (parent.redispatch_count() + 1).to_string(),
                );
                self.update_bead(
                    parent.id.as_str(),
                    super::beads::BeadChanges {
                        status: Some(BeadStatus::Open),
                        assigned_to: Some(None),
                        context,
                        ..Default::default()
                    },
                )?;
            } else if verdict.contains(CEO_DENY) {
                let mut context = HashMap::new();
                context.insert(ctx::CEO_COMMENT.to_string(), rationale.clone());
                self.update_bead(
                    parent.id.as_str(),
                    super::beads::BeadChanges {
                        status: Some(BeadStatus::Open),
                        assigned_to: Some(None),
                        context,
                        ..Default::default()
                    },
                )?;
            } else if verdict.contains(CEO_APPROVE) {
                self.update_bead(
                    parent.id.as_str(),
                    super::beads::BeadChanges {
                        status: Some(BeadStatus::Closed),
                        ..Default::default()
                    },
                )?;
            }
        }
        Ok(())
    }

    /// When an approved decision is a code-fix approval, file the
    /// follow-up apply-fix task.
    fn maybe_create_apply_fix(
        &self,
        decision: &Bead,
        decision_text: &str,
    ) -> Result<(), RuntimeError> {
        if !decision.title.to_ascii_lowercase().contains("code fix approval") {
            return Ok(());
        }
        if !decision_text.to_ascii_lowercase().contains("approve") {
            return Ok(());
        }

        let mut context = HashMap::new();
        if let Some(bug) = extract_original_bug(&decision.description) {
            context.insert(ctx::ORIGINAL_BUG.to_string(), bug);
        }
        if let Some(requester) = decision.decision.as_ref().and_then(|d| d.requester.as_ref()) {
            context.insert(ctx::RETURNED_TO.to_string(), requester.as_str().to_string());
        }

        let bead = self.create_bead(super::beads::CreateBead {
            project: decision.project.clone(),
            title: format!("[apply-fix] Apply approved patch from {}", decision.id),
            description: decision.description.clone(),
            kind: braid_core::BeadKind::Task,
            priority: Priority::P0,
            tags: vec!["apply-fix".to_string()],
            context,
        })?;
        tracing::info!(decision = %decision.id, bead = %bead.id, "filed apply-fix task");
        Ok(())
    }
}

/// Extract the original bug reference from a proposal body.
///
/// Accepts `**Original Bug:** <id>` and `Original Bug: <id>`.
pub(crate) fn extract_original_bug(description: &str) -> Option<String> {
    static PATTERN: &str = r"(?m)^\s*(?:\*\*)?Original Bug:(?:\*\*)?\s*(\S+)";
    let re = regex::Regex::new(PATTERN).ok()?;
    re.captures(description).map(|caps| caps[1].to_string())
}
