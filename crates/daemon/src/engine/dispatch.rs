// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher: one tick matches ready beads to idle agents.

use super::{Runtime, RuntimeError};
use braid_config::ReadinessMode;
use braid_core::{Agent, Bead, Clock, Effect, Event, SkipReason, TimerId};

/// Counters from one dispatch pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub dispatched: u32,
    pub skipped: Vec<SkipReason>,
}

impl<C: Clock> Runtime<C> {
    /// One dispatch pass over every project (or just the given one).
    ///
    /// Within a tick P0 is never starved: beads arrive pre-sorted by
    /// (priority, age, id) and are claimed in that order. Partial work is
    /// never rolled back; a conflicting claim just moves on.
    pub async fn dispatch_once(&self, project: Option<&str>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        let mut projects: Vec<String> = self.lock_state(|state| {
            state
                .projects
                .keys()
                .filter(|id| project.map(|p| p == id.as_str()).unwrap_or(true))
                .cloned()
                .collect()
        });
        projects.sort();

        for project_id in projects {
            self.dispatch_project(&project_id, &mut outcome).await;
        }

        let event = Event::DispatchTick {
            project: project.map(String::from),
            dispatched: outcome.dispatched,
            skipped: outcome.skipped.clone(),
        };
        if let Err(e) = self.executor.sink().emit(&event) {
            tracing::warn!(error = %e, "failed to publish dispatch tick");
        }

        outcome
    }

    /// Tick driver used by the engine loop: honors the in-flight gate and
    /// re-runs when wakes arrived mid-tick.
    pub(crate) async fn run_dispatch_cycle(&self, project: Option<&str>) {
        if !self.begin_dispatch() {
            return;
        }
        loop {
            let outcome = self.dispatch_once(project).await;
            if outcome.dispatched > 0 {
                tracing::debug!(dispatched = outcome.dispatched, "dispatch pass complete");
            }
            if !self.end_dispatch() {
                break;
            }
            if !self.begin_dispatch() {
                break;
            }
        }
    }

    async fn dispatch_project(&self, project: &str, outcome: &mut DispatchOutcome) {
        // Readiness gate: 2-minute cache; block-mode skips, warn-mode
        // proceeds. A stale cache fires an async re-check either way.
        match self.cached_readiness(project) {
            Some(ready) if ready.ready => {}
            Some(ready) => match self.settings.readiness_mode {
                ReadinessMode::Block => {
                    outcome.skipped.push(SkipReason::new(
                        project,
                        format!("not ready: {}", ready.issues.join("; ")),
                    ));
                    return;
                }
                ReadinessMode::Warn => {
                    tracing::warn!(project, issues = ?ready.issues, "dispatching despite readiness issues");
                }
            },
            None => {
                self.request_readiness_check(project).await;
                if self.settings.readiness_mode == ReadinessMode::Block {
                    outcome
                        .skipped
                        .push(SkipReason::new(project, "readiness unknown, check queued"));
                    return;
                }
            }
        }

        let ready: Vec<Bead> = self
            .lock_state(|state| state.ready_beads(project).into_iter().cloned().collect());

        for bead in ready {
            // Cancellation point: committed claims stand, no new ones start.
            if self.is_stopping() {
                outcome.skipped.push(SkipReason::new(bead.id.as_str(), "shutting down"));
                break;
            }

            // Loop guard: escalate once, then leave the bead alone.
            if bead.loop_detected() && !bead.escalated() {
                outcome.skipped.push(SkipReason::new(bead.id.as_str(), "loop detected, escalated"));
                if let Err(e) = self.escalate_to_ceo(bead.id.as_str(), "loop detected", None) {
                    tracing::error!(bead = %bead.id, error = %e, "loop escalation failed");
                }
                continue;
            }

            // Hop guard: too many reassignments means a human decides next.
            if bead.redispatch_count() >= self.settings.max_hops && !bead.escalated() {
                outcome.skipped.push(SkipReason::new(
                    bead.id.as_str(),
                    format!("max hops ({}) reached, escalated", self.settings.max_hops),
                ));
                let returned_to = bead.returned_to().map(|a| a.as_str().to_string());
                if let Err(e) = self.escalate_to_ceo(
                    bead.id.as_str(),
                    "redispatch limit reached",
                    returned_to.as_deref(),
                ) {
                    tracing::error!(bead = %bead.id, error = %e, "hop escalation failed");
                }
                continue;
            }

            let candidates = self.eligible_agents(&bead);
            if candidates.is_empty() {
                outcome.skipped.push(SkipReason::new(bead.id.as_str(), "no eligible agent"));
                continue;
            }

            let mut claimed = false;
            for agent in &candidates {
                match self.claim_bead(bead.id.as_str(), agent.id.as_str()) {
                    Ok(()) => {
                        tracing::info!(bead = %bead.id, agent = %agent.id, "dispatched");
                        outcome.dispatched += 1;
                        claimed = true;
                        break;
                    }
                    Err(e) if e.is_conflict() => {
                        // Lost the race for this agent/bead pairing; try the
                        // next candidate.
                        continue;
                    }
                    Err(e) => {
                        tracing::error!(bead = %bead.id, agent = %agent.id, error = %e, "claim failed");
                        break;
                    }
                }
            }
            if !claimed && !candidates.is_empty() {
                outcome.skipped.push(SkipReason::new(bead.id.as_str(), "claim conflict"));
            }
        }
    }

    /// Idle, provider-attached, healthy-provider agents eligible for a
    /// bead, best candidate first.
    ///
    /// Pinned beads (`context.returned_to`) accept only that agent. Role
    /// matching comes from the config role map; unmapped kinds accept any
    /// role. Tiebreak: fewest in-flight assignments, then longest idle,
    /// then id.
    fn eligible_agents(&self, bead: &Bead) -> Vec<Agent> {
        self.lock_state(|state| {
            let required_role = self.settings.role_map.get(&bead.kind.to_string());
            let pinned = bead.returned_to();

            let mut candidates: Vec<(usize, u64, Agent)> = state
                .agents_for_project(&bead.project)
                .into_iter()
                .filter(|agent| agent.is_dispatchable())
                .filter(|agent| {
                    agent
                        .provider
                        .as_ref()
                        .and_then(|p| state.providers.get(p.as_str()))
                        .map(|p| p.is_healthy())
                        .unwrap_or(false)
                })
                .filter(|agent| match &pinned {
                    Some(pinned) => agent.id == *pinned,
                    None => required_role
                        .map(|role| agent.role == *role)
                        .unwrap_or(true),
                })
                .map(|agent| {
                    (state.in_flight_count(agent.id.as_str()), agent.last_active_ms, agent.clone())
                })
                .collect();

            candidates.sort_by(|a, b| {
                a.0.cmp(&b.0)
                    .then(a.1.cmp(&b.1))
                    .then(a.2.id.as_str().cmp(b.2.id.as_str()))
            });
            candidates.into_iter().map(|(_, _, agent)| agent).collect()
        })
    }

    /// Fresh cache entry for a project, if any.
    fn cached_readiness(&self, project: &str) -> Option<braid_core::Readiness> {
        let now = self.now_ms();
        self.lock_state(|state| {
            state.readiness.get(project).filter(|r| r.fresh(now)).cloned()
        })
    }

    async fn request_readiness_check(&self, project: &str) {
        let Some(effect) = self.readiness_check_effect(project) else {
            return;
        };
        if let Err(e) = self.executor.execute(effect).await {
            tracing::warn!(project, error = %e, "failed to queue readiness check");
        }
    }

    /// Reschedule the periodic tick (called by the timer handler).
    pub(crate) async fn reschedule_dispatch(&self) -> Result<(), RuntimeError> {
        self.executor
            .execute(Effect::SetTimer {
                id: TimerId::dispatch(),
                duration: self.settings.dispatch_interval,
            })
            .await?;
        Ok(())
    }
}
