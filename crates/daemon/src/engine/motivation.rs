// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Motivation sweep, driven by the master heartbeat.
//!
//! Calendar and Idle kinds evaluate here; Event/External/Threshold are
//! recorded but evaluated by external collaborators. Cooldowns are global
//! and a per-tick storm cap bounds trigger bursts.

use super::{Runtime, RuntimeError};
use braid_core::{BeadStatus, Clock, Event, Motivation, MotivationKind};

impl<C: Clock> Runtime<C> {
    /// Evaluate motivations; fire at most `storm_cap` this tick.
    pub(crate) fn sweep_motivations(&self) -> Result<u32, RuntimeError> {
        let now = self.now_ms();
        let due: Vec<Motivation> = self.lock_state(|state| {
            let mut due: Vec<Motivation> = state
                .motivations
                .values()
                .filter(|m| m.enabled && m.cooled_down(now))
                .filter(|m| self.motivation_due(state, m, now))
                .cloned()
                .collect();
            due.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
            due
        });

        let mut fired = 0;
        for motivation in due {
            if fired >= self.settings.motivation_storm_cap {
                tracing::warn!(cap = fired, "motivation storm cap reached this tick");
                break;
            }
            tracing::info!(motivation = %motivation.id, kind = %motivation.kind, "motivation fired");
            self.emit(Event::MotivationTriggered { id: motivation.id, at_ms: now })?;
            fired += 1;
        }
        if fired > 0 {
            self.request_dispatch();
        }
        Ok(fired)
    }

    fn motivation_due(
        &self,
        state: &braid_storage::MaterializedState,
        motivation: &Motivation,
        now: u64,
    ) -> bool {
        match motivation.kind {
            MotivationKind::Calendar => {
                let Some(interval) = motivation.interval_ms() else {
                    return false;
                };
                match motivation.last_triggered_ms {
                    Some(last) => now.saturating_sub(last) >= interval,
                    None => true,
                }
            }
            MotivationKind::Idle => {
                let Some(project) = motivation.project.as_deref() else {
                    return false;
                };
                let has_idle_agent = state
                    .agents_for_project(project)
                    .iter()
                    .any(|a| a.status == braid_core::AgentStatus::Idle);
                let has_inflight = state
                    .beads_for_project(project)
                    .iter()
                    .any(|b| b.status == BeadStatus::InProgress);
                has_idle_agent && !has_inflight
            }
            // Evaluated externally; never fired from the sweep.
            MotivationKind::Event | MotivationKind::External | MotivationKind::Threshold => false,
        }
    }
}
