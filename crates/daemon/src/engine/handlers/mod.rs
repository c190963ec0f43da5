// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event handling for the runtime

mod lifecycle;
mod timer;

use super::{Runtime, RuntimeError};
use braid_core::{Clock, Effect, Event, TimerId};

impl<C: Clock> Runtime<C> {
    /// React to a committed event.
    ///
    /// State mutation already happened at commit; handlers only schedule
    /// timers, fire activities, mirror files, and notify. That keeps bus
    /// loss a latency problem, never a consistency problem.
    pub async fn handle_event(&self, event: &Event) -> Result<(), RuntimeError> {
        match event {
            Event::TimerFired { id } => {
                self.handle_timer(id).await?;
            }

            Event::DecisionCreated { id, question, project, .. } => {
                self.executor
                    .execute_all(vec![
                        Effect::SetTimer {
                            id: TimerId::decision_timeout(id),
                            duration: self.settings.decision_timeout,
                        },
                        Effect::Notify {
                            title: format!("Decision needed in {project}"),
                            message: question.clone(),
                        },
                        Effect::MirrorBeads { project: project.clone() },
                    ])
                    .await?;
            }

            Event::DecisionResolved { id, .. } | Event::DecisionTimedOut { id, .. } => {
                let mut effects =
                    vec![Effect::CancelTimer { id: TimerId::decision_timeout(id) }];
                if let Some(project) =
                    self.lock_state(|state| state.beads.get(id.as_str()).map(|b| b.project.clone()))
                {
                    effects.push(Effect::MirrorBeads { project });
                }
                self.executor.execute_all(effects).await?;
            }

            Event::BeadCreated { .. }
            | Event::BeadUpdated { .. }
            | Event::BeadStatusChanged { .. }
            | Event::BeadAssigned { .. }
            | Event::BeadClaimed { .. }
            | Event::BeadCompleted { .. }
            | Event::BeadDepAdded { .. }
            | Event::BeadDepRemoved { .. } => {
                if let Some(project) = self.event_bead_project(event) {
                    self.executor.execute(Effect::MirrorBeads { project }).await?;
                }
            }

            Event::ProviderRegistered { id, .. } | Event::ProviderUpdated { id, .. } => {
                // Registry refresh + an immediate beat happen in the
                // manager for direct calls; replayed/config paths land here.
                if let Some(provider) =
                    self.lock_state(|state| state.providers.get(id.as_str()).cloned())
                {
                    self.registry.upsert(provider);
                }
                self.executor
                    .execute(Effect::SetTimer {
                        id: TimerId::provider_beat(id),
                        duration: std::time::Duration::ZERO,
                    })
                    .await?;
            }

            Event::ProviderDeleted { id } => {
                self.registry.remove(id);
                self.executor
                    .execute(Effect::CancelTimer { id: TimerId::provider_beat(id) })
                    .await?;
            }

            Event::ProviderHeartbeat { id, .. } => {
                self.handle_heartbeat(id).await?;
            }

            Event::ProjectReadiness { id, ready, issues, public_key, .. } => {
                if !ready {
                    self.file_readiness_bead(id, issues, public_key.as_deref())?;
                }
            }

            Event::AgentStopped { .. }
            | Event::AgentSpawned { .. }
            | Event::AgentAttached { .. }
            | Event::AgentStatusChanged { .. } => {
                // State transitions applied at commit; the generic
                // dispatch wake below picks up freed capacity.
            }

            // No-op: state mutations handled at commit, telemetry only
            Event::ProjectRegistered { .. }
            | Event::BeadUnblocked { .. }
            | Event::DecisionClaimed { .. }
            | Event::MotivationRegistered { .. }
            | Event::MotivationTriggered { .. }
            | Event::QueryCompleted { .. }
            | Event::DispatchTick { .. }
            | Event::Shutdown
            | Event::Custom => {}
        }

        Ok(())
    }

    /// Project owning the bead an event touches, for the mirror effect.
    fn event_bead_project(&self, event: &Event) -> Option<String> {
        let bead_id = match event {
            Event::BeadCreated { id, .. }
            | Event::BeadUpdated { id, .. }
            | Event::BeadStatusChanged { id, .. }
            | Event::BeadAssigned { id, .. }
            | Event::BeadClaimed { id, .. }
            | Event::BeadCompleted { id, .. }
            | Event::BeadDepAdded { from: id, .. }
            | Event::BeadDepRemoved { from: id, .. } => id.clone(),
            _ => return None,
        };
        self.lock_state(|state| state.beads.get(bead_id.as_str()).map(|b| b.project.clone()))
    }
}
