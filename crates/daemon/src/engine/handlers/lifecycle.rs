// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup reconciliation.
//!
//! After replay, every timer is re-derived from materialized state and
//! the config document is folded in: declared projects, providers, and
//! motivations that are missing get registered. Timers are never
//! persisted, so this is what makes them restart-safe.

use super::super::{Runtime, RuntimeError};
use braid_config::Config;
use braid_core::{BeadStatus, Clock, Effect, Event, Motivation, MotivationId, TimerId};
use std::time::Duration;

impl<C: Clock> Runtime<C> {
    /// Boot-time reconciliation. Runs once, before the engine loop.
    pub async fn startup(&self, config: &Config) -> Result<(), RuntimeError> {
        self.register_config_projects(config)?;
        self.register_config_providers(config).await?;
        self.register_config_motivations(config)?;
        self.registry
            .rehydrate(self.lock_state(|state| state.providers.values().cloned().collect::<Vec<_>>()).iter());
        self.reconcile_timers().await?;
        tracing::info!("startup reconciliation complete");
        Ok(())
    }

    fn register_config_projects(&self, config: &Config) -> Result<(), RuntimeError> {
        for entry in &config.projects {
            let project = entry.to_project(&config.storage.state_dir);
            let known = self.lock_state(|state| {
                state.projects.get(&project.id).map(|p| p == &project).unwrap_or(false)
            });
            if known {
                continue;
            }
            self.emit(Event::ProjectRegistered {
                id: project.id.clone(),
                name: project.name.clone(),
                source_url: project.source_url.clone(),
                auth: project.auth,
                work_tree: project.work_tree.clone(),
                bead_path: project.bead_path.clone(),
                prefix: project.prefix.clone(),
                sticky: project.sticky,
                perpetual: project.perpetual,
            })?;
        }
        Ok(())
    }

    async fn register_config_providers(&self, config: &Config) -> Result<(), RuntimeError> {
        for entry in &config.providers {
            let exists =
                self.lock_state(|state| state.providers.contains_key(entry.id.as_str()));
            if exists {
                continue;
            }
            self.register_provider(super::super::RegisterProvider {
                // Config-declared providers keep their operator-chosen id.
                id: Some(braid_core::ProviderId::from_string(&entry.id)),
                name: entry.name.clone().or_else(|| Some(entry.id.clone())),
                kind: entry.kind.clone(),
                endpoint: entry.endpoint.clone(),
                configured_model: entry.model.clone(),
            })
            .await?;
        }
        Ok(())
    }

    fn register_config_motivations(&self, config: &Config) -> Result<(), RuntimeError> {
        for entry in &config.motivations {
            let id = MotivationId::from_string(format!("mtv-{}", entry.id));
            let known = self.lock_state(|state| state.motivations.contains_key(id.as_str()));
            if known {
                continue;
            }
            let motivation = Motivation {
                id: id.clone(),
                kind: entry.kind,
                condition: entry.condition.clone(),
                role: entry.role.clone(),
                agent: entry.agent.clone(),
                project: entry.project.clone(),
                params: entry.params.clone(),
                cooldown_ms: entry.cooldown_secs * 1000,
                last_triggered_ms: None,
                enabled: entry.enabled,
            };
            self.emit(Event::MotivationRegistered { id, motivation })?;
        }
        Ok(())
    }

    /// Re-derive every timer from materialized state.
    async fn reconcile_timers(&self) -> Result<(), RuntimeError> {
        let now = self.now_ms();
        let mut effects = vec![
            Effect::SetTimer {
                id: TimerId::dispatch(),
                duration: self.settings.dispatch_interval,
            },
            Effect::SetTimer { id: TimerId::master_beat(), duration: self.settings.master_beat },
        ];

        // Providers: immediate probe, then steady-state interval.
        let providers: Vec<braid_core::ProviderId> =
            self.lock_state(|state| state.providers.values().map(|p| p.id).collect());
        for id in providers {
            effects.push(Effect::SetTimer {
                id: TimerId::provider_beat(&id),
                duration: Duration::ZERO,
            });
        }

        // Open decisions: resume their 48-hour clocks with the remaining
        // budget (floor of one second so overdue ones fire promptly).
        let open_decisions: Vec<(braid_core::BeadId, u64)> = self.lock_state(|state| {
            state
                .beads
                .values()
                .filter(|b| b.is_decision() && b.status != BeadStatus::Closed)
                .map(|b| (b.id.clone(), b.created_at_ms))
                .collect()
        });
        let timeout_ms = self.settings.decision_timeout.as_millis() as u64;
        for (id, created_at_ms) in open_decisions {
            let elapsed = now.saturating_sub(created_at_ms);
            let remaining = timeout_ms.saturating_sub(elapsed).max(1000);
            effects.push(Effect::SetTimer {
                id: TimerId::decision_timeout(&id),
                duration: Duration::from_millis(remaining),
            });
        }

        self.executor.execute_all(effects).await?;
        Ok(())
    }
}
