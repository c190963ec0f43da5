// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor
//!
//! All side effects funnel through here. Long-running activities
//! (provider probes, chat completions, readiness checks) run as
//! background tasks that complete by committing and publishing an event.

use crate::event_bus::EventBus;
use crate::notify::NotifyAdapter;
use braid_config::ModelCatalog;
use braid_core::{Clock, Effect, Event, HeartbeatOutcome, QueryOutcome};
use braid_providers::{ChatMessage, ChatRequest, ProviderApi};
use braid_storage::{Store, WalError};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

use super::scheduler::Scheduler;

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("storage error: {0}")]
    Storage(#[from] WalError),
}

/// Commit-then-publish handle handed to background activities.
#[derive(Clone)]
pub struct EventSink {
    store: Arc<Store>,
    bus: EventBus,
}

impl EventSink {
    pub fn new(store: Arc<Store>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Commit the event durably, then publish it to the bus.
    ///
    /// Publishing is best effort; commit failures are real errors.
    pub fn emit(&self, event: &Event) -> Result<(), WalError> {
        self.store.commit(event)?;
        let _ = self.bus.publish(event.clone());
        Ok(())
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

/// Executes effects using the configured adapters
pub struct Executor<C: Clock> {
    api: Arc<dyn ProviderApi>,
    notifier: Arc<dyn NotifyAdapter>,
    sink: EventSink,
    scheduler: Arc<Mutex<Scheduler>>,
    clock: C,
    catalog: ModelCatalog,
}

impl<C: Clock> Executor<C> {
    pub fn new(
        api: Arc<dyn ProviderApi>,
        notifier: Arc<dyn NotifyAdapter>,
        sink: EventSink,
        scheduler: Arc<Mutex<Scheduler>>,
        clock: C,
        catalog: ModelCatalog,
    ) -> Self {
        Self { api, notifier, sink, scheduler, clock, catalog }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        Arc::clone(&self.scheduler)
    }

    pub fn api(&self) -> Arc<dyn ProviderApi> {
        Arc::clone(&self.api)
    }

    /// Execute a single effect with tracing
    pub async fn execute(&self, effect: Effect) -> Result<(), ExecuteError> {
        let info: String =
            effect.fields().iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ");
        let op = effect.name();
        let verbose = effect.verbose();
        if verbose {
            tracing::info!("executing effect={} {}", op, info);
        }

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) if verbose => tracing::info!(elapsed_ms, "completed effect={}", op),
            Ok(()) => {}
            Err(e) => tracing::error!(error = %e, elapsed_ms, "error effect={} {}", op, info),
        }
        result
    }

    /// Execute multiple effects in order
    pub async fn execute_all(&self, effects: Vec<Effect>) -> Result<(), ExecuteError> {
        for effect in effects {
            self.execute(effect).await?;
        }
        Ok(())
    }

    async fn execute_inner(&self, effect: Effect) -> Result<(), ExecuteError> {
        match effect {
            Effect::Emit { event } => {
                self.sink.emit(&event)?;
                Ok(())
            }

            Effect::SetTimer { id, duration } => {
                let now = Clock::now(&self.clock);
                self.scheduler.lock().set_timer(id.as_str().to_string(), duration, now);
                Ok(())
            }

            Effect::CancelTimer { id } => {
                self.scheduler.lock().cancel_timer(id.as_str());
                Ok(())
            }

            Effect::ProbeProvider { id, endpoint, kind, configured_model } => {
                let api = Arc::clone(&self.api);
                let sink = self.sink.clone();
                let catalog = self.catalog.clone();
                let clock = self.clock.clone();
                tokio::spawn(async move {
                    let result = braid_providers::probe(
                        api.as_ref(),
                        &endpoint,
                        &kind,
                        configured_model.as_deref(),
                        &catalog,
                    )
                    .await;
                    let outcome = match result {
                        Ok(success) => HeartbeatOutcome::Healthy {
                            latency_ms: success.latency_ms,
                            model: success.model,
                            score: success.score,
                            context_window: success.context_window,
                        },
                        Err(error) => HeartbeatOutcome::Unhealthy { error },
                    };
                    let event =
                        Event::ProviderHeartbeat { id, outcome, at_ms: clock.epoch_ms() };
                    if let Err(e) = sink.emit(&event) {
                        tracing::error!(error = %e, "failed to record heartbeat");
                    }
                });
                Ok(())
            }

            Effect::QueryProvider {
                id,
                provider,
                endpoint,
                model,
                system,
                message,
                temperature,
                max_tokens,
            } => {
                let api = Arc::clone(&self.api);
                let sink = self.sink.clone();
                tokio::spawn(async move {
                    let mut messages = Vec::new();
                    if let Some(system) = system {
                        messages.push(ChatMessage::system(system));
                    }
                    messages.push(ChatMessage::user(message));
                    let request = ChatRequest { model, messages, temperature, max_tokens };

                    let start = std::time::Instant::now();
                    let mut outcome = None;
                    for attempt in 0..=crate::env::QUERY_RETRIES {
                        match api.chat(&endpoint, &request).await {
                            Ok(response) => {
                                outcome = Some(QueryOutcome::Ok {
                                    response: response.content,
                                    model: response.model,
                                    tokens: response.tokens,
                                    latency_ms: start.elapsed().as_millis() as u64,
                                });
                                break;
                            }
                            Err(e) => {
                                tracing::warn!(
                                    provider = %provider,
                                    attempt,
                                    error = %e,
                                    "provider query attempt failed"
                                );
                                outcome = Some(QueryOutcome::Err { error: e.to_string() });
                            }
                        }
                    }
                    let outcome = outcome.unwrap_or(QueryOutcome::Err {
                        error: "no attempts executed".to_string(),
                    });
                    let event = Event::QueryCompleted { id, outcome };
                    if let Err(e) = sink.emit(&event) {
                        tracing::error!(error = %e, "failed to record query completion");
                    }
                });
                Ok(())
            }

            Effect::CheckReadiness { project, source_url, auth, bead_store, key_dir } => {
                let sink = self.sink.clone();
                let clock = self.clock.clone();
                tokio::spawn(async move {
                    let result = super::readiness::probe_project(
                        source_url.as_deref(),
                        auth,
                        &bead_store,
                        &key_dir,
                        &project,
                    )
                    .await;
                    let event = Event::ProjectReadiness {
                        id: project,
                        ready: result.ready,
                        issues: result.issues,
                        checked_at_ms: clock.epoch_ms(),
                        public_key: result.public_key,
                    };
                    if let Err(e) = sink.emit(&event) {
                        tracing::error!(error = %e, "failed to record readiness");
                    }
                });
                Ok(())
            }

            Effect::MirrorBeads { project } => {
                let (dir, beads) = {
                    let state = self.sink.store().lock_state();
                    let Some(proj) = state.projects.get(&project) else {
                        return Ok(());
                    };
                    let beads: Vec<braid_core::Bead> = state
                        .beads_for_project(&project)
                        .into_iter()
                        .cloned()
                        .collect();
                    (proj.bead_store_dir(), beads)
                };
                let refs: Vec<&braid_core::Bead> = beads.iter().collect();
                if let Err(e) = braid_storage::write_bead_store(&dir, &refs) {
                    tracing::warn!(project = %project, error = %e, "bead store mirror failed");
                }
                Ok(())
            }

            Effect::Notify { title, message } => {
                let notifier = Arc::clone(&self.notifier);
                tokio::spawn(async move {
                    if let Err(e) = notifier.notify(&title, &message).await {
                        tracing::warn!(%title, error = %e, "notification send failed");
                    }
                });
                Ok(())
            }
        }
    }
}
