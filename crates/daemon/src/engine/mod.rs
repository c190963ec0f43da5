// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The braid execution engine.
//!
//! One event loop consumes the bus: each event is already committed
//! (WAL + state + mirrors) by whoever published it; the loop runs the
//! handlers, executes their effects, and coalesces dispatcher wakes.

mod agents;
mod beads;
mod decisions;
mod dispatch;
mod error;
mod executor;
mod handlers;
mod motivation;
mod providers;
mod readiness;
mod scheduler;
mod workflows;

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
#[path = "runtime_tests/mod.rs"]
mod runtime_tests;

pub use agents::SpawnAgent;
pub use beads::{BeadChanges, CreateBead};
pub use decisions::CreateDecision;
pub use dispatch::DispatchOutcome;
pub use error::RuntimeError;
pub use executor::{EventSink, ExecuteError, Executor};
pub use providers::RegisterProvider;
pub use scheduler::Scheduler;
pub use workflows::WorkflowId;

use crate::event_bus::EventBus;
use crate::notify::NotifyAdapter;
use braid_config::{Config, ModelCatalog, ReadinessMode};
use braid_core::{Clock, Event, SelectionPolicy};
use braid_providers::{ProviderApi, ProviderRegistry};
use braid_storage::{MaterializedState, Store};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Engine knobs distilled from the config document.
#[derive(Clone)]
pub struct RuntimeSettings {
    pub dispatch_interval: Duration,
    pub max_hops: u32,
    pub readiness_mode: ReadinessMode,
    /// Bead kind → required agent role.
    pub role_map: HashMap<String, String>,
    pub selection_policy: SelectionPolicy,
    pub provider_beat: Duration,
    pub master_beat: Duration,
    pub decision_timeout: Duration,
    pub motivation_storm_cap: u32,
    pub allowed_roles: Vec<String>,
    pub key_dir: PathBuf,
    pub catalog: ModelCatalog,
}

impl RuntimeSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dispatch_interval: config.dispatch_interval(),
            max_hops: config.dispatch.max_hops,
            readiness_mode: config.dispatch.readiness_mode,
            role_map: config.dispatch.role_map.clone(),
            selection_policy: config.dispatch.selection_policy,
            provider_beat: config.provider_beat(),
            master_beat: config.master_beat(),
            decision_timeout: config.decision_timeout(),
            motivation_storm_cap: config.workflow.motivation_storm_cap,
            allowed_roles: config.agents.allowed_roles.clone(),
            key_dir: config.git.key_dir.clone(),
            catalog: config.catalog(),
        }
    }
}

/// Dispatcher tick coalescing: at most one tick in flight, at most one
/// queued behind it.
#[derive(Default)]
struct DispatchGate {
    in_flight: bool,
    pending: bool,
}

/// Runtime that coordinates the system
pub struct Runtime<C: Clock> {
    pub executor: Executor<C>,
    pub(crate) settings: RuntimeSettings,
    pub(crate) store: Arc<Store>,
    pub(crate) registry: Arc<ProviderRegistry>,
    dispatch_gate: Mutex<DispatchGate>,
    /// project → (issue-set fingerprint, filed-at ms); the 30-minute
    /// auto-file throttle. In-memory by design: a restart may re-file once.
    pub(crate) readiness_filed: Mutex<HashMap<String, (String, u64)>>,
    /// Set on shutdown; in-flight ticks stop claiming between beads.
    stopping: AtomicBool,
    started_at: Instant,
}

impl<C: Clock> Runtime<C> {
    pub fn new(
        store: Arc<Store>,
        registry: Arc<ProviderRegistry>,
        api: Arc<dyn ProviderApi>,
        notifier: Arc<dyn NotifyAdapter>,
        bus: EventBus,
        clock: C,
        settings: RuntimeSettings,
    ) -> Self {
        let sink = EventSink::new(Arc::clone(&store), bus);
        let started_at = clock.now();
        Self {
            executor: Executor::new(
                api,
                notifier,
                sink,
                Arc::new(Mutex::new(Scheduler::new())),
                clock,
                settings.catalog.clone(),
            ),
            settings,
            store,
            registry,
            dispatch_gate: Mutex::new(DispatchGate::default()),
            readiness_filed: Mutex::new(HashMap::new()),
            stopping: AtomicBool::new(false),
            started_at,
        }
    }

    /// Helper to read state under the lock
    pub(crate) fn lock_state<T>(&self, f: impl FnOnce(&MaterializedState) -> T) -> T {
        let state = self.store.lock_state();
        f(&state)
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.executor.clock().epoch_ms()
    }

    /// Commit and publish an event (the single mutation path).
    pub(crate) fn emit(&self, event: Event) -> Result<(), RuntimeError> {
        self.executor.sink().emit(&event)?;
        Ok(())
    }

    /// Claim the dispatch gate. Returns false when a tick is already in
    /// flight (the wake is remembered instead).
    pub(crate) fn begin_dispatch(&self) -> bool {
        let mut gate = self.dispatch_gate.lock();
        if gate.in_flight {
            gate.pending = true;
            return false;
        }
        gate.in_flight = true;
        gate.pending = false;
        true
    }

    /// Release the gate; true when a wake arrived mid-tick and the caller
    /// should run once more.
    pub(crate) fn end_dispatch(&self) -> bool {
        let mut gate = self.dispatch_gate.lock();
        gate.in_flight = false;
        std::mem::take(&mut gate.pending)
    }

    pub(crate) fn request_dispatch(&self) {
        self.dispatch_gate.lock().pending = true;
    }

    pub(crate) fn dispatch_requested(&self) -> bool {
        let gate = self.dispatch_gate.lock();
        gate.pending && !gate.in_flight
    }

    /// Begin graceful shutdown: no new claims, in-flight work finishes.
    pub fn stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Seconds since the runtime was constructed.
    pub fn uptime_secs(&self) -> u64 {
        self.executor.clock().now().saturating_duration_since(self.started_at).as_secs()
    }
}

/// The engine loop: consumes bus events, fires due timers, coalesces
/// dispatch wakes, and checkpoints the store.
pub struct Engine<C: Clock> {
    runtime: Arc<Runtime<C>>,
    rx: mpsc::Receiver<Event>,
}

impl<C: Clock> Engine<C> {
    pub fn new(runtime: Arc<Runtime<C>>, rx: mpsc::Receiver<Event>) -> Self {
        Self { runtime, rx }
    }

    /// Run until a `system:shutdown` event or the bus closes.
    pub async fn run(mut self) {
        loop {
            let next_deadline = {
                let scheduler = self.runtime.executor.scheduler();
                let deadline = scheduler.lock().next_deadline();
                deadline
            };

            let event = match next_deadline {
                Some(deadline) => {
                    let now = braid_core::Clock::now(self.runtime.executor.clock());
                    let sleep = deadline.saturating_duration_since(now);
                    tokio::select! {
                        event = self.rx.recv() => match event {
                            Some(event) => Some(event),
                            None => break,
                        },
                        _ = tokio::time::sleep(sleep) => None,
                    }
                }
                None => match self.rx.recv().await {
                    Some(event) => Some(event),
                    None => break,
                },
            };

            match event {
                Some(Event::Shutdown) => {
                    tracing::info!("shutdown event received, draining engine");
                    break;
                }
                Some(event) => {
                    if let Err(e) = self.runtime.handle_event(&event).await {
                        tracing::error!(error = %e, event = event.type_tag(), "event handler failed");
                    }
                    // The dispatcher wakes on every event; the gate
                    // collapses storms into one tick.
                    self.runtime.request_dispatch();
                }
                None => {
                    let now = braid_core::Clock::now(self.runtime.executor.clock());
                    let due = {
                        let scheduler = self.runtime.executor.scheduler();
                        let mut scheduler = scheduler.lock();
                        scheduler.pop_due(now)
                    };
                    for id in due {
                        let fired = Event::TimerFired { id };
                        if let Err(e) = self.runtime.handle_event(&fired).await {
                            tracing::error!(error = %e, "timer handler failed");
                        }
                    }
                }
            }

            if self.runtime.dispatch_requested() {
                self.runtime.run_dispatch_cycle(None).await;
            }

            if self.runtime.store.checkpoint_due() {
                let now_ms = self.runtime.now_ms();
                if let Err(e) = self.runtime.store.checkpoint(now_ms) {
                    tracing::warn!(error = %e, "checkpoint failed");
                }
            }
        }
    }
}
