// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for runtime tests.

use super::{Runtime, RuntimeSettings};
use crate::event_bus::EventBus;
use crate::notify::NoopNotifier;
use braid_config::Config;
use braid_core::test_support::*;
use braid_core::{Event, FakeClock};
use braid_providers::{FakeProviderApi, ProviderRegistry};
use braid_storage::Store;
use std::sync::Arc;
use tokio::sync::mpsc;

pub(crate) struct Harness {
    pub runtime: Arc<Runtime<FakeClock>>,
    pub clock: FakeClock,
    pub api: FakeProviderApi,
    pub bus: EventBus,
    /// Engine intake; tests drain it when they care about reactions.
    pub rx: mpsc::Receiver<Event>,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = Store::open(dir.path(), None).unwrap();
        let registry = Arc::new(ProviderRegistry::new());
        let (bus, rx) = EventBus::new(1000);
        let clock = FakeClock::new();
        let api = FakeProviderApi::new();

        let runtime = Arc::new(Runtime::new(
            Arc::new(store),
            registry,
            Arc::new(api.clone()),
            Arc::new(NoopNotifier),
            bus.clone(),
            clock.clone(),
            RuntimeSettings::from_config(&config),
        ));
        Self { runtime, clock, api, bus, rx, _dir: dir }
    }

    /// Commit an event directly (test setup shortcut).
    pub fn commit(&self, event: Event) {
        self.runtime.emit(event).unwrap();
    }

    /// A registered project named `id`.
    pub fn with_project(self, id: &str) -> Self {
        self.commit(project_registered(id));
        self
    }

    /// An idle agent attached to a healthy provider.
    pub fn with_ready_agent(self, agent: &str, project: &str, role: &str) -> Self {
        self.commit(agent_spawned(agent, project, role));
        self.ensure_provider();
        self
    }

    /// A healthy provider shared by the whole harness.
    pub fn ensure_provider(&self) {
        let present = self
            .runtime
            .lock_state(|state| state.providers.contains_key("prv-test"));
        if !present {
            self.commit(provider_registered("prv-test", "http://localhost:11434"));
        }
        self.commit(provider_healthy("prv-test", "llama3", 10));
        // Keep the in-memory registry mirrored with the state.
        if let Some(provider) =
            self.runtime.lock_state(|state| state.providers.get("prv-test").cloned())
        {
            self.runtime.registry.upsert(provider);
        }
    }

    pub fn bead_status(&self, id: &str) -> braid_core::BeadStatus {
        self.runtime
            .lock_state(|state| state.beads.get(id).map(|b| b.status))
            .unwrap()
    }

    pub fn bead(&self, id: &str) -> braid_core::Bead {
        self.runtime
            .lock_state(|state| state.beads.get(id).cloned())
            .unwrap()
    }

    pub fn agent(&self, id: &str) -> braid_core::Agent {
        self.runtime
            .lock_state(|state| state.agents.get(id).cloned())
            .unwrap()
    }

    /// The first decision bead in a project (escalations create them with
    /// generated ids).
    pub fn find_decision(&self, project: &str) -> Option<braid_core::Bead> {
        self.runtime.lock_state(|state| {
            let mut decisions: Vec<braid_core::Bead> = state
                .beads
                .values()
                .filter(|b| b.is_decision() && b.project == project)
                .cloned()
                .collect();
            decisions.sort_by(|a, b| a.id.cmp(&b.id));
            decisions.into_iter().next()
        })
    }

    pub fn scheduler_has(&self, timer: &str) -> bool {
        let scheduler = self.runtime.executor.scheduler();
        let has = scheduler.lock().contains(timer);
        has
    }
}
