// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory provider registry.
//!
//! A write-through view of the persisted provider set. Persistence is the
//! source of truth; the registry is rebuilt from it at boot and updated on
//! every provider event so readers never touch the store lock.

use braid_core::{Provider, ProviderId, SelectionPolicy};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records (boot order: after replay, before
    /// the event bus starts).
    pub fn rehydrate<'a>(&self, providers: impl IntoIterator<Item = &'a Provider>) {
        let mut map = self.providers.write();
        map.clear();
        for provider in providers {
            map.insert(provider.id.as_str().to_string(), provider.clone());
        }
    }

    pub fn upsert(&self, provider: Provider) {
        self.providers.write().insert(provider.id.as_str().to_string(), provider);
    }

    pub fn remove(&self, id: &ProviderId) {
        self.providers.write().remove(id.as_str());
    }

    pub fn get(&self, id: &ProviderId) -> Option<Provider> {
        self.providers.read().get(id.as_str()).cloned()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// Healthy providers only.
    pub fn list_active(&self) -> Vec<Provider> {
        let mut active: Vec<Provider> =
            self.providers.read().values().filter(|p| p.is_healthy()).cloned().collect();
        active.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        active
    }

    /// All providers, for status surfaces.
    pub fn list(&self) -> Vec<Provider> {
        let mut all: Vec<Provider> = self.providers.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        all
    }

    /// Best healthy provider under the policy.
    pub fn select(&self, policy: SelectionPolicy) -> Option<Provider> {
        let providers = self.providers.read();
        crate::selection::select(providers.values(), policy).cloned()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
