// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider manager: registration, heartbeat handling, negotiation.

use super::{Runtime, RuntimeError};
use braid_core::{Clock, Effect, Event, Provider, ProviderId, TimerId};
use std::time::Duration;

/// Arguments for registering a provider.
pub struct RegisterProvider {
    pub id: Option<ProviderId>,
    pub name: Option<String>,
    pub kind: String,
    pub endpoint: String,
    pub configured_model: Option<String>,
}

impl<C: Clock> Runtime<C> {
    /// Register a provider: persist, mirror to the registry, then kick an
    /// immediate out-of-band health check.
    pub async fn register_provider(
        &self,
        params: RegisterProvider,
    ) -> Result<Provider, RuntimeError> {
        let id = params.id.unwrap_or_default();
        let now = self.now_ms();
        let event = Event::ProviderRegistered {
            id,
            name: params.name.unwrap_or_else(|| id.as_str().to_string()),
            kind: params.kind,
            endpoint: params.endpoint,
            configured_model: params.configured_model,
            registered_at_ms: now,
        };
        self.emit(event)?;

        let provider = self
            .lock_state(|state| state.providers.get(id.as_str()).cloned())
            .ok_or_else(|| RuntimeError::ProviderNotFound(id.as_str().to_string()))?;
        self.registry.upsert(provider.clone());

        // Immediate first beat; the handler reschedules at the interval.
        self.executor
            .execute(Effect::SetTimer {
                id: TimerId::provider_beat(&id),
                duration: Duration::ZERO,
            })
            .await?;
        Ok(provider)
    }

    pub async fn update_provider(
        &self,
        id: &str,
        name: Option<String>,
        endpoint: Option<String>,
        configured_model: Option<String>,
    ) -> Result<Provider, RuntimeError> {
        let provider_id = self
            .lock_state(|state| state.get_provider(id).map(|p| p.id))
            .ok_or_else(|| RuntimeError::ProviderNotFound(id.to_string()))?;

        self.emit(Event::ProviderUpdated { id: provider_id, name, endpoint, configured_model })?;

        let provider = self
            .lock_state(|state| state.providers.get(provider_id.as_str()).cloned())
            .ok_or_else(|| RuntimeError::ProviderNotFound(id.to_string()))?;
        self.registry.upsert(provider.clone());

        // Re-check straight away; an endpoint change reset health to pending.
        self.executor
            .execute(Effect::SetTimer {
                id: TimerId::provider_beat(&provider_id),
                duration: Duration::ZERO,
            })
            .await?;
        Ok(provider)
    }

    pub async fn delete_provider(&self, id: &str) -> Result<(), RuntimeError> {
        let provider_id = self
            .lock_state(|state| state.get_provider(id).map(|p| p.id))
            .ok_or_else(|| RuntimeError::ProviderNotFound(id.to_string()))?;

        self.emit(Event::ProviderDeleted { id: provider_id })?;
        self.registry.remove(&provider_id);
        self.executor
            .execute(Effect::CancelTimer { id: TimerId::provider_beat(&provider_id) })
            .await?;
        Ok(())
    }

    /// Fire the heartbeat activity for a provider, if it still exists.
    pub(crate) async fn probe_provider(&self, id: &str) -> Result<(), RuntimeError> {
        let provider = self.lock_state(|state| state.providers.get(id).cloned());
        let Some(provider) = provider else {
            // Deleted since the timer was set; let it lapse.
            return Ok(());
        };
        self.executor
            .execute(Effect::ProbeProvider {
                id: provider.id,
                endpoint: provider.endpoint.clone(),
                kind: provider.kind.clone(),
                configured_model: provider.configured_model.clone(),
            })
            .await?;
        Ok(())
    }

    /// Re-run model negotiation now (operator request).
    pub async fn negotiate_model(&self, id: &str) -> Result<(), RuntimeError> {
        let exists = self.lock_state(|state| state.get_provider(id).map(|p| p.id));
        let Some(provider_id) = exists else {
            return Err(RuntimeError::ProviderNotFound(id.to_string()));
        };
        self.probe_provider(provider_id.as_str()).await
    }

    /// React to a committed heartbeat: refresh the registry, reschedule
    /// the beat, and wake the dispatcher when capacity appeared.
    pub(crate) async fn handle_heartbeat(&self, id: &ProviderId) -> Result<(), RuntimeError> {
        let provider = self.lock_state(|state| state.providers.get(id.as_str()).cloned());
        let Some(provider) = provider else {
            return Ok(());
        };
        let healthy = provider.is_healthy();
        self.registry.upsert(provider);

        self.executor
            .execute(Effect::SetTimer {
                id: TimerId::provider_beat(id),
                duration: self.settings.provider_beat,
            })
            .await?;

        if healthy {
            // Attachment already happened in the applier; give the newly
            // idle agents work.
            self.request_dispatch();
        }
        Ok(())
    }
}
