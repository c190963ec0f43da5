// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer event handling

use super::super::{Runtime, RuntimeError};
use braid_core::{Clock, Effect, TimerId, TimerKind};

impl<C: Clock> Runtime<C> {
    /// Route timer events to the appropriate handler
    pub(crate) async fn handle_timer(&self, id: &TimerId) -> Result<(), RuntimeError> {
        match TimerKind::parse(id.as_str()) {
            Some(TimerKind::Dispatch) => {
                self.run_dispatch_cycle(None).await;
                self.reschedule_dispatch().await
            }
            Some(TimerKind::MasterBeat) => self.handle_master_beat().await,
            Some(TimerKind::ProviderBeat { provider }) => {
                let provider = provider.to_string();
                self.probe_provider(&provider).await
            }
            Some(TimerKind::DecisionTimeout { decision }) => {
                let decision = decision.to_string();
                self.timeout_decision(&decision)
            }
            None => {
                tracing::warn!(timer = %id, "unrecognized timer fired");
                Ok(())
            }
        }
    }

    /// Master heartbeat: motivation sweep, then reschedule.
    async fn handle_master_beat(&self) -> Result<(), RuntimeError> {
        if let Err(e) = self.sweep_motivations() {
            tracing::error!(error = %e, "motivation sweep failed");
        }
        self.executor
            .execute(Effect::SetTimer {
                id: TimerId::master_beat(),
                duration: self.settings.master_beat,
            })
            .await?;
        Ok(())
    }
}
