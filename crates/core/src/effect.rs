// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the system needs to perform

use crate::event::Event;
use crate::project::AuthMethod;
use crate::provider::{ProviderId, QueryId};
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Effects that need to be executed by the runtime
///
/// All external I/O lives here: workflow logic stays replay-safe by only
/// producing effects, never performing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Event emission ===
    /// Commit and publish an event
    Emit { event: Event },

    // === Timer effects ===
    /// Set a timer
    SetTimer {
        id: TimerId,
        #[serde(with = "duration_serde")]
        duration: Duration,
    },

    /// Cancel a timer
    CancelTimer { id: TimerId },

    // === Provider effects ===
    /// Probe a provider's candidate endpoints and negotiate a model.
    /// Completes by emitting `provider:heartbeat`.
    ProbeProvider {
        id: ProviderId,
        endpoint: String,
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        configured_model: Option<String>,
    },

    /// Execute one chat completion against a provider.
    /// Completes by emitting `query:completed`.
    QueryProvider {
        id: QueryId,
        provider: ProviderId,
        endpoint: String,
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        system: Option<String>,
        message: String,
        temperature: f32,
        max_tokens: u32,
    },

    // === Project effects ===
    /// Run the readiness probe for a project.
    /// Completes by emitting `project:readiness`.
    CheckReadiness {
        project: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_url: Option<String>,
        auth: AuthMethod,
        bead_store: PathBuf,
        key_dir: PathBuf,
    },

    /// Rewrite the project's on-disk bead store mirror.
    MirrorBeads { project: String },

    // === Notification effects ===
    /// Send a desktop notification
    Notify { title: String, message: String },
}

impl Effect {
    /// Effect name for log spans (e.g., "probe_provider", "emit")
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit { .. } => "emit",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::ProbeProvider { .. } => "probe_provider",
            Effect::QueryProvider { .. } => "query_provider",
            Effect::CheckReadiness { .. } => "check_readiness",
            Effect::MirrorBeads { .. } => "mirror_beads",
            Effect::Notify { .. } => "notify",
        }
    }

    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit { event } => vec![("event", event.log_summary())],
            Effect::SetTimer { id, duration } => vec![
                ("timer_id", id.to_string()),
                ("duration_ms", duration.as_millis().to_string()),
            ],
            Effect::CancelTimer { id } => vec![("timer_id", id.to_string())],
            Effect::ProbeProvider { id, endpoint, .. } => {
                vec![("provider", id.to_string()), ("endpoint", endpoint.clone())]
            }
            Effect::QueryProvider { id, provider, model, .. } => vec![
                ("query", id.to_string()),
                ("provider", provider.to_string()),
                ("model", model.clone()),
            ],
            Effect::CheckReadiness { project, .. } => vec![("project", project.clone())],
            Effect::MirrorBeads { project } => vec![("project", project.clone())],
            Effect::Notify { title, .. } => vec![("title", title.clone())],
        }
    }

    /// Whether to show both 'started' and 'completed' or just 'executed',
    /// to control the verbosity for frequent effects.
    pub fn verbose(&self) -> bool {
        match self {
            Effect::Emit { .. } => false,
            Effect::SetTimer { .. } => false,
            Effect::CancelTimer { .. } => false,
            Effect::ProbeProvider { .. } => false,
            _ => true,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        duration.as_millis().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
