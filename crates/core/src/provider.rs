// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LLM provider records: endpoint, health, and model selection state.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a provider.
    pub struct ProviderId("prv-");
}

crate::define_id! {
    /// Unique identifier for an ephemeral provider query.
    pub struct QueryId("qry-");
}

/// Provider health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Registered but not yet probed.
    #[default]
    Pending,
    Healthy,
    Unhealthy,
    /// Three consecutive heartbeat failures. Excluded from scoring.
    Failed,
}

crate::simple_display! {
    ProviderStatus {
        Pending => "pending",
        Healthy => "healthy",
        Unhealthy => "unhealthy",
        Failed => "failed",
    }
}

impl ProviderStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProviderStatus::Healthy)
    }
}

/// Consecutive heartbeat failures before a provider is marked failed.
pub const FAILURES_TO_FAILED: u32 = 3;

/// How providers are ranked during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    Balanced,
    LatencyFirst,
    QualityFirst,
    CostFirst,
}

crate::simple_display! {
    SelectionPolicy {
        Balanced => "balanced",
        LatencyFirst => "latency_first",
        QualityFirst => "quality_first",
        CostFirst => "cost_first",
    }
}

/// An LLM endpoint with discovery, heartbeat, and selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    /// Provider type (e.g. "openai", "ollama"). Non-v1 kinds skip the `/v1`
    /// endpoint normalization.
    pub kind: String,
    pub endpoint: String,
    /// Operator-pinned model; used verbatim when the endpoint serves it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_model: Option<String>,
    /// Model chosen by negotiation. `healthy ⇒ selected_model ≠ ∅`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,
    #[serde(default)]
    pub selected_model_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    #[serde(default)]
    pub status: ProviderStatus,
    #[serde(default)]
    pub consecutive_failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default)]
    pub registered_at_ms: u64,
}

impl Provider {
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Whether the last heartbeat is recent enough to trust the status.
    pub fn heartbeat_fresh(&self, now_ms: u64, interval_ms: u64) -> bool {
        match self.last_heartbeat_ms {
            Some(at) => now_ms.saturating_sub(at) < interval_ms.saturating_mul(3),
            None => false,
        }
    }
}

crate::builder! {
    pub struct ProviderBuilder => Provider {
        into {
            name: String = "local",
            kind: String = "openai",
            endpoint: String = "http://localhost:8000",
        }
        set {
            status: ProviderStatus = ProviderStatus::Pending,
            consecutive_failures: u32 = 0,
            selected_model_score: u32 = 0,
            registered_at_ms: u64 = 1_000_000,
        }
        option {
            configured_model: String = None,
            selected_model: String = None,
            context_window: u32 = None,
            last_heartbeat_ms: u64 = None,
            last_latency_ms: u64 = None,
            last_error: String = None,
        }
        computed {
            id: ProviderId = ProviderId::new(),
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
