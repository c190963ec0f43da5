// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The heartbeat probe: candidate walk, model discovery, negotiation.

use crate::api::{ModelInfo, ProviderApi};
use crate::endpoints::candidate_endpoints;
use braid_config::ModelCatalog;
use std::time::Instant;

/// A successful probe: where the provider answered and what it serves.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSuccess {
    /// The candidate that answered; callers pin subsequent traffic to it.
    pub endpoint: String,
    pub latency_ms: u64,
    pub model: String,
    pub score: u32,
    pub context_window: Option<u32>,
}

/// Pick the model to run on a provider.
///
/// The configured model wins verbatim when
/// the endpoint serves it, else the highest-scoring catalog match, else
/// the first available, else fall back to the configured model untested.
pub fn choose_model(
    configured: Option<&str>,
    available: &[ModelInfo],
    catalog: &ModelCatalog,
) -> Option<(String, u32)> {
    if let Some(configured) = configured {
        if available.iter().any(|m| m.id == configured) {
            return Some((configured.to_string(), catalog.score(configured)));
        }
    }

    let names: Vec<String> = available.iter().map(|m| m.id.clone()).collect();
    if let Some(best) = catalog.best(&names) {
        return Some((best.to_string(), catalog.score(best)));
    }

    if let Some(first) = available.first() {
        return Some((first.id.clone(), catalog.score(&first.id)));
    }

    configured.map(|c| (c.to_string(), catalog.score(c)))
}

/// Probe a provider: walk the candidate endpoints, list models on the
/// first that answers, and negotiate a model.
///
/// Returns `Err` with the last error when no candidate is reachable —
/// callers persist nothing partial in that case.
pub async fn probe(
    api: &dyn ProviderApi,
    endpoint: &str,
    kind: &str,
    configured_model: Option<&str>,
    catalog: &ModelCatalog,
) -> Result<ProbeSuccess, String> {
    let mut last_error = "no candidate endpoints".to_string();

    for candidate in candidate_endpoints(endpoint, kind) {
        let start = Instant::now();
        match api.list_models(&candidate).await {
            Ok(models) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                let Some((model, score)) = choose_model(configured_model, &models, catalog) else {
                    last_error = format!("{candidate}: no models available");
                    continue;
                };
                let context_window = models
                    .iter()
                    .find(|m| m.id == model)
                    .and_then(|m| m.context_window)
                    .or_else(|| catalog.context_window(&model));
                return Ok(ProbeSuccess { endpoint: candidate, latency_ms, model, score, context_window });
            }
            Err(e) => {
                tracing::debug!(candidate = %candidate, error = %e, "heartbeat candidate failed");
                last_error = format!("{candidate}: {e}");
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
