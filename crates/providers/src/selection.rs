// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider selection scoring.

use braid_core::{Provider, SelectionPolicy};

/// Latency assumed for a provider that has never reported one.
const UNKNOWN_LATENCY_MS: i64 = 120_000;

/// Score a provider under a policy. Higher wins. Only meaningful for
/// healthy providers; callers filter first.
pub fn score(provider: &Provider, policy: SelectionPolicy) -> i64 {
    let quality = provider.selected_model_score as i64;
    let latency = provider.last_latency_ms.map(|l| l as i64).unwrap_or(UNKNOWN_LATENCY_MS);
    match policy {
        SelectionPolicy::Balanced => quality * 1000 - latency,
        SelectionPolicy::LatencyFirst => -latency,
        SelectionPolicy::QualityFirst => quality * 1_000_000 - latency,
        // Without per-token pricing, smaller models stand in for cheaper:
        // invert quality and break ties on latency.
        SelectionPolicy::CostFirst => -(quality * 1000) - latency,
    }
}

/// Pick the best healthy provider under the policy.
///
/// The id tiebreak keeps selection deterministic when scores are equal.
pub fn select<'a, I>(providers: I, policy: SelectionPolicy) -> Option<&'a Provider>
where
    I: IntoIterator<Item = &'a Provider>,
{
    providers
        .into_iter()
        .filter(|p| p.is_healthy())
        .max_by(|a, b| {
            score(a, policy)
                .cmp(&score(b, policy))
                .then_with(|| b.id.as_str().cmp(a.id.as_str()))
        })
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
