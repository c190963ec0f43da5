// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use braid_core::{Provider, ProviderStatus};

fn provider(id: &str, quality: u32, latency: Option<u64>) -> Provider {
    let mut p = Provider::builder()
        .status(ProviderStatus::Healthy)
        .selected_model("m")
        .selected_model_score(quality)
        .build();
    p.id = braid_core::ProviderId::from_string(id);
    p.last_latency_ms = latency;
    p
}

#[test]
fn balanced_weighs_quality_against_latency() {
    let fast_weak = provider("prv-a", 3, Some(10));
    let slow_strong = provider("prv-b", 9, Some(400));
    // 3*1000-10 = 2990 vs 9*1000-400 = 8600
    assert!(score(&slow_strong, SelectionPolicy::Balanced) > score(&fast_weak, SelectionPolicy::Balanced));
}

#[test]
fn missing_latency_counts_as_two_minutes() {
    let unknown = provider("prv-a", 9, None);
    assert_eq!(score(&unknown, SelectionPolicy::Balanced), 9 * 1000 - 120_000);
}

#[test]
fn latency_first_ignores_quality() {
    let fast_weak = provider("prv-a", 1, Some(5));
    let slow_strong = provider("prv-b", 9, Some(300));
    let winner = select([&fast_weak, &slow_strong], SelectionPolicy::LatencyFirst);
    assert_eq!(winner.map(|p| p.id.as_str()), Some("prv-a"));
}

#[test]
fn quality_first_prefers_the_bigger_model() {
    let fast_weak = provider("prv-a", 1, Some(5));
    let slow_strong = provider("prv-b", 9, Some(300));
    let winner = select([&fast_weak, &slow_strong], SelectionPolicy::QualityFirst);
    assert_eq!(winner.map(|p| p.id.as_str()), Some("prv-b"));
}

#[test]
fn unhealthy_providers_are_skipped() {
    let mut down = provider("prv-a", 9, Some(1));
    down.status = ProviderStatus::Unhealthy;
    let up = provider("prv-b", 1, Some(500));

    let winner = select([&down, &up], SelectionPolicy::Balanced);
    assert_eq!(winner.map(|p| p.id.as_str()), Some("prv-b"));
}

#[test]
fn equal_scores_pick_lowest_id() {
    let a = provider("prv-a", 5, Some(100));
    let b = provider("prv-b", 5, Some(100));
    let winner = select([&b, &a], SelectionPolicy::Balanced);
    assert_eq!(winner.map(|p| p.id.as_str()), Some("prv-a"));
}

#[test]
fn empty_set_selects_none() {
    assert!(select(std::iter::empty(), SelectionPolicy::Balanced).is_none());
}
