// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn pending_by_default() {
    let p = Provider::builder().build();
    assert_eq!(p.status, ProviderStatus::Pending);
    assert!(!p.is_healthy());
}

#[test]
fn heartbeat_freshness_window_is_three_intervals() {
    let p = Provider::builder().last_heartbeat_ms(100_000u64).build();
    // 30s interval -> fresh below 90s after the beat
    assert!(p.heartbeat_fresh(100_000 + 89_999, 30_000));
    assert!(!p.heartbeat_fresh(100_000 + 90_000, 30_000));
}

#[test]
fn no_heartbeat_is_never_fresh() {
    let p = Provider::builder().build();
    assert!(!p.heartbeat_fresh(u64::MAX, 30_000));
}

#[yare::parameterized(
    pending   = { ProviderStatus::Pending, "pending" },
    healthy   = { ProviderStatus::Healthy, "healthy" },
    unhealthy = { ProviderStatus::Unhealthy, "unhealthy" },
    failed    = { ProviderStatus::Failed, "failed" },
)]
fn status_serde_roundtrips(status: ProviderStatus, tag: &str) {
    let json = serde_json::to_string(&status).unwrap();
    assert_eq!(json, format!("\"{tag}\""));
    let parsed: ProviderStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, status);
}

#[test]
fn selection_policy_default_is_balanced() {
    assert_eq!(SelectionPolicy::default(), SelectionPolicy::Balanced);
}

#[test]
fn provider_serde_roundtrips() {
    let p = Provider::builder()
        .endpoint("http://gpu-box:11434")
        .configured_model("qwen2.5-coder")
        .selected_model("qwen2.5-coder")
        .status(ProviderStatus::Healthy)
        .last_latency_ms(40u64)
        .build();
    let json = serde_json::to_string(&p).unwrap();
    let parsed: Provider = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, p);
}
