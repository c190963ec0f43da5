// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn pending() -> DecisionState {
    DecisionState::new(
        "Ship it?",
        vec![DecisionOption::new("yes").recommended(), DecisionOption::new("no")],
    )
}

#[test]
fn new_decision_is_unresolved() {
    let d = pending();
    assert!(!d.is_resolved());
    assert!(d.decider.is_none());
}

#[test]
fn unclaimed_accepts_any_decider() {
    let d = pending();
    assert!(d.accepts_decider("alice"));
    assert!(d.accepts_decider("bob"));
}

#[test]
fn claimed_accepts_only_the_claimant() {
    let mut d = pending();
    d.decider = Some("alice".to_string());
    assert!(d.accepts_decider("alice"));
    assert!(!d.accepts_decider("bob"));
}

#[test]
fn resolved_when_decided_at_set() {
    let mut d = pending();
    d.decision = Some("yes".to_string());
    d.decided_at_ms = Some(2_000_000);
    assert!(d.is_resolved());
}

#[test]
fn option_builder_chains() {
    let opt = DecisionOption::new("approve").description("ship the fix").recommended();
    assert_eq!(opt.label, "approve");
    assert_eq!(opt.description.as_deref(), Some("ship the fix"));
    assert!(opt.recommended);
}

#[test]
fn decision_state_serde_roundtrips() {
    let mut d = pending();
    d.recommendation = Some("yes".to_string());
    let json = serde_json::to_string(&d).unwrap();
    let parsed: DecisionState = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, d);
}
