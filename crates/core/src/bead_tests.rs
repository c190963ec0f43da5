// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    p0 = { Priority::P0, "p0" },
    p1 = { Priority::P1, "p1" },
    p2 = { Priority::P2, "p2" },
    p3 = { Priority::P3, "p3" },
)]
fn priority_serde_roundtrips(priority: Priority, json: &str) {
    let s = serde_json::to_string(&priority).unwrap();
    assert_eq!(s, format!("\"{json}\""));
    let parsed: Priority = serde_json::from_str(&s).unwrap();
    assert_eq!(parsed, priority);
}

#[test]
fn priority_sorts_p0_first() {
    let mut ps = vec![Priority::P3, Priority::P0, Priority::P2, Priority::P1];
    ps.sort();
    assert_eq!(ps, vec![Priority::P0, Priority::P1, Priority::P2, Priority::P3]);
}

#[yare::parameterized(
    upper = { "P1" },
    lower = { "p1" },
    digit = { "1" },
)]
fn priority_parse_accepts_variants(s: &str) {
    assert_eq!(Priority::parse(s), Some(Priority::P1));
}

#[test]
fn priority_parse_rejects_garbage() {
    assert_eq!(Priority::parse("p9"), None);
}

#[test]
fn bead_id_carries_project_prefix() {
    let id = BeadId::generate("web");
    assert!(id.as_str().starts_with("web-"));
}

#[test]
fn closed_is_terminal() {
    assert!(BeadStatus::Closed.is_terminal());
    assert!(!BeadStatus::Open.is_terminal());
    assert!(!BeadStatus::InProgress.is_terminal());
    assert!(!BeadStatus::Blocked.is_terminal());
}

#[test]
fn open_unassigned_task_is_claimable() {
    let bead = Bead::builder().build();
    assert!(bead.is_claimable());
}

#[test]
fn assigned_bead_is_not_claimable() {
    let bead = Bead::builder().assigned_to(crate::AgentId::from_string("agt-1")).build();
    assert!(!bead.is_claimable());
}

#[test]
fn decision_bead_is_never_claimable() {
    let bead = Bead::builder().kind(BeadKind::Decision).build();
    assert!(!bead.is_claimable());
}

#[test]
fn redispatch_count_parses_context() {
    let mut context = std::collections::HashMap::new();
    context.insert(ctx::REDISPATCH_COUNT.to_string(), "3".to_string());
    let bead = Bead::builder().context(context).build();
    assert_eq!(bead.redispatch_count(), 3);
}

#[test]
fn redispatch_count_defaults_to_zero() {
    let bead = Bead::builder().build();
    assert_eq!(bead.redispatch_count(), 0);
}

#[test]
fn loop_detected_requires_true() {
    let mut context = std::collections::HashMap::new();
    context.insert(ctx::LOOP_DETECTED.to_string(), "false".to_string());
    let bead = Bead::builder().context(context.clone()).build();
    assert!(!bead.loop_detected());

    context.insert(ctx::LOOP_DETECTED.to_string(), "true".to_string());
    let bead = Bead::builder().context(context).build();
    assert!(bead.loop_detected());
}

#[test]
fn bead_serde_roundtrips() {
    let bead = Bead::builder()
        .title("fix the build")
        .kind(BeadKind::Bug)
        .priority(Priority::P0)
        .tags(vec!["ci".to_string()])
        .depends_on(vec![BeadId::from_string("proj-dep1")])
        .build();
    let json = serde_json::to_string(&bead).unwrap();
    let parsed: Bead = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, bead);
}
