// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Harness;
use crate::engine::{CreateDecision, RuntimeError};
use braid_core::bead::ctx;
use braid_core::test_support::bead_created;
use braid_core::{AgentId, BeadStatus, DecisionError, DecisionOption, Priority};
use std::collections::HashMap;

fn decision(harness: &Harness, question: &str, parent: Option<&str>) -> braid_core::Bead {
    harness
        .runtime
        .create_decision(CreateDecision {
            project: "proj".to_string(),
            question: question.to_string(),
            options: vec![DecisionOption::new("approve"), DecisionOption::new("deny")],
            recommendation: Some("approve".to_string()),
            parent: parent.map(braid_core::BeadId::from_string),
            requester: Some(AgentId::from_string("agt-req")),
            priority: Priority::P1,
            title: None,
            context: HashMap::new(),
        })
        .unwrap()
}

/// A decision blocks its parent until resolved; resolution frees it
/// without touching its status.
#[tokio::test]
async fn resolution_unblocks_parent() {
    let harness = Harness::new().with_project("proj");
    harness.commit(bead_created("proj-b", "proj", Priority::P1));
    let d = decision(&harness, "Ship it?", Some("proj-b"));

    assert!(harness.runtime.lock_state(|s| s.ready_beads("proj").is_empty()));

    harness
        .runtime
        .resolve_decision(d.id.as_str(), "alice", "approve", Some("fine"))
        .await
        .unwrap();

    let ready: Vec<String> = harness.runtime.lock_state(|s| {
        s.ready_beads("proj").iter().map(|b| b.id.as_str().to_string()).collect()
    });
    assert_eq!(ready, vec!["proj-b".to_string()]);
    assert_eq!(harness.bead_status("proj-b"), BeadStatus::Open);
    assert_eq!(harness.bead_status(d.id.as_str()), BeadStatus::Closed);
}

/// Re-resolving: same decider is a no-op, a different decider gets a
/// mismatch.
#[tokio::test]
async fn resolve_twice_semantics() {
    let harness = Harness::new().with_project("proj");
    let d = decision(&harness, "Ship it?", None);

    harness.runtime.resolve_decision(d.id.as_str(), "alice", "approve", None).await.unwrap();
    // Same decider: success no-op.
    harness.runtime.resolve_decision(d.id.as_str(), "alice", "deny", None).await.unwrap();
    let payload = harness.bead(d.id.as_str()).decision.unwrap();
    assert_eq!(payload.decision.as_deref(), Some("approve"));

    // Different decider: DeciderMismatch.
    let err = harness
        .runtime
        .resolve_decision(d.id.as_str(), "bob", "deny", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Decision(DecisionError::DeciderMismatch { .. })
    ));
}

#[tokio::test]
async fn claim_is_sticky() {
    let harness = Harness::new().with_project("proj");
    let d = decision(&harness, "Ship it?", None);

    harness.runtime.claim_decision(d.id.as_str(), "alice").unwrap();
    // Claiming again as the same decider is fine.
    harness.runtime.claim_decision(d.id.as_str(), "alice").unwrap();
    // A different decider is rejected.
    let err = harness.runtime.claim_decision(d.id.as_str(), "bob").unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Decision(DecisionError::AlreadyClaimed { .. })
    ));
    // And cannot resolve either.
    let err = harness
        .runtime
        .resolve_decision(d.id.as_str(), "bob", "approve", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Decision(DecisionError::DeciderMismatch { .. })
    ));
}

/// CEO escalation with deny: the bead reopens unassigned with the
/// rationale in context.
#[tokio::test]
async fn ceo_deny_reopens_parent() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    harness.commit(bead_created("proj-b", "proj", Priority::P2));
    harness.runtime.claim_bead("proj-b", "agt-a").unwrap();

    let d = harness
        .runtime
        .escalate_to_ceo("proj-b", "policy", Some("agt-a"))
        .unwrap();
    assert_eq!(d.priority, Priority::P0);
    assert_eq!(harness.bead("proj-b").priority, Priority::P0);

    harness
        .runtime
        .resolve_decision(d.id.as_str(), "ceo", "deny", Some("not this quarter"))
        .await
        .unwrap();

    let parent = harness.bead("proj-b");
    assert_eq!(parent.status, BeadStatus::Open);
    assert!(parent.assigned_to.is_none());
    assert_eq!(
        parent.context.get(ctx::CEO_COMMENT).map(String::as_str),
        Some("not this quarter")
    );
}

#[tokio::test]
async fn ceo_approve_closes_parent() {
    let harness = Harness::new().with_project("proj");
    harness.commit(bead_created("proj-b", "proj", Priority::P2));
    let d = harness.runtime.escalate_to_ceo("proj-b", "policy", None).unwrap();

    harness.runtime.resolve_decision(d.id.as_str(), "ceo", "approve", None).await.unwrap();
    assert_eq!(harness.bead_status("proj-b"), BeadStatus::Closed);
}

#[tokio::test]
async fn ceo_needs_more_info_returns_to_agent() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    harness.commit(bead_created("proj-b", "proj", Priority::P2));
    harness.runtime.claim_bead("proj-b", "agt-a").unwrap();

    let d = harness
        .runtime
        .escalate_to_ceo("proj-b", "policy", Some("agt-a"))
        .unwrap();
    harness
        .runtime
        .resolve_decision(d.id.as_str(), "ceo", "needs_more_info", None)
        .await
        .unwrap();

    let parent = harness.bead("proj-b");
    assert_eq!(parent.status, BeadStatus::Open);
    assert!(parent.assigned_to.is_none());
    assert_eq!(parent.returned_to().map(|a| a.as_str().to_string()), Some("agt-a".to_string()));
    assert_eq!(parent.redispatch_count(), 1);
}

/// Approving a code-fix decision files the apply-fix follow-up task.
#[tokio::test]
async fn approved_code_fix_files_apply_fix_bead() {
    let harness = Harness::new().with_project("proj");
    let d = harness
        .runtime
        .create_decision(CreateDecision {
            project: "proj".to_string(),
            question: "Apply the patch?".to_string(),
            options: vec![DecisionOption::new("approve"), DecisionOption::new("deny")],
            recommendation: None,
            parent: None,
            requester: Some(AgentId::from_string("agt-fixer")),
            priority: Priority::P1,
            title: Some("[CEO] Code Fix Approval: widget overflow".to_string()),
            context: HashMap::new(),
        })
        .unwrap();
    // Proposal body carries the original bug reference.
    harness
        .runtime
        .update_bead(
            d.id.as_str(),
            crate::engine::BeadChanges {
                description: Some("**Original Bug:** proj-bug42\n\npatch body".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    harness.runtime.resolve_decision(d.id.as_str(), "ceo", "approved", None).await.unwrap();

    let apply_fix = harness.runtime.lock_state(|s| {
        s.beads
            .values()
            .find(|b| b.title.starts_with("[apply-fix]"))
            .cloned()
    });
    let apply_fix = apply_fix.expect("apply-fix bead filed");
    assert_eq!(apply_fix.priority, Priority::P0);
    assert_eq!(
        apply_fix.title,
        format!("[apply-fix] Apply approved patch from {}", d.id)
    );
    assert_eq!(
        apply_fix.context.get(ctx::ORIGINAL_BUG).map(String::as_str),
        Some("proj-bug42")
    );
    assert_eq!(
        apply_fix.context.get(ctx::RETURNED_TO).map(String::as_str),
        Some("agt-fixer")
    );
}

#[tokio::test]
async fn deny_does_not_file_apply_fix() {
    let harness = Harness::new().with_project("proj");
    let d = harness
        .runtime
        .create_decision(CreateDecision {
            project: "proj".to_string(),
            question: "Apply the patch?".to_string(),
            options: vec![DecisionOption::new("approve"), DecisionOption::new("deny")],
            recommendation: None,
            parent: None,
            requester: None,
            priority: Priority::P1,
            title: Some("Code Fix Approval: widget overflow".to_string()),
            context: HashMap::new(),
        })
        .unwrap();

    harness.runtime.resolve_decision(d.id.as_str(), "ceo", "deny", None).await.unwrap();
    let filed = harness
        .runtime
        .lock_state(|s| s.beads.values().any(|b| b.title.starts_with("[apply-fix]")));
    assert!(!filed);
}

#[tokio::test]
async fn timeout_expires_pending_decision() {
    let harness = Harness::new().with_project("proj");
    harness.commit(bead_created("proj-b", "proj", Priority::P1));
    let d = decision(&harness, "Ship it?", Some("proj-b"));

    harness.runtime.timeout_decision(d.id.as_str()).unwrap();

    let bead = harness.bead(d.id.as_str());
    assert_eq!(bead.status, BeadStatus::Closed);
    assert!(bead.decision.unwrap().timed_out);
    // Parent is free again.
    assert!(harness.bead("proj-b").blocked_by.is_empty());

    // Expiring twice is a no-op.
    harness.runtime.timeout_decision(d.id.as_str()).unwrap();
}

#[tokio::test]
async fn original_bug_extraction_accepts_both_shapes() {
    use crate::engine::decisions::extract_original_bug;
    assert_eq!(
        extract_original_bug("**Original Bug:** proj-1\nrest").as_deref(),
        Some("proj-1")
    );
    assert_eq!(
        extract_original_bug("Original Bug: proj-2").as_deref(),
        Some("proj-2")
    );
    assert_eq!(extract_original_bug("no reference here"), None);
}
