// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Harness;
use crate::engine::{BeadChanges, CreateBead, RuntimeError};
use braid_core::{BeadError, BeadKind, BeadStatus, DepKind, Priority};
use std::collections::HashMap;

fn create(harness: &Harness, title: &str, priority: Priority) -> braid_core::Bead {
    harness
        .runtime
        .create_bead(CreateBead {
            project: "proj".to_string(),
            title: title.to_string(),
            description: String::new(),
            kind: BeadKind::Task,
            priority,
            tags: vec![],
            context: HashMap::new(),
        })
        .unwrap()
}

#[tokio::test]
async fn create_assigns_project_prefix() {
    let harness = Harness::new().with_project("proj");
    let bead = create(&harness, "first", Priority::P1);
    assert!(bead.id.as_str().starts_with("proj-"));
    assert_eq!(bead.status, BeadStatus::Open);
}

#[tokio::test]
async fn create_rejects_unknown_project() {
    let harness = Harness::new();
    let err = harness
        .runtime
        .create_bead(CreateBead {
            project: "ghost".to_string(),
            title: "x".to_string(),
            description: String::new(),
            kind: BeadKind::Task,
            priority: Priority::P2,
            tags: vec![],
            context: HashMap::new(),
        })
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Bead(BeadError::InvalidProject(_))));
}

#[tokio::test]
async fn update_unknown_bead_is_not_found() {
    let harness = Harness::new().with_project("proj");
    let err = harness.runtime.update_bead("proj-ghost", BeadChanges::default()).unwrap_err();
    assert!(matches!(err, RuntimeError::Bead(BeadError::NotFound(_))));
}

#[tokio::test]
async fn closed_bead_rejects_reopen() {
    let harness = Harness::new().with_project("proj");
    let bead = create(&harness, "done", Priority::P1);
    harness
        .runtime
        .update_bead(
            bead.id.as_str(),
            BeadChanges { status: Some(BeadStatus::Closed), ..Default::default() },
        )
        .unwrap();

    let err = harness
        .runtime
        .update_bead(
            bead.id.as_str(),
            BeadChanges { status: Some(BeadStatus::Open), ..Default::default() },
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Bead(BeadError::TerminalBead(_))));
}

/// Closing twice succeeds without a second completion event.
#[tokio::test]
async fn double_close_is_success_noop() {
    let harness = Harness::new().with_project("proj");
    let bead = create(&harness, "done", Priority::P1);
    let close = BeadChanges { status: Some(BeadStatus::Closed), ..Default::default() };
    harness
        .runtime
        .update_bead(bead.id.as_str(), BeadChanges { status: Some(BeadStatus::Closed), ..Default::default() })
        .unwrap();
    let first_closed_at = harness.bead(bead.id.as_str()).closed_at_ms;

    harness.clock.advance(std::time::Duration::from_secs(60));
    let again = harness.runtime.update_bead(bead.id.as_str(), close).unwrap();
    assert_eq!(again.closed_at_ms, first_closed_at, "no duplicate completion event");
}

#[tokio::test]
async fn add_dependency_rejects_cycles() {
    let harness = Harness::new().with_project("proj");
    let a = create(&harness, "a", Priority::P1);
    let b = create(&harness, "b", Priority::P1);

    harness.runtime.add_dependency(a.id.as_str(), b.id.as_str(), DepKind::DependsOn).unwrap();
    let err = harness
        .runtime
        .add_dependency(b.id.as_str(), a.id.as_str(), DepKind::Blocks)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Bead(BeadError::CycleDetected { .. })));
}

#[tokio::test]
async fn add_dependency_rejects_unknown_refs() {
    let harness = Harness::new().with_project("proj");
    let a = create(&harness, "a", Priority::P1);
    let err = harness
        .runtime
        .add_dependency(a.id.as_str(), "proj-ghost", DepKind::Blocks)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Bead(BeadError::UnknownRef(_))));
}

/// Contended claims have exactly one winner; losers see a soft conflict.
#[tokio::test(flavor = "multi_thread")]
async fn contended_claim_has_one_winner() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer")
        .with_ready_agent("agt-b", "proj", "engineer");
    let bead = create(&harness, "contested", Priority::P0);

    let mut handles = Vec::new();
    for agent in ["agt-a", "agt-b"] {
        let runtime = std::sync::Arc::clone(&harness.runtime);
        let id = bead.id.as_str().to_string();
        handles.push(tokio::task::spawn_blocking(move || runtime.claim_bead(&id, agent)));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => wins += 1,
            Err(e) if e.is_conflict() => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!((wins, conflicts), (1, 1));

    let bead = harness.bead(bead.id.as_str());
    assert_eq!(bead.status, BeadStatus::InProgress);
    assert!(bead.assigned_to.is_some());
    // Exactly one agent is working; the loser stayed idle.
    let statuses: Vec<braid_core::AgentStatus> =
        vec![harness.agent("agt-a").status, harness.agent("agt-b").status];
    assert_eq!(
        statuses.iter().filter(|s| **s == braid_core::AgentStatus::Working).count(),
        1
    );
    assert_eq!(
        statuses.iter().filter(|s| **s == braid_core::AgentStatus::Idle).count(),
        1
    );
}

#[tokio::test]
async fn claim_on_decision_bead_conflicts() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    harness.commit(braid_core::test_support::decision_created("proj-d", "proj", None));

    let err = harness.runtime.claim_bead("proj-d", "agt-a").unwrap_err();
    assert!(err.is_conflict());
}
