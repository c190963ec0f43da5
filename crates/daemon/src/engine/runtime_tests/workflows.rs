// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Harness;
use crate::engine::{RuntimeError, WorkflowId};
use braid_core::test_support::bead_created;
use braid_core::{BeadStatus, Priority};
use braid_wire::{QueryReply, Signal, WorkflowQuery};

#[yare::parameterized(
    bead       = { "bead-proj-1", WorkflowId::Bead("proj-1") },
    agent      = { "agent-agt-1", WorkflowId::Agent("agt-1") },
    decision   = { "decision-proj-d", WorkflowId::Decision("proj-d") },
    dispatcher = { "dispatcher-global", WorkflowId::DispatcherGlobal },
    per_project = { "dispatcher-proj", WorkflowId::DispatcherProject("proj") },
    provider   = { "provider-heartbeat-prv-1", WorkflowId::ProviderHeartbeat("prv-1") },
    master     = { "braid-heartbeat-master", WorkflowId::MasterHeartbeat },
)]
fn workflow_ids_parse(id: &str, expected: WorkflowId<'_>) {
    assert_eq!(WorkflowId::parse(id), Some(expected));
}

#[test]
fn unknown_workflow_ids_parse_to_none() {
    assert_eq!(WorkflowId::parse("job-123"), None);
    assert_eq!(WorkflowId::parse(""), None);
}

#[tokio::test]
async fn assign_agent_signal_claims_the_bead() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    harness.commit(bead_created("proj-1", "proj", Priority::P1));

    harness
        .runtime
        .signal_workflow("bead-proj-1", Signal::AssignAgent { agent: "agt-a".to_string() })
        .await
        .unwrap();

    assert_eq!(harness.bead_status("proj-1"), BeadStatus::InProgress);
}

#[tokio::test]
async fn complete_signal_is_terminal_and_idempotent() {
    let harness = Harness::new().with_project("proj");
    harness.commit(bead_created("proj-1", "proj", Priority::P1));

    harness
        .runtime
        .signal_workflow("bead-proj-1", Signal::Complete { result: None })
        .await
        .unwrap();
    assert_eq!(harness.bead_status("proj-1"), BeadStatus::Closed);

    // At-least-once delivery: the duplicate terminal signal is a no-op.
    harness
        .runtime
        .signal_workflow("bead-proj-1", Signal::Complete { result: None })
        .await
        .unwrap();
}

#[tokio::test]
async fn agent_shutdown_signal_is_terminal() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");

    harness
        .runtime
        .signal_workflow(
            "agent-agt-a",
            Signal::Shutdown { reason: Some("scale down".to_string()) },
        )
        .await
        .unwrap();
    assert_eq!(harness.agent("agt-a").status, braid_core::AgentStatus::Stopped);
}

#[tokio::test]
async fn resolve_signal_routes_to_decision_manager() {
    let harness = Harness::new().with_project("proj");
    harness.commit(braid_core::test_support::decision_created("proj-d", "proj", None));

    harness
        .runtime
        .signal_workflow(
            "decision-proj-d",
            Signal::Resolve {
                decision: "approve".to_string(),
                decider: "alice".to_string(),
                rationale: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(harness.bead_status("proj-d"), BeadStatus::Closed);
}

#[tokio::test]
async fn queries_read_materialized_state() {
    let harness = Harness::new()
        .with_project("proj")
        .with_ready_agent("agt-a", "proj", "engineer");
    harness.commit(bead_created("proj-1", "proj", Priority::P1));
    harness.runtime.claim_bead("proj-1", "agt-a").unwrap();

    let reply = harness
        .runtime
        .query_workflow("bead-proj-1", WorkflowQuery::GetStatus)
        .unwrap();
    assert_eq!(reply, QueryReply::Status { status: "in_progress".to_string() });

    let reply = harness
        .runtime
        .query_workflow("bead-proj-1", WorkflowQuery::GetAssignedAgent)
        .unwrap();
    assert_eq!(reply, QueryReply::Agent { agent: Some("agt-a".to_string()) });

    let reply = harness
        .runtime
        .query_workflow("agent-agt-a", WorkflowQuery::GetCurrentBead)
        .unwrap();
    assert_eq!(reply, QueryReply::Bead { bead: Some("proj-1".to_string()) });
}

#[tokio::test]
async fn unknown_workflow_signal_errors() {
    let harness = Harness::new();
    let err = harness
        .runtime
        .signal_workflow("gizmo-1", Signal::Trigger)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownWorkflow(_)));
}

#[tokio::test]
async fn mismatched_signal_errors() {
    let harness = Harness::new().with_project("proj");
    harness.commit(bead_created("proj-1", "proj", Priority::P1));
    let err = harness
        .runtime
        .signal_workflow("bead-proj-1", Signal::Trigger)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidSignal { .. }));
}
