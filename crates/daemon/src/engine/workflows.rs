// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable-workflow shim: stable ids, signals, queries.
//!
//! Workflow ids are deterministic (`bead-<id>`, `agent-<id>`, …) so
//! callers reconstruct handles without lookup. A signal maps onto the
//! event that advances the corresponding state machine; a query is a
//! synchronous, side-effect-free read of materialized state. Signals are
//! at-least-once: duplicate terminal transitions land as no-ops in the
//! appliers.

use super::{Runtime, RuntimeError};
use braid_core::{AgentStatus, BeadStatus, Clock};
use braid_wire::{QueryReply, Signal, WorkflowQuery};

/// Parsed stable workflow id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowId<'a> {
    Bead(&'a str),
    Agent(&'a str),
    Decision(&'a str),
    DispatcherGlobal,
    DispatcherProject(&'a str),
    ProviderHeartbeat(&'a str),
    MasterHeartbeat,
}

impl<'a> WorkflowId<'a> {
    pub fn parse(id: &'a str) -> Option<Self> {
        if id == "dispatcher-global" {
            return Some(WorkflowId::DispatcherGlobal);
        }
        if id == "braid-heartbeat-master" {
            return Some(WorkflowId::MasterHeartbeat);
        }
        if let Some(rest) = id.strip_prefix("provider-heartbeat-") {
            return Some(WorkflowId::ProviderHeartbeat(rest));
        }
        if let Some(rest) = id.strip_prefix("dispatcher-") {
            return Some(WorkflowId::DispatcherProject(rest));
        }
        if let Some(rest) = id.strip_prefix("bead-") {
            return Some(WorkflowId::Bead(rest));
        }
        if let Some(rest) = id.strip_prefix("agent-") {
            return Some(WorkflowId::Agent(rest));
        }
        if let Some(rest) = id.strip_prefix("decision-") {
            return Some(WorkflowId::Decision(rest));
        }
        None
    }
}

fn parse_bead_status(s: &str) -> Result<BeadStatus, RuntimeError> {
    match s {
        "open" => Ok(BeadStatus::Open),
        "in_progress" => Ok(BeadStatus::InProgress),
        "blocked" => Ok(BeadStatus::Blocked),
        "closed" => Ok(BeadStatus::Closed),
        other => Err(RuntimeError::InvalidRequest(format!("unknown bead status: {other}"))),
    }
}

fn parse_agent_status(s: &str) -> Result<AgentStatus, RuntimeError> {
    match s {
        "idle" => Ok(AgentStatus::Idle),
        "working" => Ok(AgentStatus::Working),
        "paused" => Ok(AgentStatus::Paused),
        "stopped" | "shutdown" => Ok(AgentStatus::Stopped),
        other => Err(RuntimeError::InvalidRequest(format!("unknown agent status: {other}"))),
    }
}

impl<C: Clock> Runtime<C> {
    /// Deliver a signal to a workflow by stable id.
    pub async fn signal_workflow(
        &self,
        workflow: &str,
        signal: Signal,
    ) -> Result<(), RuntimeError> {
        let parsed = WorkflowId::parse(workflow)
            .ok_or_else(|| RuntimeError::UnknownWorkflow(workflow.to_string()))?;

        match (parsed, signal) {
            (WorkflowId::Bead(id), Signal::AssignAgent { agent }) => {
                self.claim_bead(id, &agent)
            }
            (WorkflowId::Bead(id), Signal::StatusChange { status }) => {
                let status = parse_bead_status(&status)?;
                self.update_bead(
                    id,
                    super::beads::BeadChanges { status: Some(status), ..Default::default() },
                )
                .map(|_| ())
            }
            (WorkflowId::Bead(id), Signal::Complete { result: _ }) => {
                // Terminal; duplicate completions are no-ops via update.
                let changes = super::beads::BeadChanges {
                    status: Some(BeadStatus::Closed),
                    ..Default::default()
                };
                self.update_bead(id, changes).map(|_| ())
            }
            (WorkflowId::Agent(id), Signal::UpdateStatus { status }) => {
                let status = parse_agent_status(&status)?;
                self.update_agent_status(id, status)
            }
            (WorkflowId::Agent(id), Signal::AssignBead { bead }) => self.claim_bead(&bead, id),
            (WorkflowId::Agent(id), Signal::Shutdown { reason }) => {
                self.stop_agent(id, reason.as_deref())
            }
            (WorkflowId::Decision(id), Signal::Resolve { decision, decider, rationale }) => {
                self.resolve_decision(id, &decider, &decision, rationale.as_deref()).await
            }
            (WorkflowId::DispatcherGlobal, Signal::Trigger) => {
                self.request_dispatch();
                Ok(())
            }
            (WorkflowId::DispatcherProject(project), Signal::Trigger) => {
                self.run_dispatch_cycle(Some(project)).await;
                Ok(())
            }
            (parsed, signal) => Err(RuntimeError::InvalidSignal {
                workflow: format!("{parsed:?}"),
                signal: format!("{signal:?}"),
            }),
        }
    }

    /// Answer a workflow query. Side-effect free.
    pub fn query_workflow(
        &self,
        workflow: &str,
        query: WorkflowQuery,
    ) -> Result<QueryReply, RuntimeError> {
        let parsed = WorkflowId::parse(workflow)
            .ok_or_else(|| RuntimeError::UnknownWorkflow(workflow.to_string()))?;

        match (parsed, query) {
            (WorkflowId::Bead(id) | WorkflowId::Decision(id), WorkflowQuery::GetStatus) => self
                .lock_state(|state| {
                    state
                        .get_bead(id)
                        .map(|b| QueryReply::Status { status: b.status.to_string() })
                        .ok_or_else(|| {
                            braid_core::BeadError::NotFound(id.to_string()).into()
                        })
                }),
            (WorkflowId::Bead(id), WorkflowQuery::GetAssignedAgent) => self.lock_state(|state| {
                state
                    .get_bead(id)
                    .map(|b| QueryReply::Agent {
                        agent: b.assigned_to.as_ref().map(|a| a.as_str().to_string()),
                    })
                    .ok_or_else(|| braid_core::BeadError::NotFound(id.to_string()).into())
            }),
            (WorkflowId::Agent(id), WorkflowQuery::GetStatus) => self.lock_state(|state| {
                state
                    .get_agent(id)
                    .map(|a| QueryReply::Status { status: a.status.to_string() })
                    .ok_or_else(|| RuntimeError::AgentNotFound(id.to_string()))
            }),
            (WorkflowId::Agent(id), WorkflowQuery::GetCurrentBead) => self.lock_state(|state| {
                state
                    .get_agent(id)
                    .map(|a| QueryReply::Bead {
                        bead: a.current_bead.as_ref().map(|b| b.as_str().to_string()),
                    })
                    .ok_or_else(|| RuntimeError::AgentNotFound(id.to_string()))
            }),
            (parsed, query) => Err(RuntimeError::InvalidSignal {
                workflow: format!("{parsed:?}"),
                signal: format!("{query:?}"),
            }),
        }
    }
}
