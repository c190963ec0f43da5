// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event classification and logging helpers.

use super::Event;

impl Event {
    /// The `scope:name` tag this event serializes with.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Event::ProjectRegistered { .. } => "project:registered",
            Event::ProjectReadiness { .. } => "project:readiness",
            Event::BeadCreated { .. } => "bead:created",
            Event::BeadUpdated { .. } => "bead:updated",
            Event::BeadStatusChanged { .. } => "bead:status_changed",
            Event::BeadAssigned { .. } => "bead:assigned",
            Event::BeadClaimed { .. } => "bead:claimed",
            Event::BeadCompleted { .. } => "bead:completed",
            Event::BeadDepAdded { .. } => "bead:dep_added",
            Event::BeadDepRemoved { .. } => "bead:dep_removed",
            Event::BeadUnblocked { .. } => "bead:unblocked",
            Event::DecisionCreated { .. } => "decision:created",
            Event::DecisionClaimed { .. } => "decision:claimed",
            Event::DecisionResolved { .. } => "decision:resolved",
            Event::DecisionTimedOut { .. } => "decision:timed_out",
            Event::AgentSpawned { .. } => "agent:spawned",
            Event::AgentStatusChanged { .. } => "agent:status_changed",
            Event::AgentAttached { .. } => "agent:attached",
            Event::AgentStopped { .. } => "agent:stopped",
            Event::ProviderRegistered { .. } => "provider:registered",
            Event::ProviderUpdated { .. } => "provider:updated",
            Event::ProviderDeleted { .. } => "provider:deleted",
            Event::ProviderHeartbeat { .. } => "provider:heartbeat",
            Event::QueryCompleted { .. } => "query:completed",
            Event::DispatchTick { .. } => "dispatch:tick",
            Event::MotivationRegistered { .. } => "motivation:registered",
            Event::MotivationTriggered { .. } => "motivation:triggered",
            Event::TimerFired { .. } => "timer:fired",
            Event::Shutdown => "system:shutdown",
            Event::Custom => "custom",
        }
    }

    /// Transient events ride the bus but are never appended to the WAL.
    ///
    /// Everything they describe is either derived state (readiness cache,
    /// unblock notifications) or pure telemetry; losing them on overflow or
    /// restart loses latency, never state.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Event::ProjectReadiness { .. }
                | Event::BeadUnblocked { .. }
                | Event::QueryCompleted { .. }
                | Event::DispatchTick { .. }
                | Event::TimerFired { .. }
                | Event::Shutdown
                | Event::Custom
        )
    }

    /// Project this event belongs to, for bus subscription filters.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Event::ProjectRegistered { id, .. } | Event::ProjectReadiness { id, .. } => Some(id),
            Event::BeadCreated { project, .. }
            | Event::DecisionCreated { project, .. }
            | Event::AgentSpawned { project, .. } => Some(project),
            Event::DispatchTick { project, .. } => project.as_deref(),
            _ => None,
        }
    }

    /// Compact one-line summary for effect/event logging.
    pub fn log_summary(&self) -> String {
        match self {
            Event::ProjectRegistered { id, .. } => format!("project:registered {id}"),
            Event::ProjectReadiness { id, ready, issues, .. } => {
                format!("project:readiness {id} ready={ready} issues={}", issues.len())
            }
            Event::BeadCreated { id, priority, kind, .. } => {
                format!("bead:created {id} {kind} {priority}")
            }
            Event::BeadUpdated { id, .. } => format!("bead:updated {id}"),
            Event::BeadStatusChanged { id, status, .. } => {
                format!("bead:status_changed {id} -> {status}")
            }
            Event::BeadAssigned { id, agent, .. } => match agent {
                Some(a) => format!("bead:assigned {id} -> {a}"),
                None => format!("bead:assigned {id} cleared"),
            },
            Event::BeadClaimed { id, agent, .. } => format!("bead:claimed {id} by {agent}"),
            Event::BeadCompleted { id, .. } => format!("bead:completed {id}"),
            Event::BeadDepAdded { from, to, kind } => {
                format!("bead:dep_added {from} {kind} {to}")
            }
            Event::BeadDepRemoved { from, to } => format!("bead:dep_removed {from} -x- {to}"),
            Event::BeadUnblocked { id, decision } => {
                format!("bead:unblocked {id} via {decision}")
            }
            Event::DecisionCreated { id, priority, .. } => {
                format!("decision:created {id} {priority}")
            }
            Event::DecisionClaimed { id, decider } => {
                format!("decision:claimed {id} by {decider}")
            }
            Event::DecisionResolved { id, decider, decision, .. } => {
                format!("decision:resolved {id} by {decider}: {decision}")
            }
            Event::DecisionTimedOut { id, .. } => format!("decision:timed_out {id}"),
            Event::AgentSpawned { id, role, project, .. } => {
                format!("agent:spawned {id} role={role} project={project}")
            }
            Event::AgentStatusChanged { id, status, .. } => {
                format!("agent:status_changed {id} -> {status}")
            }
            Event::AgentAttached { id, provider, .. } => {
                format!("agent:attached {id} -> {provider}")
            }
            Event::AgentStopped { id, .. } => format!("agent:stopped {id}"),
            Event::ProviderRegistered { id, endpoint, .. } => {
                format!("provider:registered {id} {endpoint}")
            }
            Event::ProviderUpdated { id, .. } => format!("provider:updated {id}"),
            Event::ProviderDeleted { id } => format!("provider:deleted {id}"),
            Event::ProviderHeartbeat { id, outcome, .. } => match outcome {
                super::HeartbeatOutcome::Healthy { latency_ms, model, .. } => {
                    format!("provider:heartbeat {id} healthy {model} {latency_ms}ms")
                }
                super::HeartbeatOutcome::Unhealthy { error } => {
                    format!("provider:heartbeat {id} unhealthy: {error}")
                }
            },
            Event::QueryCompleted { id, .. } => format!("query:completed {id}"),
            Event::DispatchTick { dispatched, skipped, .. } => {
                format!("dispatch:tick dispatched={dispatched} skipped={}", skipped.len())
            }
            Event::MotivationRegistered { id, .. } => format!("motivation:registered {id}"),
            Event::MotivationTriggered { id, .. } => format!("motivation:triggered {id}"),
            Event::TimerFired { id } => format!("timer:fired {id}"),
            Event::Shutdown => "system:shutdown".to_string(),
            Event::Custom => "custom".to_string(),
        }
    }
}
