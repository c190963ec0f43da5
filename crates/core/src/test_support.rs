// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for tests across crates.
//!
//! Gated behind the `test-support` feature so production builds never see
//! these constructors.

use crate::agent::AgentId;
use crate::bead::{BeadId, BeadKind, Priority};
use crate::decision::DecisionOption;
use crate::event::Event;
use std::collections::HashMap;
use std::path::PathBuf;

/// A `project:registered` event for a throwaway project.
pub fn project_registered(id: &str) -> Event {
    Event::ProjectRegistered {
        id: id.to_string(),
        name: format!("{id} project"),
        source_url: None,
        auth: crate::project::AuthMethod::None,
        work_tree: PathBuf::from(format!("/tmp/{id}")),
        bead_path: PathBuf::from(".beads"),
        prefix: id.to_string(),
        sticky: false,
        perpetual: false,
    }
}

/// A `bead:created` event with the given id and priority.
pub fn bead_created(id: &str, project: &str, priority: Priority) -> Event {
    Event::BeadCreated {
        id: BeadId::from_string(id),
        project: project.to_string(),
        title: format!("bead {id}"),
        description: String::new(),
        kind: BeadKind::Task,
        priority,
        tags: Vec::new(),
        context: HashMap::new(),
        created_at_ms: 1_000_000,
    }
}

/// A `decision:created` event blocking `parent`.
pub fn decision_created(id: &str, project: &str, parent: Option<&str>) -> Event {
    Event::DecisionCreated {
        id: BeadId::from_string(id),
        project: project.to_string(),
        title: format!("decision {id}"),
        question: "Proceed?".to_string(),
        options: vec![
            DecisionOption::new("approve").recommended(),
            DecisionOption::new("deny"),
        ],
        recommendation: Some("approve".to_string()),
        parent: parent.map(BeadId::from_string),
        requester: Some(AgentId::from_string("agt-requester")),
        priority: Priority::P1,
        context: HashMap::new(),
        created_at_ms: 1_000_000,
    }
}

/// An `agent:spawned` event for a paused agent.
pub fn agent_spawned(id: &str, project: &str, role: &str) -> Event {
    Event::AgentSpawned {
        id: AgentId::from_string(id),
        name: id.to_string(),
        role: role.to_string(),
        persona_name: "default".to_string(),
        persona: crate::persona::Persona::default(),
        project: project.to_string(),
        created_at_ms: 1_000_000,
    }
}

/// A `provider:registered` event.
pub fn provider_registered(id: &str, endpoint: &str) -> Event {
    Event::ProviderRegistered {
        id: crate::provider::ProviderId::from_string(id),
        name: id.to_string(),
        kind: "openai".to_string(),
        endpoint: endpoint.to_string(),
        configured_model: None,
        registered_at_ms: 1_000_000,
    }
}

/// A healthy `provider:heartbeat` event.
pub fn provider_healthy(id: &str, model: &str, latency_ms: u64) -> Event {
    Event::ProviderHeartbeat {
        id: crate::provider::ProviderId::from_string(id),
        outcome: crate::event::HeartbeatOutcome::Healthy {
            latency_ms,
            model: model.to_string(),
            score: 10,
            context_window: Some(32_768),
        },
        at_ms: 1_000_000,
    }
}

/// An unhealthy `provider:heartbeat` event.
pub fn provider_unhealthy(id: &str, error: &str) -> Event {
    Event::ProviderHeartbeat {
        id: crate::provider::ProviderId::from_string(id),
        outcome: crate::event::HeartbeatOutcome::Unhealthy { error: error.to_string() },
        at_ms: 1_000_000,
    }
}
