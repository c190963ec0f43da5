// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    idle    = { AgentStatus::Idle, true },
    working = { AgentStatus::Working, false },
    paused  = { AgentStatus::Paused, false },
    stopped = { AgentStatus::Stopped, false },
)]
fn only_idle_is_schedulable(status: AgentStatus, expected: bool) {
    assert_eq!(status.is_schedulable(), expected);
}

#[test]
fn stopped_is_terminal() {
    assert!(AgentStatus::Stopped.is_terminal());
    assert!(!AgentStatus::Paused.is_terminal());
}

#[test]
fn new_agents_default_paused() {
    let agent = Agent::builder().build();
    assert_eq!(agent.status, AgentStatus::Paused);
    assert!(agent.provider.is_none());
    assert!(!agent.is_dispatchable());
}

#[test]
fn idle_attached_agent_is_dispatchable() {
    let agent = Agent::builder()
        .status(AgentStatus::Idle)
        .provider(ProviderId::from_string("prv-1"))
        .build();
    assert!(agent.is_dispatchable());
}

#[test]
fn idle_without_provider_is_not_dispatchable() {
    let agent = Agent::builder().status(AgentStatus::Idle).build();
    assert!(!agent.is_dispatchable());
}

#[test]
fn persona_is_plain_data() {
    let persona = Persona::from([("mission", "keep ci green"), ("focus", "tests")]);
    let agent = Agent::builder().persona(persona).build();
    assert_eq!(agent.persona.mission(), Some("keep ci green"));
}

#[test]
fn agent_serde_roundtrips() {
    let agent = Agent::builder()
        .name("ci-fixer")
        .role("engineer")
        .status(AgentStatus::Idle)
        .provider(ProviderId::from_string("prv-1"))
        .current_bead(BeadId::from_string("proj-abc"))
        .build();
    let json = serde_json::to_string(&agent).unwrap();
    let parsed: Agent = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, agent);
}
