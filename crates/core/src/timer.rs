// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifier type for tracking scheduled timers.
//!
//! Timer ids are structured strings so the firing handler can route them
//! without a lookup table, and so reconciliation after a restart can rebuild
//! them deterministically from materialized state.

use crate::bead::BeadId;
use crate::provider::ProviderId;

crate::define_id! {
    /// Unique identifier for a timer instance.
    pub struct TimerId;
}

impl TimerId {
    /// The global dispatcher tick.
    pub fn dispatch() -> Self {
        TimerId::new("dispatch")
    }

    /// The master heartbeat driving the motivation sweep.
    pub fn master_beat() -> Self {
        TimerId::new("master-beat")
    }

    pub fn provider_beat(id: &ProviderId) -> Self {
        TimerId::new(format!("provider-beat:{}", id))
    }

    pub fn decision_timeout(id: &BeadId) -> Self {
        TimerId::new(format!("decision-timeout:{}", id))
    }

    /// Parse this timer ID into a typed `TimerKind`.
    pub fn kind(&self) -> Option<TimerKind<'_>> {
        TimerKind::parse(self.as_str())
    }
}

/// Parsed representation of a timer ID for type-safe routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind<'a> {
    Dispatch,
    MasterBeat,
    ProviderBeat { provider: &'a str },
    DecisionTimeout { decision: &'a str },
}

impl<'a> TimerKind<'a> {
    /// Parse a timer ID string. Returns `None` for unrecognized formats.
    pub fn parse(id: &'a str) -> Option<TimerKind<'a>> {
        if id == "dispatch" {
            return Some(TimerKind::Dispatch);
        }
        if id == "master-beat" {
            return Some(TimerKind::MasterBeat);
        }
        if let Some(rest) = id.strip_prefix("provider-beat:") {
            return Some(TimerKind::ProviderBeat { provider: rest });
        }
        if let Some(rest) = id.strip_prefix("decision-timeout:") {
            return Some(TimerKind::DecisionTimeout { decision: rest });
        }
        None
    }

    /// Format this `TimerKind` back into a canonical `TimerId`.
    pub fn to_timer_id(&self) -> TimerId {
        match self {
            TimerKind::Dispatch => TimerId::dispatch(),
            TimerKind::MasterBeat => TimerId::master_beat(),
            TimerKind::ProviderBeat { provider } => {
                TimerId::new(format!("provider-beat:{provider}"))
            }
            TimerKind::DecisionTimeout { decision } => {
                TimerId::new(format!("decision-timeout:{decision}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
