// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Motivation records: declarative triggers evaluated on the master beat.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a motivation (operator-chosen, `mtv-` prefixed
    /// by convention).
    pub struct MotivationId;
}

/// What causes a motivation to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotivationKind {
    /// Fires when `params["interval_ms"]` has elapsed since the last trigger.
    Calendar,
    /// Fires on a matching bus event (evaluated by external collaborators).
    Event,
    External,
    Threshold,
    /// Fires when the target project has idle agents and no in-progress work.
    Idle,
}

crate::simple_display! {
    MotivationKind {
        Calendar => "calendar",
        Event => "event",
        External => "external",
        Threshold => "threshold",
        Idle => "idle",
    }
}

/// A declarative trigger targeting a role, agent, or project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motivation {
    pub id: MotivationId,
    pub kind: MotivationKind,
    /// Free-form condition string, interpreted per kind.
    #[serde(default)]
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,
    /// Honored globally; a motivation never fires twice within its cooldown.
    #[serde(default)]
    pub cooldown_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered_ms: Option<u64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Motivation {
    pub fn cooled_down(&self, now_ms: u64) -> bool {
        match self.last_triggered_ms {
            Some(at) => now_ms.saturating_sub(at) >= self.cooldown_ms,
            None => true,
        }
    }

    /// Interval for calendar motivations, if declared.
    pub fn interval_ms(&self) -> Option<u64> {
        self.params.get("interval_ms").and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
#[path = "motivation_tests.rs"]
mod tests;
