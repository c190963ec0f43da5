// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer scheduler.
//!
//! Deadlines live in one map polled by the engine loop between events;
//! firing produces `timer:fired` bus events routed by `TimerKind`. Timers
//! are not persisted; startup reconciliation re-derives every timer from
//! materialized state, which keeps them replay-safe.

use braid_core::TimerId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct Scheduler {
    timers: HashMap<String, Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or reset) a timer. One deadline per id.
    pub fn set_timer(&mut self, id: String, duration: Duration, now: Instant) {
        self.timers.insert(id, now + duration);
    }

    pub fn cancel_timer(&mut self, id: &str) {
        self.timers.remove(id);
    }

    /// Earliest pending deadline, for the engine loop's sleep.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().min().copied()
    }

    /// Remove and return every timer due at `now`, soonest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due: Vec<(String, Instant)> = self
            .timers
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (id.clone(), *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);
        for (id, _) in &due {
            self.timers.remove(id);
        }
        due.into_iter().map(|(id, _)| TimerId::new(id)).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.timers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
