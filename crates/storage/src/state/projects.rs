// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project, readiness-cache, and motivation event handlers.

use super::MaterializedState;
use braid_core::{Event, Motivation, Project, ProjectStatus, Readiness};

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::ProjectRegistered {
            id,
            name,
            source_url,
            auth,
            work_tree,
            bead_path,
            prefix,
            sticky,
            perpetual,
        } => {
            // Re-registration refreshes the declaration (config reload).
            state.projects.insert(
                id.clone(),
                Project {
                    id: id.clone(),
                    name: name.clone(),
                    source_url: source_url.clone(),
                    auth: *auth,
                    work_tree: work_tree.clone(),
                    bead_path: bead_path.clone(),
                    prefix: prefix.clone(),
                    sticky: *sticky,
                    perpetual: *perpetual,
                    status: ProjectStatus::Active,
                },
            );
        }

        // Transient: refreshes the runtime cache only, never replayed.
        Event::ProjectReadiness { id, ready, issues, checked_at_ms, .. } => {
            state.readiness.insert(
                id.clone(),
                Readiness { ready: *ready, issues: issues.clone(), checked_at_ms: *checked_at_ms },
            );
        }

        Event::MotivationRegistered { id, motivation } => {
            state.motivations.insert(id.as_str().to_string(), motivation.clone());
        }

        Event::MotivationTriggered { id, at_ms } => {
            if let Some(motivation) = state.motivations.get_mut(id.as_str()) {
                motivation.last_triggered_ms = Some(*at_ms);
            }
        }

        _ => {}
    }
}

impl MaterializedState {
    /// Register a motivation record directly (used at config load).
    pub fn motivation(&self, id: &str) -> Option<&Motivation> {
        self.motivations.get(id)
    }
}
