// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relational mirror of the materialized state.
//!
//! SQLite holds the interop schema external tooling reads: projects,
//! agents, providers, beads, decisions, plus the `config_kv`,
//! `command_logs`, and `file_locks` tables owned by external
//! collaborators. The mirror is write-through after each applied event;
//! the WAL remains the recovery source of truth.

use crate::state::MaterializedState;
use braid_core::{Agent, Bead, Event, Provider};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;

/// Errors from the relational mirror.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

const SCHEMA: &str = "
    PRAGMA journal_mode=WAL;
    PRAGMA synchronous=NORMAL;
    PRAGMA busy_timeout=5000;

    CREATE TABLE IF NOT EXISTS projects (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        source_url  TEXT,
        auth        TEXT NOT NULL,
        work_tree   TEXT NOT NULL,
        bead_path   TEXT NOT NULL,
        prefix      TEXT NOT NULL,
        sticky      INTEGER NOT NULL DEFAULT 0,
        perpetual   INTEGER NOT NULL DEFAULT 0,
        status      TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS beads (
        id          TEXT PRIMARY KEY,
        project     TEXT NOT NULL,
        title       TEXT NOT NULL,
        kind        TEXT NOT NULL,
        priority    TEXT NOT NULL,
        status      TEXT NOT NULL,
        assigned_to TEXT,
        body        TEXT NOT NULL,
        created_at  INTEGER NOT NULL,
        updated_at  INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_beads_project ON beads(project);
    CREATE INDEX IF NOT EXISTS idx_beads_status  ON beads(status);

    CREATE TABLE IF NOT EXISTS decisions (
        id          TEXT PRIMARY KEY,
        project     TEXT NOT NULL,
        question    TEXT NOT NULL,
        decider     TEXT,
        decision    TEXT,
        decided_at  INTEGER,
        body        TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS agents (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        role        TEXT NOT NULL,
        project     TEXT NOT NULL,
        provider_id TEXT,
        status      TEXT NOT NULL,
        current_bead TEXT,
        last_active INTEGER NOT NULL,
        body        TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS providers (
        id              TEXT PRIMARY KEY,
        name            TEXT NOT NULL,
        kind            TEXT NOT NULL,
        endpoint        TEXT NOT NULL,
        selected_model  TEXT,
        status          TEXT NOT NULL,
        last_heartbeat  INTEGER,
        latency_ms      INTEGER,
        last_error      TEXT,
        body            TEXT NOT NULL
    );

    -- Owned by external collaborators; the daemon only creates them and
    -- clears file_locks rows when an agent stops.
    CREATE TABLE IF NOT EXISTS config_kv (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS command_logs (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        agent_id  TEXT,
        command   TEXT NOT NULL,
        exit_code INTEGER,
        logged_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS file_locks (
        path      TEXT PRIMARY KEY,
        agent_id  TEXT NOT NULL,
        locked_at INTEGER NOT NULL
    );
";

/// Write-through SQLite mirror.
pub struct SqliteMirror {
    conn: Mutex<Connection>,
}

impl SqliteMirror {
    /// Open (or create) the database and ensure the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Mirror the entities an applied event touched.
    ///
    /// Row content comes from the post-apply state, so replaying the same
    /// event twice converges (upserts).
    pub fn mirror(&self, event: &Event, state: &MaterializedState) -> Result<(), StoreError> {
        match event {
            Event::ProjectRegistered { id, .. } => {
                if let Some(project) = state.projects.get(id) {
                    self.upsert_project(project)?;
                }
            }

            Event::BeadCreated { id, .. }
            | Event::BeadUpdated { id, .. }
            | Event::BeadStatusChanged { id, .. }
            | Event::BeadAssigned { id, .. }
            | Event::BeadDepAdded { from: id, .. }
            | Event::BeadDepRemoved { from: id, .. } => {
                if let Some(bead) = state.beads.get(id.as_str()) {
                    self.upsert_bead(bead)?;
                }
            }

            Event::BeadClaimed { id, agent, .. } => {
                if let Some(bead) = state.beads.get(id.as_str()) {
                    self.upsert_bead(bead)?;
                }
                if let Some(agent) = state.agents.get(agent.as_str()) {
                    self.upsert_agent(agent)?;
                }
            }

            Event::BeadCompleted { id, .. } => {
                // Closing may have freed the assignee and unblocked peers;
                // refresh the bead and everything that pointed at it.
                self.refresh_bead_and_neighbors(state, id.as_str())?;
            }

            Event::DecisionCreated { id, parent, .. } => {
                if let Some(bead) = state.beads.get(id.as_str()) {
                    self.upsert_bead(bead)?;
                    self.upsert_decision(bead)?;
                }
                if let Some(parent_id) = parent {
                    if let Some(parent_bead) = state.beads.get(parent_id.as_str()) {
                        self.upsert_bead(parent_bead)?;
                    }
                }
            }

            Event::DecisionClaimed { id, .. }
            | Event::DecisionResolved { id, .. }
            | Event::DecisionTimedOut { id, .. } => {
                self.refresh_bead_and_neighbors(state, id.as_str())?;
                if let Some(bead) = state.beads.get(id.as_str()) {
                    self.upsert_decision(bead)?;
                }
            }

            Event::AgentSpawned { id, .. }
            | Event::AgentStatusChanged { id, .. }
            | Event::AgentAttached { id, .. } => {
                if let Some(agent) = state.agents.get(id.as_str()) {
                    self.upsert_agent(agent)?;
                }
            }

            Event::AgentStopped { id, .. } => {
                if let Some(agent) = state.agents.get(id.as_str()) {
                    self.upsert_agent(agent)?;
                }
                // Stopped agents hold no file locks.
                self.conn
                    .lock()
                    .execute("DELETE FROM file_locks WHERE agent_id = ?1", params![id.as_str()])?;
            }

            Event::ProviderRegistered { id, .. }
            | Event::ProviderUpdated { id, .. }
            | Event::ProviderHeartbeat { id, .. } => {
                if let Some(provider) = state.providers.get(id.as_str()) {
                    self.upsert_provider(provider)?;
                }
                // Heartbeats may pause or attach agents; keep their rows fresh.
                if matches!(event, Event::ProviderHeartbeat { .. }) {
                    for agent in state.agents.values() {
                        self.upsert_agent(agent)?;
                    }
                }
            }

            Event::ProviderDeleted { id } => {
                self.conn
                    .lock()
                    .execute("DELETE FROM providers WHERE id = ?1", params![id.as_str()])?;
            }

            _ => {}
        }
        Ok(())
    }

    /// Rebuild all rows from scratch (boot hydration check).
    pub fn resync(&self, state: &MaterializedState) -> Result<(), StoreError> {
        for project in state.projects.values() {
            self.upsert_project(project)?;
        }
        for bead in state.beads.values() {
            self.upsert_bead(bead)?;
            if bead.decision.is_some() {
                self.upsert_decision(bead)?;
            }
        }
        for agent in state.agents.values() {
            self.upsert_agent(agent)?;
        }
        for provider in state.providers.values() {
            self.upsert_provider(provider)?;
        }
        Ok(())
    }

    fn refresh_bead_and_neighbors(
        &self,
        state: &MaterializedState,
        id: &str,
    ) -> Result<(), StoreError> {
        if let Some(bead) = state.beads.get(id) {
            self.upsert_bead(bead)?;
            if let Some(agent_id) = bead.assigned_to.as_ref() {
                if let Some(agent) = state.agents.get(agent_id.as_str()) {
                    self.upsert_agent(agent)?;
                }
            }
        }
        Ok(())
    }

    fn upsert_project(&self, project: &braid_core::Project) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "INSERT INTO projects (id, name, source_url, auth, work_tree, bead_path, prefix, sticky, perpetual, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, source_url = excluded.source_url,
                auth = excluded.auth, work_tree = excluded.work_tree,
                bead_path = excluded.bead_path, prefix = excluded.prefix,
                sticky = excluded.sticky, perpetual = excluded.perpetual,
                status = excluded.status",
            params![
                project.id,
                project.name,
                project.source_url,
                project.auth.to_string(),
                project.work_tree.display().to_string(),
                project.bead_path.display().to_string(),
                project.prefix,
                project.sticky,
                project.perpetual,
                project.status.to_string(),
            ],
        )?;
        Ok(())
    }

    fn upsert_bead(&self, bead: &Bead) -> Result<(), StoreError> {
        let body = serde_json::to_string(bead)?;
        self.conn.lock().execute(
            "INSERT INTO beads (id, project, title, kind, priority, status, assigned_to, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                project = excluded.project, title = excluded.title,
                kind = excluded.kind, priority = excluded.priority,
                status = excluded.status, assigned_to = excluded.assigned_to,
                body = excluded.body, updated_at = excluded.updated_at",
            params![
                bead.id.as_str(),
                bead.project,
                bead.title,
                bead.kind.to_string(),
                bead.priority.to_string(),
                bead.status.to_string(),
                bead.assigned_to.as_ref().map(|a| a.as_str()),
                body,
                bead.created_at_ms,
                bead.updated_at_ms,
            ],
        )?;
        Ok(())
    }

    fn upsert_decision(&self, bead: &Bead) -> Result<(), StoreError> {
        let Some(decision) = bead.decision.as_ref() else {
            return Ok(());
        };
        let body = serde_json::to_string(decision)?;
        self.conn.lock().execute(
            "INSERT INTO decisions (id, project, question, decider, decision, decided_at, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                decider = excluded.decider, decision = excluded.decision,
                decided_at = excluded.decided_at, body = excluded.body",
            params![
                bead.id.as_str(),
                bead.project,
                decision.question,
                decision.decider,
                decision.decision,
                decision.decided_at_ms,
                body,
            ],
        )?;
        Ok(())
    }

    fn upsert_agent(&self, agent: &Agent) -> Result<(), StoreError> {
        let body = serde_json::to_string(agent)?;
        self.conn.lock().execute(
            "INSERT INTO agents (id, name, role, project, provider_id, status, current_bead, last_active, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, role = excluded.role,
                project = excluded.project, provider_id = excluded.provider_id,
                status = excluded.status, current_bead = excluded.current_bead,
                last_active = excluded.last_active, body = excluded.body",
            params![
                agent.id.as_str(),
                agent.name,
                agent.role,
                agent.project,
                agent.provider.as_ref().map(|p| p.as_str()),
                agent.status.to_string(),
                agent.current_bead.as_ref().map(|b| b.as_str()),
                agent.last_active_ms,
                body,
            ],
        )?;
        Ok(())
    }

    fn upsert_provider(&self, provider: &Provider) -> Result<(), StoreError> {
        let body = serde_json::to_string(provider)?;
        self.conn.lock().execute(
            "INSERT INTO providers (id, name, kind, endpoint, selected_model, status, last_heartbeat, latency_ms, last_error, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, kind = excluded.kind,
                endpoint = excluded.endpoint, selected_model = excluded.selected_model,
                status = excluded.status, last_heartbeat = excluded.last_heartbeat,
                latency_ms = excluded.latency_ms, last_error = excluded.last_error,
                body = excluded.body",
            params![
                provider.id.as_str(),
                provider.name,
                provider.kind,
                provider.endpoint,
                provider.selected_model,
                provider.status.to_string(),
                provider.last_heartbeat_ms,
                provider.last_latency_ms,
                provider.last_error,
                body,
            ],
        )?;
        Ok(())
    }

    /// Count rows in a table (hydration check and tests).
    pub fn count(&self, table: &str) -> Result<u64, StoreError> {
        // Table names come from our own schema, never user input.
        let conn = self.conn.lock();
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: u64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
