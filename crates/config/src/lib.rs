// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! braid-config: the single configuration document for the daemon.
//!
//! One TOML file declares server paths, agent limits, dispatch policy,
//! projects, providers, the model catalog, and motivations. `${NAME}`
//! references are expanded from the environment at load time; a missing
//! variable is a load error, not a silent empty string.

mod catalog;
mod expand;

pub use catalog::{CatalogEntry, ModelCatalog};
pub use expand::expand_env;

use braid_core::{AuthMethod, MotivationKind, SelectionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors from loading or validating the config document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable not set: {0}")]
    MissingEnv(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How dispatch treats a project that fails its readiness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessMode {
    /// Log and dispatch anyway.
    Warn,
    /// Skip the project until it is ready.
    #[default]
    Block,
}

/// Coarse sizing profile for the default agent pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorpProfile {
    Solo,
    #[default]
    Startup,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Unix socket the wire protocol listens on.
    pub socket: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket: PathBuf::from("braidd.sock"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root state directory (WAL, snapshots, per-project keys).
    pub state_dir: PathBuf,
    /// Relational mirror, relative to `state_dir` unless absolute.
    pub db_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("data"),
            db_file: PathBuf::from("braid.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLimits {
    pub max_concurrent: u32,
    pub heartbeat_interval_secs: u64,
    pub file_lock_timeout_secs: u64,
    /// Roles agents may be spawned with; empty means unrestricted.
    pub allowed_roles: Vec<String>,
    pub corp_profile: CorpProfile,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_concurrent: 8,
            heartbeat_interval_secs: 30,
            file_lock_timeout_secs: 300,
            allowed_roles: Vec::new(),
            corp_profile: CorpProfile::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub interval_secs: u64,
    /// Reassignments before a bead is escalated instead of redispatched.
    pub max_hops: u32,
    pub readiness_mode: ReadinessMode,
    /// Bead kind → required agent role. Unlisted kinds accept any role.
    pub role_map: HashMap<String, String>,
    pub selection_policy: SelectionPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_hops: 3,
            readiness_mode: ReadinessMode::default(),
            role_map: HashMap::new(),
            selection_policy: SelectionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Reserved: external durable-workflow runtime host. The built-in
    /// event-sourced runtime ignores it beyond logging at boot.
    pub host: Option<String>,
    pub master_beat_secs: u64,
    pub provider_beat_secs: u64,
    pub decision_timeout_hours: u64,
    pub event_buffer: usize,
    /// Motivations fired per master beat, at most.
    pub motivation_storm_cap: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            host: None,
            master_beat_secs: 10,
            provider_beat_secs: 30,
            decision_timeout_hours: 48,
            event_buffer: 1000,
            motivation_storm_cap: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Directory holding per-project SSH keys (`<key_dir>/<project>/id_ed25519`).
    pub key_dir: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self { key_dir: PathBuf::from("data/projects") }
    }
}

/// One project declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub auth: AuthMethod,
    /// Work tree; defaults to `src/<id>` under the state dir.
    #[serde(default)]
    pub work_tree: Option<PathBuf>,
    #[serde(default = "default_bead_path")]
    pub bead_path: PathBuf,
    /// Bead id prefix; defaults to the project id.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub sticky: bool,
    #[serde(default)]
    pub perpetual: bool,
}

fn default_bead_path() -> PathBuf {
    PathBuf::from(".beads")
}

/// One provider declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_provider_kind")]
    pub kind: String,
    pub endpoint: String,
    #[serde(default)]
    pub model: Option<String>,
}

fn default_provider_kind() -> String {
    "openai".to_string()
}

/// One motivation declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotivationEntry {
    pub id: String,
    pub kind: MotivationKind,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub cooldown_secs: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// The whole configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub agents: AgentLimits,
    pub dispatch: DispatchConfig,
    pub workflow: WorkflowConfig,
    pub git: GitConfig,
    #[serde(rename = "project")]
    pub projects: Vec<ProjectEntry>,
    #[serde(rename = "provider")]
    pub providers: Vec<ProviderEntry>,
    #[serde(rename = "model")]
    pub models: Vec<CatalogEntry>,
    #[serde(rename = "motivation")]
    pub motivations: Vec<MotivationEntry>,
}

impl Config {
    /// Load from a TOML file, expanding `${NAME}` from the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&raw)
    }

    /// Parse from a TOML string (already read from disk).
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env(raw, &|name| std::env::var(name).ok())?;
        let config: Config = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for p in &self.projects {
            if p.id.is_empty() {
                return Err(ConfigError::Invalid("project id must not be empty".into()));
            }
            if !seen.insert(&p.id) {
                return Err(ConfigError::Invalid(format!("duplicate project id: {}", p.id)));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for p in &self.providers {
            if !seen.insert(&p.id) {
                return Err(ConfigError::Invalid(format!("duplicate provider id: {}", p.id)));
            }
        }
        if self.workflow.event_buffer == 0 {
            return Err(ConfigError::Invalid("workflow.event_buffer must be > 0".into()));
        }
        if self.dispatch.interval_secs == 0 {
            return Err(ConfigError::Invalid("dispatch.interval_secs must be > 0".into()));
        }
        Ok(())
    }

    /// The model catalog assembled from `[[model]]` entries.
    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.models.clone())
    }

    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_secs(self.dispatch.interval_secs)
    }

    pub fn provider_beat(&self) -> Duration {
        Duration::from_secs(self.workflow.provider_beat_secs)
    }

    pub fn master_beat(&self) -> Duration {
        Duration::from_secs(self.workflow.master_beat_secs)
    }

    pub fn decision_timeout(&self) -> Duration {
        Duration::from_secs(self.workflow.decision_timeout_hours * 3600)
    }
}

impl ProjectEntry {
    /// Materialize into the core record, filling derived defaults.
    pub fn to_project(&self, state_dir: &Path) -> braid_core::Project {
        braid_core::Project {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            source_url: self.source_url.clone(),
            auth: self.auth,
            work_tree: self
                .work_tree
                .clone()
                .unwrap_or_else(|| state_dir.join("src").join(&self.id)),
            bead_path: self.bead_path.clone(),
            prefix: self.prefix.clone().unwrap_or_else(|| self.id.clone()),
            sticky: self.sticky,
            perpetual: self.perpetual,
            status: braid_core::ProjectStatus::Active,
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
