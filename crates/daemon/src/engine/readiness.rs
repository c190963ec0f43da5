// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project readiness: SSH key, git remote, bead store.
//!
//! The probe runs as a background activity; results land in the 2-minute
//! cache via `project:readiness` events. Failing projects auto-file one
//! P0 bead per distinct issue set per 30 minutes.

use super::{Runtime, RuntimeError};
use braid_core::project::READINESS_REFILE_MS;
use braid_core::{AuthMethod, BeadKind, Clock, Effect, Priority};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Ceiling for the git remote probe.
const GIT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one readiness probe.
#[derive(Debug, Default)]
pub struct ReadinessProbe {
    pub ready: bool,
    pub issues: Vec<String>,
    /// Embedded in auto-filed beads when SSH setup is incomplete.
    pub public_key: Option<String>,
}

/// Probe a project: SSH key shape, git remote access, bead store layout.
pub(crate) async fn probe_project(
    source_url: Option<&str>,
    auth: AuthMethod,
    bead_store: &Path,
    key_dir: &Path,
    project: &str,
) -> ReadinessProbe {
    let mut probe = ReadinessProbe::default();

    if auth == AuthMethod::Ssh {
        let key_path = key_dir.join(project).join("id_ed25519");
        if !key_path.exists() {
            probe
                .issues
                .push(format!("ssh key missing: {}", key_path.display()));
        } else {
            probe.public_key = read_public_key(&key_path);
        }
        match source_url {
            Some(url) if url.starts_with("git@") || url.starts_with("ssh://") => {}
            Some(url) => probe.issues.push(format!("repo url is not ssh-shaped: {url}")),
            None => probe.issues.push("ssh auth configured but no source url".to_string()),
        }
    }

    if let Some(url) = source_url {
        if probe.issues.is_empty() {
            if let Some(issue) = probe_git_remote(url).await {
                probe.issues.push(issue);
            }
        }
    }

    if !braid_storage::is_bead_store(bead_store) {
        probe
            .issues
            .push(format!("bead store missing: {}", bead_store.display()));
    }

    probe.ready = probe.issues.is_empty();
    probe
}

fn read_public_key(key_path: &Path) -> Option<String> {
    let pub_path = PathBuf::from(format!("{}.pub", key_path.display()));
    std::fs::read_to_string(pub_path).ok().map(|s| s.trim().to_string())
}

/// `git ls-remote --exit-code <url> HEAD` with a hard timeout.
async fn probe_git_remote(url: &str) -> Option<String> {
    let mut command = tokio::process::Command::new("git");
    command
        .arg("ls-remote")
        .arg("--exit-code")
        .arg(url)
        .arg("HEAD")
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return Some(format!("git unavailable: {e}")),
    };

    match tokio::time::timeout(GIT_PROBE_TIMEOUT, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => None,
        Ok(Ok(output)) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Some(format!("git remote unreachable: {}", stderr.trim()))
        }
        Ok(Err(e)) => Some(format!("git probe failed: {e}")),
        Err(_) => Some("git probe timed out".to_string()),
    }
}

impl<C: Clock> Runtime<C> {
    /// Build the readiness-check effect for a project.
    pub(crate) fn readiness_check_effect(&self, project: &str) -> Option<Effect> {
        self.lock_state(|state| {
            state.projects.get(project).map(|p| Effect::CheckReadiness {
                project: p.id.clone(),
                source_url: p.source_url.clone(),
                auth: p.auth,
                bead_store: p.bead_store_dir(),
                key_dir: self.settings.key_dir.clone(),
            })
        })
    }

    /// Auto-file one P0 bead per distinct issue set per 30 minutes.
    pub(crate) fn file_readiness_bead(
        &self,
        project: &str,
        issues: &[String],
        public_key: Option<&str>,
    ) -> Result<(), RuntimeError> {
        let fingerprint = issues.join("\n");
        let now = self.now_ms();
        {
            let mut filed = self.readiness_filed.lock();
            if let Some((last_fingerprint, filed_at)) = filed.get(project) {
                if *last_fingerprint == fingerprint
                    && now.saturating_sub(*filed_at) < READINESS_REFILE_MS
                {
                    return Ok(());
                }
            }
            filed.insert(project.to_string(), (fingerprint, now));
        }

        let mut description = format!(
            "Project readiness check failed.\n\nIssues:\n{}",
            issues.iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n")
        );
        if let Some(key) = public_key {
            description.push_str(&format!("\n\nPublic key:\n{key}\n"));
        }

        let bead = self.create_bead(super::beads::CreateBead {
            project: project.to_string(),
            title: format!("Project {project} is not ready"),
            description,
            kind: BeadKind::Bug,
            priority: Priority::P0,
            tags: vec!["auto-filed".to_string(), "readiness".to_string(), "p0".to_string()],
            context: HashMap::new(),
        })?;
        tracing::warn!(project, bead = %bead.id, ?issues, "auto-filed readiness bead");
        Ok(())
    }
}
