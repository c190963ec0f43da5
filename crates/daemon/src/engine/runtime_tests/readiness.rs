// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Harness;
use crate::engine::readiness::probe_project;
use braid_core::project::READINESS_REFILE_MS;
use braid_core::AuthMethod;
use std::time::Duration;

#[tokio::test]
async fn probe_flags_missing_bead_store() {
    let dir = tempfile::tempdir().unwrap();
    let probe = probe_project(
        None,
        AuthMethod::None,
        &dir.path().join("nope"),
        dir.path(),
        "proj",
    )
    .await;
    assert!(!probe.ready);
    assert!(probe.issues.iter().any(|i| i.contains("bead store missing")));
}

#[tokio::test]
async fn probe_accepts_existing_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    std::fs::create_dir_all(&store).unwrap();
    std::fs::write(store.join("issues.jsonl"), "").unwrap();

    let probe = probe_project(None, AuthMethod::None, &store, dir.path(), "proj").await;
    assert!(probe.ready, "issues: {:?}", probe.issues);
}

#[tokio::test]
async fn ssh_auth_requires_key_and_ssh_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    std::fs::create_dir_all(&store).unwrap();
    std::fs::write(store.join("issues.jsonl"), "").unwrap();

    let probe = probe_project(
        Some("https://github.com/acme/web.git"),
        AuthMethod::Ssh,
        &store,
        dir.path(),
        "web",
    )
    .await;
    assert!(!probe.ready);
    assert!(probe.issues.iter().any(|i| i.contains("ssh key missing")));
    assert!(probe.issues.iter().any(|i| i.contains("not ssh-shaped")));
}

#[tokio::test]
async fn ssh_probe_embeds_public_key() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store");
    std::fs::create_dir_all(&store).unwrap();
    std::fs::write(store.join("issues.jsonl"), "").unwrap();

    let key_dir = dir.path().join("keys").join("web");
    std::fs::create_dir_all(&key_dir).unwrap();
    std::fs::write(key_dir.join("id_ed25519"), "private").unwrap();
    std::fs::write(key_dir.join("id_ed25519.pub"), "ssh-ed25519 AAAA test\n").unwrap();

    let probe = probe_project(
        // An https url keeps one issue open so the key is surfaced.
        Some("https://github.com/acme/web.git"),
        AuthMethod::Ssh,
        &store,
        &dir.path().join("keys"),
        "web",
    )
    .await;
    assert_eq!(probe.public_key.as_deref(), Some("ssh-ed25519 AAAA test"));
}

#[tokio::test]
async fn readiness_failure_auto_files_one_p0_bead() {
    let harness = Harness::new().with_project("proj");
    let issues = vec!["bead store missing: /x".to_string()];

    harness.runtime.file_readiness_bead("proj", &issues, None).unwrap();
    // Same issue set inside the 30-minute window: no second bead.
    harness.runtime.file_readiness_bead("proj", &issues, None).unwrap();

    let filed: Vec<braid_core::Bead> = harness.runtime.lock_state(|s| {
        s.beads.values().filter(|b| b.tags.iter().any(|t| t == "auto-filed")).cloned().collect()
    });
    assert_eq!(filed.len(), 1);
    let bead = &filed[0];
    assert_eq!(bead.priority, braid_core::Priority::P0);
    assert_eq!(bead.kind, braid_core::BeadKind::Bug);
    assert!(bead.tags.iter().any(|t| t == "readiness"));
    assert!(bead.tags.iter().any(|t| t == "p0"));
}

#[tokio::test]
async fn distinct_issue_sets_file_separately() {
    let harness = Harness::new().with_project("proj");
    harness
        .runtime
        .file_readiness_bead("proj", &["issue a".to_string()], None)
        .unwrap();
    harness
        .runtime
        .file_readiness_bead("proj", &["issue b".to_string()], None)
        .unwrap();

    let count = harness.runtime.lock_state(|s| {
        s.beads.values().filter(|b| b.tags.iter().any(|t| t == "auto-filed")).count()
    });
    assert_eq!(count, 2);
}

#[tokio::test]
async fn refile_allowed_after_throttle_window() {
    let harness = Harness::new().with_project("proj");
    let issues = vec!["issue".to_string()];

    harness.runtime.file_readiness_bead("proj", &issues, None).unwrap();
    harness.clock.advance(Duration::from_millis(READINESS_REFILE_MS + 1));
    harness.runtime.file_readiness_bead("proj", &issues, None).unwrap();

    let count = harness.runtime.lock_state(|s| {
        s.beads.values().filter(|b| b.tags.iter().any(|t| t == "auto-filed")).count()
    });
    assert_eq!(count, 2);
}

#[tokio::test]
async fn auto_filed_bead_embeds_public_key() {
    let harness = Harness::new().with_project("proj");
    harness
        .runtime
        .file_readiness_bead("proj", &["ssh key missing".to_string()], Some("ssh-ed25519 AAAA"))
        .unwrap();
    let bead = harness.runtime.lock_state(|s| {
        s.beads.values().find(|b| b.tags.iter().any(|t| t == "readiness")).cloned()
    });
    assert!(bead.unwrap().description.contains("ssh-ed25519 AAAA"));
}
