// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn bead_store_dir_joins_work_tree() {
    let p = Project::builder()
        .work_tree(PathBuf::from("/srv/src/web"))
        .bead_path(PathBuf::from(".beads"))
        .build();
    assert_eq!(p.bead_store_dir(), PathBuf::from("/srv/src/web/.beads"));
}

#[test]
fn readiness_fresh_within_ttl() {
    let r = Readiness { ready: true, issues: vec![], checked_at_ms: 1_000_000 };
    assert!(r.fresh(1_000_000 + READINESS_TTL_MS - 1));
    assert!(!r.fresh(1_000_000 + READINESS_TTL_MS));
}

#[yare::parameterized(
    none = { AuthMethod::None, "none" },
    ssh  = { AuthMethod::Ssh, "ssh" },
)]
fn auth_method_serde(auth: AuthMethod, tag: &str) {
    let json = serde_json::to_string(&auth).unwrap();
    assert_eq!(json, format!("\"{tag}\""));
}

#[test]
fn project_serde_roundtrips() {
    let p = Project::builder()
        .id("web")
        .prefix("web")
        .auth(AuthMethod::Ssh)
        .source_url("git@github.com:acme/web.git")
        .sticky(true)
        .build();
    let json = serde_json::to_string(&p).unwrap();
    let parsed: Project = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, p);
}
