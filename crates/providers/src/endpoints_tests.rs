// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn appends_v1_when_missing() {
    assert_eq!(normalize("http://localhost:11434", "openai"), "http://localhost:11434/v1");
}

#[test]
fn keeps_existing_v1() {
    assert_eq!(normalize("http://localhost:11434/v1", "openai"), "http://localhost:11434/v1");
    assert_eq!(normalize("http://localhost:11434/v1/", "openai"), "http://localhost:11434/v1");
}

#[test]
fn non_v1_kinds_skip_normalization() {
    assert_eq!(normalize("http://localhost:9000", "raw"), "http://localhost:9000");
}

#[test]
fn explicit_port_probes_one_candidate() {
    let candidates = candidate_endpoints("http://gpu-box:8000", "openai");
    assert_eq!(candidates, vec!["http://gpu-box:8000/v1"]);
}

#[test]
fn portless_endpoint_enumerates_common_ports() {
    let candidates = candidate_endpoints("http://gpu-box", "openai");
    assert_eq!(
        candidates,
        vec![
            "http://gpu-box/v1",
            "http://gpu-box:11434/v1",
            "http://gpu-box:8000/v1",
            "http://gpu-box:1234/v1",
            "http://gpu-box:8080/v1",
        ]
    );
}

#[test]
fn pathed_endpoint_is_not_port_expanded() {
    let candidates = candidate_endpoints("http://gpu-box/api", "openai");
    assert_eq!(candidates, vec!["http://gpu-box/api/v1"]);
}

#[test]
fn candidates_are_deduplicated() {
    let candidates = candidate_endpoints("http://localhost:11434/v1", "openai");
    assert_eq!(candidates.len(), 1);
}
