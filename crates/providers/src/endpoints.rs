// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Endpoint normalization and probe candidates.

/// Provider kinds whose API is not rooted at `/v1`.
const NON_V1_KINDS: &[&str] = &["raw"];

/// Ports local inference servers commonly listen on (ollama, vllm,
/// LM Studio, generic).
const COMMON_PORTS: &[u16] = &[11434, 8000, 1234, 8080];

/// Append `/v1` unless the path already ends in it or the kind opts out.
pub(crate) fn normalize(endpoint: &str, kind: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if NON_V1_KINDS.contains(&kind) || trimmed.ends_with("/v1") {
        return trimmed.to_string();
    }
    format!("{trimmed}/v1")
}

/// Whether the endpoint names an explicit port (`host:port`).
fn has_port(endpoint: &str) -> bool {
    let without_scheme = endpoint
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(endpoint);
    let authority = without_scheme.split('/').next().unwrap_or(without_scheme);
    match authority.rsplit_once(':') {
        Some((_, port)) => port.chars().all(|c| c.is_ascii_digit()) && !port.is_empty(),
        None => false,
    }
}

/// Ordered probe candidates for a registered endpoint.
///
/// The registered endpoint always probes first. When it names no port,
/// the common local-inference ports are tried next. Every candidate is
/// normalized (`/v1` appended unless the kind opts out) and deduplicated
/// preserving order.
pub fn candidate_endpoints(endpoint: &str, kind: &str) -> Vec<String> {
    let mut candidates = vec![normalize(endpoint, kind)];

    let trimmed = endpoint.trim_end_matches('/');
    let path_free = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed)
        .split('/')
        .nth(1)
        .is_none();
    if !has_port(endpoint) && path_free {
        for port in COMMON_PORTS {
            candidates.push(normalize(&format!("{trimmed}:{port}"), kind));
        }
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

#[cfg(test)]
#[path = "endpoints_tests.rs"]
mod tests;
