// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::agent::AgentId;
use crate::timer::TimerId;

#[test]
fn generated_ids_have_prefix_and_fixed_length() {
    let id = AgentId::new();
    assert!(id.as_str().starts_with("agt-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn generated_ids_are_unique() {
    let a = AgentId::new();
    let b = AgentId::new();
    assert_ne!(a, b);
}

#[test]
fn from_string_round_trips() {
    let id = AgentId::from_string("agt-abc123");
    assert_eq!(id.as_str(), "agt-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn short_truncates_suffix() {
    let id = AgentId::from_string("agt-abcdefgh");
    assert_eq!(id.short(4), "abcd");
    assert_eq!(id.short(100), "abcdefgh");
}

#[test]
fn idbuf_borrow_matches_str_hash() {
    use std::collections::HashMap;
    let id = AgentId::from_string("agt-xyz");
    let mut map: HashMap<AgentId, u32> = HashMap::new();
    map.insert(id, 7);
    // Borrow<str> lookup must find the same entry
    assert_eq!(map.get("agt-xyz"), Some(&7));
}

#[test]
fn bare_ids_accept_long_strings() {
    let id = TimerId::new("decision-timeout:proj-0123456789abcdef");
    assert_eq!(id.as_str(), "decision-timeout:proj-0123456789abcdef");
}

#[test]
fn serde_transparent() {
    let id = AgentId::from_string("agt-abc");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"agt-abc\"");
    let parsed: AgentId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn short_helper() {
    assert_eq!(short("abcdef", 3), "abc");
    assert_eq!(short("ab", 3), "ab");
}
