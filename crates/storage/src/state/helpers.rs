// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for event appliers.

use std::collections::HashMap;

/// Find a value by exact key or unique key prefix.
///
/// Exact matches win; a prefix that matches more than one key returns
/// `None` (ambiguous).
pub(crate) fn find_by_prefix<'a, V>(map: &'a HashMap<String, V>, id: &str) -> Option<&'a V> {
    if let Some(v) = map.get(id) {
        return Some(v);
    }
    let mut matches = map.iter().filter(|(k, _)| k.starts_with(id));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.1)
}

/// Merge `incoming` into `context`, last-write-wins.
pub(crate) fn merge_context(
    context: &mut HashMap<String, String>,
    incoming: &HashMap<String, String>,
) {
    for (k, v) in incoming {
        context.insert(k.clone(), v.clone());
    }
}
