// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Personas are pure data: a string-to-string record describing how an
//! agent should behave. Loading them from files is a frontend concern.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A persona record (mission / character / focus / standards, plus anything
/// else the persona file declares). Never code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Persona(pub HashMap<String, String>);

impl Persona {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn mission(&self) -> Option<&str> {
        self.get("mission")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Persona {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }
}
