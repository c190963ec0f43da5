// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${NAME}` environment expansion over the raw config text.

use crate::ConfigError;

/// Expand `${NAME}` references using `lookup`.
///
/// `$${NAME}` escapes to a literal `${NAME}`. A reference whose variable is
/// unset fails the load: configs must not silently degrade to empty strings.
pub fn expand_env(
    raw: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    // Names are shell-style: letters, digits, underscore, not starting with a digit.
    static PATTERN: &str = r"\$\$?\{([A-Za-z_][A-Za-z0-9_]*)\}";
    let re = regex::Regex::new(PATTERN).unwrap_or_else(|_| unreachable!("static pattern"));

    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in re.captures_iter(raw) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        out.push_str(&raw[last..whole.start()]);
        last = whole.end();

        let name = &caps[1];
        if whole.as_str().starts_with("$$") {
            // Escaped: emit literally without the extra dollar.
            out.push_str("${");
            out.push_str(name);
            out.push('}');
            continue;
        }
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => return Err(ConfigError::MissingEnv(name.to_string())),
        }
    }
    out.push_str(&raw[last..]);
    Ok(out)
}

#[cfg(test)]
#[path = "expand_tests.rs"]
mod tests;
