// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| {
        pairs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn expands_references() {
    let lookup = env(&[("HOME", "/home/ci")]);
    let out = expand_env("state_dir = \"${HOME}/braid\"", &lookup).unwrap();
    assert_eq!(out, "state_dir = \"/home/ci/braid\"");
}

#[test]
fn expands_multiple_references() {
    let lookup = env(&[("A", "1"), ("B", "2")]);
    let out = expand_env("${A}-${B}-${A}", &lookup).unwrap();
    assert_eq!(out, "1-2-1");
}

#[test]
fn missing_variable_is_an_error() {
    let lookup = env(&[]);
    let err = expand_env("${NOPE}", &lookup).unwrap_err();
    match err {
        ConfigError::MissingEnv(name) => assert_eq!(name, "NOPE"),
        other => panic!("wrong error: {other:?}"),
    }
}

#[test]
fn double_dollar_escapes() {
    let lookup = env(&[]);
    let out = expand_env("literal $${NAME} stays", &lookup).unwrap();
    assert_eq!(out, "literal ${NAME} stays");
}

#[test]
fn text_without_references_passes_through() {
    let lookup = env(&[]);
    let raw = "plain = true\n# $5 and {braces} are fine";
    assert_eq!(expand_env(raw, &lookup).unwrap(), raw);
}
