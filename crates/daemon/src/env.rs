// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-level constants and environment knobs.

use std::time::Duration;

/// Wire protocol version exchanged in the Hello handshake.
pub const PROTOCOL_VERSION: &str = "1";

/// Per-request IPC handling ceiling.
pub const IPC_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a `QueryProvider` request may wait for its completion event
/// (the workflow-level ceiling for ephemeral provider queries).
pub const QUERY_WAIT: Duration = Duration::from_secs(5 * 60);

/// Retries for the chat completion activity after the first attempt.
pub const QUERY_RETRIES: u32 = 2;

/// Config path fallback when neither the CLI argument nor `BRAID_CONFIG`
/// names one.
pub const DEFAULT_CONFIG: &str = "braid.toml";

/// Resolve the config path: argv[1], then `$BRAID_CONFIG`, then default.
pub fn config_path(args: &[String]) -> std::path::PathBuf {
    if let Some(path) = args.get(1) {
        return path.into();
    }
    if let Ok(path) = std::env::var("BRAID_CONFIG") {
        if !path.is_empty() {
            return path.into();
        }
    }
    DEFAULT_CONFIG.into()
}
