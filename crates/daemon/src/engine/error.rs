// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime error taxonomy.
//!
//! Validation, conflict, and not-found errors surface synchronously to
//! callers; transient I/O degrades status and retries; infrastructure
//! failures at boot abort startup.

use braid_core::{BeadError, DecisionError};
use braid_storage::WalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Bead(#[from] BeadError),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("agent role '{role}' not allowed (allowed: {allowed})")]
    RoleNotAllowed { role: String, allowed: String },

    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    #[error("no healthy provider available")]
    NoProvider,

    #[error("unknown workflow id: {0}")]
    UnknownWorkflow(String),

    #[error("signal not valid for workflow {workflow}: {signal}")]
    InvalidSignal { workflow: String, signal: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("storage error: {0}")]
    Storage(#[from] WalError),
}

impl From<super::ExecuteError> for RuntimeError {
    fn from(e: super::ExecuteError) -> Self {
        match e {
            super::ExecuteError::Storage(e) => RuntimeError::Storage(e),
        }
    }
}

impl RuntimeError {
    /// Soft errors are expected races; callers retry or move on.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RuntimeError::Bead(BeadError::Conflict(_))
                | RuntimeError::Decision(DecisionError::AlreadyClaimed { .. })
        )
    }
}
