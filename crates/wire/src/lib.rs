// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC Protocol for daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod query;
mod request;
mod response;
mod types;
mod wire;

pub use query::{Query, QueryReply, WorkflowQuery};
pub use request::{BeadChanges, Request, Signal};
pub use response::Response;
pub use types::{
    AgentSummary, BeadDetail, BeadSummary, DecisionSummary, ErrorKind, ProviderSummary,
    StatusSummary,
};
pub use wire::{decode, encode, read_message, write_message, ProtocolError};
