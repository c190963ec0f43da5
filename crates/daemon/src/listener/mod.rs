// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and
//! handling them without blocking the engine loop. Mutations commit
//! through the runtime's managers; the engine loop reacts via the bus.

mod requests;

use crate::engine::Runtime;
use braid_core::Clock;
use braid_wire::{read_message, write_message, ProtocolError, Request};
use std::sync::Arc;
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, info};

/// Listener task for accepting socket connections.
pub struct Listener<C: Clock> {
    unix: UnixListener,
    runtime: Arc<Runtime<C>>,
    shutdown: Arc<Notify>,
}

impl<C: Clock + 'static> Listener<C> {
    pub fn new(unix: UnixListener, runtime: Arc<Runtime<C>>, shutdown: Arc<Notify>) -> Self {
        Self { unix, runtime, shutdown }
    }

    /// Run the accept loop until shutdown, spawning a task per connection.
    pub async fn run(self) {
        loop {
            tokio::select! {
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let runtime = Arc::clone(&self.runtime);
                        let shutdown = Arc::clone(&self.shutdown);
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            if let Err(e) =
                                handle_connection(reader, writer, runtime, shutdown).await
                            {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("accept error: {}", e),
                },
                _ = self.shutdown.notified() => {
                    info!("listener shutting down");
                    break;
                }
            }
        }
    }
}

async fn handle_connection<C, R, W>(
    mut reader: R,
    mut writer: W,
    runtime: Arc<Runtime<C>>,
    shutdown: Arc<Notify>,
) -> Result<(), ProtocolError>
where
    C: Clock + 'static,
    R: tokio::io::AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    loop {
        let request: Request = match read_message(&mut reader).await {
            Ok(request) => request,
            Err(ProtocolError::Closed) => return Ok(()),
            Err(e) => return Err(e),
        };
        debug!(request = ?request, "request received");

        let shutting_down = matches!(request, Request::Shutdown);
        let response = requests::handle_request(&runtime, request).await;
        write_message(&mut writer, &response).await?;

        if shutting_down {
            shutdown.notify_waiters();
            return Ok(());
        }
    }
}

fn log_connection_error(error: ProtocolError) {
    match error {
        ProtocolError::Closed => {}
        other => error!("connection error: {}", other),
    }
}
