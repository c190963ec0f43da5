// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification adapter.

use async_trait::async_trait;

/// Notification seam; the daemon uses the desktop impl, tests the noop.
#[async_trait]
pub trait NotifyAdapter: Send + Sync {
    async fn notify(&self, title: &str, message: &str) -> Result<(), String>;
}

/// notify-rust backed notifications. Best effort: failures are the
/// caller's to log, never to propagate.
pub struct DesktopNotifier;

#[async_trait]
impl NotifyAdapter for DesktopNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), String> {
        let title = title.to_string();
        let message = message.to_string();
        let result = tokio::task::spawn_blocking(move || {
            notify_rust::Notification::new()
                .summary(&title)
                .body(&message)
                .show()
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .await;
        match result {
            Ok(inner) => inner,
            Err(e) => Err(format!("notify task panicked: {e}")),
        }
    }
}

/// Swallows notifications (headless daemons and tests).
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl NotifyAdapter for NoopNotifier {
    async fn notify(&self, _title: &str, _message: &str) -> Result<(), String> {
        Ok(())
    }
}
