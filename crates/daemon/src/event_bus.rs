// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, non-blocking event bus.
//!
//! One bounded channel feeds the engine loop; any number of filtered
//! subscribers get best-effort copies. Delivery is at-most-once and
//! unordered across publishers. Overflow drops the event and reports
//! `BufferFull`: lossy telemetry, never lossy state (state lives in the
//! store before anything is published).

use braid_core::Event;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Per-subscriber buffer; slow subscribers drop, they never block.
const SUBSCRIBER_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("event bus buffer full")]
    BufferFull,
}

type Filter = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

struct Subscriber {
    filter: Filter,
    tx: mpsc::Sender<Event>,
}

/// Cloneable bus handle.
#[derive(Clone)]
pub struct EventBus {
    engine_tx: mpsc::Sender<Event>,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    /// Create the bus; the returned receiver is the engine loop's intake.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<Event>) {
        let (engine_tx, engine_rx) = mpsc::channel(buffer);
        let bus = Self { engine_tx, subscribers: Arc::new(Mutex::new(Vec::new())) };
        (bus, engine_rx)
    }

    /// Publish an event. Never blocks.
    ///
    /// Subscribers are best-effort regardless of the outcome; the error
    /// reports only the engine intake overflowing.
    pub fn publish(&self, event: Event) -> Result<(), PublishError> {
        {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|s| !s.tx.is_closed());
            for subscriber in subscribers.iter() {
                if (subscriber.filter)(&event) {
                    // Full or closed subscriber buffers drop silently.
                    let _ = subscriber.tx.try_send(event.clone());
                }
            }
        }

        match self.engine_tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(event = event.type_tag(), "event bus full, dropping");
                Err(PublishError::BufferFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Ok(()),
        }
    }

    /// Register a filtered subscriber.
    pub fn subscribe(
        &self,
        filter: impl Fn(&Event) -> bool + Send + Sync + 'static,
    ) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        self.subscribers.lock().push(Subscriber { filter: Arc::new(filter), tx });
        rx
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
