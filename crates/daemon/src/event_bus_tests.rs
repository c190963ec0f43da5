// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use braid_core::test_support::{bead_created, provider_healthy};
use braid_core::Priority;

#[tokio::test]
async fn publish_reaches_engine_intake() {
    let (bus, mut rx) = EventBus::new(8);
    bus.publish(bead_created("proj-1", "proj", Priority::P0)).unwrap();

    let received = rx.recv().await.unwrap();
    assert_eq!(received.type_tag(), "bead:created");
}

#[tokio::test]
async fn overflow_returns_buffer_full_and_drops() {
    let (bus, mut rx) = EventBus::new(1);
    bus.publish(bead_created("proj-1", "proj", Priority::P0)).unwrap();
    let err = bus.publish(bead_created("proj-2", "proj", Priority::P0)).unwrap_err();
    assert_eq!(err, PublishError::BufferFull);

    // Only the first event survived.
    let first = rx.recv().await.unwrap();
    assert!(matches!(first, Event::BeadCreated { id, .. } if id == "proj-1"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn subscribers_only_see_matching_events() {
    let (bus, _rx) = EventBus::new(8);
    let mut heartbeat_rx =
        bus.subscribe(|event| matches!(event, Event::ProviderHeartbeat { .. }));

    bus.publish(bead_created("proj-1", "proj", Priority::P0)).unwrap();
    bus.publish(provider_healthy("prv-1", "llama3", 5)).unwrap();

    let received = heartbeat_rx.recv().await.unwrap();
    assert_eq!(received.type_tag(), "provider:heartbeat");
    assert!(heartbeat_rx.try_recv().is_err());
}

#[tokio::test]
async fn dropped_subscribers_are_pruned() {
    let (bus, _rx) = EventBus::new(8);
    let subscriber = bus.subscribe(|_| true);
    drop(subscriber);

    // Publishing after the receiver dropped neither errors nor leaks.
    bus.publish(bead_created("proj-1", "proj", Priority::P0)).unwrap();
    bus.publish(bead_created("proj-2", "proj", Priority::P0)).unwrap();
}

#[tokio::test]
async fn slow_subscriber_never_blocks_publish() {
    let (bus, _rx) = EventBus::new(128);
    // Subscriber with a tiny buffer that is never drained.
    let _slow = bus.subscribe(|_| true);
    for i in 0..100 {
        bus.publish(bead_created(&format!("proj-{i}"), "proj", Priority::P0)).unwrap();
    }
}
