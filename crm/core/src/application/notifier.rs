// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Event Notifier
//!
//! Wraps the [`MessageBus`] port. Each publish runs on its own spawned task so
//! the caller never waits on the bus; failures are logged and counted, never
//! returned. The store write is the source of truth.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Best-effort, at-most-once delivery of entity events

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::bus::MessageBus;
use crate::domain::events::EntityEvent;

#[derive(Clone)]
pub struct EventNotifier {
    bus: Arc<dyn MessageBus>,
}

impl EventNotifier {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    /// Publish `event` in the background. The returned handle is only useful
    /// to tests; production callers drop it.
    pub fn publish(&self, token: &CancellationToken, event: EntityEvent) -> JoinHandle<()> {
        let bus = self.bus.clone();
        let token = token.clone();

        tokio::spawn(async move {
            let topic = event.event.clone();
            let key = event.key();

            let payload = match serde_json::to_vec(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(topic = %topic, key = %key, "Failed to encode entity event: {}", e);
                    metrics::counter!("crm_event_publish_failures_total", "topic" => topic)
                        .increment(1);
                    return;
                }
            };

            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(topic = %topic, key = %key, "Event publish abandoned after cancellation");
                    return;
                }
                outcome = bus.publish(&topic, &key, payload) => outcome,
            };

            match outcome {
                Ok(()) => {
                    debug!(topic = %topic, key = %key, "Published entity event");
                    metrics::counter!("crm_events_published_total", "topic" => topic).increment(1);
                }
                Err(e) => {
                    warn!(topic = %topic, key = %key, "Failed to publish entity event: {}", e);
                    metrics::counter!("crm_event_publish_failures_total", "topic" => topic)
                        .increment(1);
                }
            }
        })
    }
}
