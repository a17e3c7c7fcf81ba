// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
// Broadcast Bus - In-process pub/sub for entity events
//
// Delivers published records to every live subscriber through a tokio
// broadcast channel. Used for development, tests, and single-node
// deployments that have no Kafka REST proxy.
//
// Records are lost on restart and slow subscribers drop the oldest records.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::bus::{BusError, MessageBus};

/// One published record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    /// Decode the payload as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[derive(Clone)]
pub struct BroadcastBus {
    sender: Arc<broadcast::Sender<BusMessage>>,
}

impl BroadcastBus {
    /// Create a bus buffering at most `capacity` records per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Subscribe to every topic
    pub fn subscribe(&self) -> BusReceiver {
        BusReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to a single topic, skipping everything else
    pub fn subscribe_topic(&self, topic: impl Into<String>) -> TopicReceiver {
        TopicReceiver {
            receiver: self.sender.subscribe(),
            topic: topic.into(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl MessageBus for BroadcastBus {
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), BusError> {
        let message = BusMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload,
        };

        // send() only fails when nobody is listening; that is not an error here.
        let receiver_count = self.sender.send(message).unwrap_or(0);
        if receiver_count == 0 {
            debug!(topic, "No subscribers listening to topic");
        }
        Ok(())
    }
}

fn recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Bus receiver lagged by {} records", n);
            EventBusError::Lagged(n)
        }
    }
}

/// Receiver for all topics
pub struct BusReceiver {
    receiver: broadcast::Receiver<BusMessage>,
}

impl BusReceiver {
    pub async fn recv(&mut self) -> Result<BusMessage, EventBusError> {
        self.receiver.recv().await.map_err(recv_error)
    }

    pub fn try_recv(&mut self) -> Result<BusMessage, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Bus receiver lagged by {} records", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Receiver filtered to one topic
pub struct TopicReceiver {
    receiver: broadcast::Receiver<BusMessage>,
    topic: String,
}

impl TopicReceiver {
    pub async fn recv(&mut self) -> Result<BusMessage, EventBusError> {
        loop {
            let message = self.receiver.recv().await.map_err(recv_error)?;
            if message.topic == self.topic {
                return Ok(message);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = BroadcastBus::new(10);
        let mut receiver = bus.subscribe();

        bus.publish("lead-created", "5", b"{\"id\":5}".to_vec())
            .await
            .unwrap();

        let message = receiver.recv().await.unwrap();
        assert_eq!(message.topic, "lead-created");
        assert_eq!(message.key, "5");
        let value: serde_json::Value = message.json().unwrap();
        assert_eq!(value["id"], 5);
    }

    #[tokio::test]
    async fn test_topic_filtering() {
        let bus = BroadcastBus::new(10);
        let mut receiver = bus.subscribe_topic("task-updated");

        bus.publish("task-created", "1", Vec::new()).await.unwrap();
        bus.publish("task-updated", "1", Vec::new()).await.unwrap();

        let message = receiver.recv().await.unwrap();
        assert_eq!(message.topic, "task-updated");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = BroadcastBus::default();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.publish("company-deleted", "3", Vec::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = BroadcastBus::new(10);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish("contact-created", "9", Vec::new()).await.unwrap();

        assert_eq!(first.recv().await.unwrap().key, "9");
        assert_eq!(second.recv().await.unwrap().key, "9");
        assert!(matches!(first.try_recv(), Err(EventBusError::Empty)));
    }
}
