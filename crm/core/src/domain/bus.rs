// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Message Bus Port
//!
//! Fire-and-forget publishing capability. Implementations live in
//! `crate::infrastructure` (in-process broadcast, Kafka REST proxy).
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Publish contract consumed by the event notifier

use async_trait::async_trait;

#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish one record. `key` selects the partition on partitioned buses.
    async fn publish(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), BusError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Bus transport error: {0}")]
    Transport(String),

    #[error("Bus rejected record with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Bus publish timed out")]
    Timeout,

    #[error("Bus is closed")]
    Closed,
}
