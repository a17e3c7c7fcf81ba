// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory
//!
//! Creates the concrete store and bus adapters selected by configuration.
//! The domain layer only sees the `EntityRepository` and `MessageBus` traits.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Backend selection for storage and messaging

use std::sync::Arc;
use std::time::Duration;

use crate::application::crm_services::RepositorySet;
use crate::domain::bus::MessageBus;
use crate::domain::repository::StorageBackend;
use crate::domain::service_config::{BusBackend, BusConfig};
use crate::infrastructure::db::Database;
use crate::infrastructure::event_bus::BroadcastBus;
use crate::infrastructure::kafka_rest::KafkaRestBus;
use crate::infrastructure::repositories::postgres::PostgresRepository;
use crate::infrastructure::repositories::{InMemoryRepository, InMemoryStore};

/// Creates the repository set for the configured backend.
///
/// The PostgreSQL backend needs a connected [`Database`]; the in-memory
/// backend ignores it.
pub fn create_repositories(
    backend: &StorageBackend,
    database: Option<&Database>,
) -> anyhow::Result<RepositorySet> {
    match backend {
        StorageBackend::InMemory => Ok(create_in_memory_repositories(InMemoryStore::new())),
        StorageBackend::PostgreSQL(_) => {
            let database = database.ok_or_else(|| {
                anyhow::anyhow!("PostgreSQL backend selected but no database connection was provided")
            })?;
            let pool = database.get_pool().clone();
            Ok(RepositorySet {
                activities: Arc::new(PostgresRepository::new(pool.clone())),
                tasks: Arc::new(PostgresRepository::new(pool.clone())),
                contacts: Arc::new(PostgresRepository::new(pool.clone())),
                companies: Arc::new(PostgresRepository::new(pool.clone())),
                leads: Arc::new(PostgresRepository::new(pool.clone())),
                opportunities: Arc::new(PostgresRepository::new(pool)),
            })
        }
    }
}

/// Repositories sharing one in-process store, so references and cascades
/// work across entities.
pub fn create_in_memory_repositories(store: InMemoryStore) -> RepositorySet {
    RepositorySet {
        activities: Arc::new(InMemoryRepository::new(store.clone())),
        tasks: Arc::new(InMemoryRepository::new(store.clone())),
        contacts: Arc::new(InMemoryRepository::new(store.clone())),
        companies: Arc::new(InMemoryRepository::new(store.clone())),
        leads: Arc::new(InMemoryRepository::new(store.clone())),
        opportunities: Arc::new(InMemoryRepository::new(store)),
    }
}

/// Creates the message bus for the configured backend.
pub fn create_message_bus(config: &BusConfig) -> anyhow::Result<Arc<dyn MessageBus>> {
    match config.backend {
        BusBackend::Broadcast => Ok(Arc::new(BroadcastBus::new(config.capacity))),
        BusBackend::KafkaRest => {
            let endpoint = config
                .endpoint
                .as_deref()
                .filter(|e| !e.is_empty())
                .ok_or_else(|| anyhow::anyhow!("kafka-rest bus requires spec.bus.endpoint"))?;
            let bus = KafkaRestBus::new(
                endpoint,
                Duration::from_secs(config.publish_timeout_seconds),
            )?;
            Ok(Arc::new(bus))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::PostgresConfig;

    #[test]
    fn test_postgres_requires_database() {
        let backend = StorageBackend::PostgreSQL(PostgresConfig {
            connection_string: "postgres://localhost/crm".to_string(),
            max_connections: 1,
        });
        assert!(create_repositories(&backend, None).is_err());
    }

    #[test]
    fn test_kafka_rest_requires_endpoint() {
        let config = BusConfig {
            backend: BusBackend::KafkaRest,
            ..Default::default()
        };
        assert!(create_message_bus(&config).is_err());
    }

    #[test]
    fn test_default_bus_is_broadcast() {
        assert!(create_message_bus(&BusConfig::default()).is_ok());
    }
}
