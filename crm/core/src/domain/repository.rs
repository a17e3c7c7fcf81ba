// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interface
//!
//! Persistence contract for the CRM entities. One generic trait covers all
//! six entities; implementations live in `crate::infrastructure::repositories`.
//!
//! | Implementation | Backend | Used for |
//! |----------------|---------|----------|
//! | `InMemoryRepository<E>` | shared in-process tables | development, tests |
//! | `PostgresRepository<E>` | `sqlx` + PostgreSQL | production |
//!
//! Both enforce the same uniqueness keys, parent references and delete
//! cascades, so the services behave identically on either backend.

use async_trait::async_trait;

use crate::domain::entity::{CrmEntity, EntityId};

/// Storage backend selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub connection_string: String,
    pub max_connections: u32,
}

/// A normalized list request as the store sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: i64,
    pub offset: i64,
    /// Column to order by. Already checked against the entity's allow-list.
    pub sort_by: String,
    pub ascending: bool,
    /// Restrict to rows whose parent reference equals this id.
    pub filter: Option<EntityId>,
}

/// Store capability for one entity type.
#[async_trait]
pub trait EntityRepository<E: CrmEntity>: Send + Sync {
    /// Insert a new row. The entity's id is ignored; the stored copy with its
    /// assigned id is returned.
    async fn create(&self, entity: &E) -> Result<E, RepositoryError>;

    async fn get(&self, id: EntityId) -> Result<Option<E>, RepositoryError>;

    /// Overwrite the mutable columns of an existing row.
    /// Fails with `NotFound` when the row no longer exists.
    async fn update(&self, entity: &E) -> Result<E, RepositoryError>;

    /// Fails with `NotFound` when zero rows were affected.
    async fn delete(&self, id: EntityId) -> Result<(), RepositoryError>;

    async fn list(&self, query: &ListQuery) -> Result<Vec<E>, RepositoryError>;

    /// Lookup by the entity's email column. Entities without one return `None`.
    async fn find_by_email(&self, email: &str) -> Result<Option<E>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Uniqueness constraint violated.
    #[error("Constraint violation: {0}")]
    AlreadyExists(String),

    /// Parent reference points at a row that does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::AlreadyExists(
                    db_err
                        .constraint()
                        .map(str::to_string)
                        .unwrap_or_else(|| db_err.message().to_string()),
                )
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::InvalidReference(
                    db_err
                        .constraint()
                        .map(str::to_string)
                        .unwrap_or_else(|| db_err.message().to_string()),
                )
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                RepositoryError::Serialization(err.to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
