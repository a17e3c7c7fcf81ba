// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Postgres Repository
//!
//! One repository implementation for every CRM table. Entities describe
//! their table through [`PgEntity`]; the SQL is assembled from that
//! description. Sort and filter column names only ever come from the
//! entity's compile-time lists, never from callers.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements `EntityRepository` over PostgreSQL

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool, PgRow};
use sqlx::query::Query;
use sqlx::Postgres;
use std::marker::PhantomData;

use crate::domain::entity::{CrmEntity, EntityId};
use crate::domain::repository::{EntityRepository, ListQuery, RepositoryError};

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Table layout of an entity.
pub trait PgEntity: CrmEntity {
    const TABLE: &'static str;

    /// Columns written on insert and update, in [`Self::bind_columns`] order.
    /// Excludes `id`, `created_at` and `updated_at`.
    const COLUMNS: &'static [&'static str];

    const EMAIL_COLUMN: Option<&'static str> = None;

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError>;
}

pub struct PostgresRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PgEntity> PostgresRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

pub fn insert_sql<E: PgEntity>() -> String {
    let columns = E::COLUMNS.join(", ");
    let placeholders: Vec<String> = (1..=E::COLUMNS.len() + 2).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}, created_at, updated_at) VALUES ({}) RETURNING *",
        E::TABLE,
        columns,
        placeholders.join(", ")
    )
}

pub fn update_sql<E: PgEntity>() -> String {
    let assignments: Vec<String> = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect();
    let n = E::COLUMNS.len();
    format!(
        "UPDATE {} SET {}, updated_at = ${} WHERE id = ${} RETURNING *",
        E::TABLE,
        assignments.join(", "),
        n + 1,
        n + 2
    )
}

/// Returns the statement and whether the first parameter is the filter value.
pub fn list_sql<E: PgEntity>(query: &ListQuery) -> (String, bool) {
    let sort_column = if E::SORT_FIELDS.contains(&query.sort_by.as_str()) {
        query.sort_by.as_str()
    } else {
        "id"
    };
    // Missing values sort lowest in both directions.
    let direction = if query.ascending {
        "ASC NULLS FIRST"
    } else {
        "DESC NULLS LAST"
    };

    match (E::FILTER_FIELD, query.filter) {
        (Some(column), Some(_)) => (
            format!(
                "SELECT * FROM {} WHERE {} = $1 ORDER BY {} {}, id ASC LIMIT $2 OFFSET $3",
                E::TABLE,
                column,
                sort_column,
                direction
            ),
            true,
        ),
        _ => (
            format!(
                "SELECT * FROM {} ORDER BY {} {}, id ASC LIMIT $1 OFFSET $2",
                E::TABLE,
                sort_column,
                direction
            ),
            false,
        ),
    }
}

#[async_trait]
impl<E: PgEntity> EntityRepository<E> for PostgresRepository<E> {
    async fn create(&self, entity: &E) -> Result<E, RepositoryError> {
        let sql = insert_sql::<E>();
        let row = entity
            .bind_columns(sqlx::query(&sql))
            .bind(entity.created_at())
            .bind(entity.updated_at())
            .fetch_one(&self.pool)
            .await?;

        E::from_row(&row)
    }

    async fn get(&self, id: EntityId) -> Result<Option<E>, RepositoryError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", E::TABLE);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(E::from_row).transpose()
    }

    async fn update(&self, entity: &E) -> Result<E, RepositoryError> {
        let sql = update_sql::<E>();
        let row = entity
            .bind_columns(sqlx::query(&sql))
            .bind(entity.updated_at())
            .bind(entity.id())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => E::from_row(&row),
            None => Err(RepositoryError::NotFound(format!("{} {}", E::KIND, entity.id()))),
        }
    }

    async fn delete(&self, id: EntityId) -> Result<(), RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("{} {}", E::KIND, id)));
        }
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<E>, RepositoryError> {
        let (sql, filtered) = list_sql::<E>(query);
        let mut statement = sqlx::query(&sql);
        if filtered {
            statement = statement.bind(query.filter);
        }

        let rows = statement
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(E::from_row).collect()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<E>, RepositoryError> {
        let Some(column) = E::EMAIL_COLUMN else {
            return Ok(None);
        };

        let sql = format!("SELECT * FROM {} WHERE {} = $1", E::TABLE, column);
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(E::from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::Activity;
    use crate::domain::lead::Lead;

    fn query(sort_by: &str, ascending: bool, filter: Option<EntityId>) -> ListQuery {
        ListQuery {
            limit: 10,
            offset: 0,
            sort_by: sort_by.to_string(),
            ascending,
            filter,
        }
    }

    #[test]
    fn test_insert_sql_placeholders() {
        let sql = insert_sql::<Activity>();
        assert!(sql.starts_with("INSERT INTO activities (title, description, type, status"));
        assert!(sql.contains("$8"));
        assert!(!sql.contains("$9"));
        assert!(sql.ends_with("RETURNING *"));
    }

    #[test]
    fn test_update_sql_binds_id_last() {
        let sql = update_sql::<Activity>();
        assert!(sql.contains("updated_at = $7 WHERE id = $8"));
    }

    #[test]
    fn test_list_sql_with_filter() {
        let (sql, filtered) = list_sql::<Activity>(&query("due_date", false, Some(3)));
        assert!(filtered);
        assert_eq!(
            sql,
            "SELECT * FROM activities WHERE contact_id = $1 ORDER BY due_date DESC NULLS LAST, id ASC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_list_sql_ignores_filter_without_column() {
        let (sql, filtered) = list_sql::<Lead>(&query("email", true, Some(3)));
        assert!(!filtered);
        assert!(sql.contains("ORDER BY email ASC NULLS FIRST, id ASC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_list_sql_rejects_unknown_sort_column() {
        let (sql, _) = list_sql::<Lead>(&query("1; DROP TABLE leads", true, None));
        assert!(sql.contains("ORDER BY id ASC"));
    }
}
