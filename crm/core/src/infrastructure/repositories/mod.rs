// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the domain's [`EntityRepository`] trait.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve CRM entities
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! ## PostgreSQL
//!
//! [`postgres::PostgresRepository`] is generic over the entity; each entity
//! supplies its table name, column list and row mapping in [`rows`].
//! Uniqueness, parent references and cascades are enforced by the schema.
//!
//! ## In-Memory
//!
//! [`InMemoryRepository`] views one table of a shared [`InMemoryStore`].
//! All six repositories must be built over the same store so parent
//! references resolve and deletes cascade the way the schema does:
//!
//! | Delete | Effect |
//! |--------|--------|
//! | contact | its activities and their tasks are removed |
//! | activity | its tasks are removed |
//! | company | contacts keep existing with `company_id` cleared |

pub mod postgres;
pub mod rows;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::activity::Activity;
use crate::domain::company::Company;
use crate::domain::contact::Contact;
use crate::domain::entity::{CrmEntity, EntityId};
use crate::domain::lead::Lead;
use crate::domain::opportunity::Opportunity;
use crate::domain::repository::{EntityRepository, ListQuery, RepositoryError};
use crate::domain::task::Task;

pub struct Table<E> {
    rows: BTreeMap<EntityId, E>,
    last_id: EntityId,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E> Table<E> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn contains(&self, id: EntityId) -> bool {
        self.rows.contains_key(&id)
    }
}

#[derive(Default)]
pub struct Tables {
    activities: Table<Activity>,
    tasks: Table<Task>,
    contacts: Table<Contact>,
    companies: Table<Company>,
    leads: Table<Lead>,
    opportunities: Table<Opportunity>,
}

/// Process-local storage shared by all in-memory repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows of `E`.
    pub fn count<E: InMemoryEntity>(&self) -> usize {
        E::table(&self.tables.read()).len()
    }
}

/// Binds an entity to its table and its relations to other tables.
pub trait InMemoryEntity: CrmEntity {
    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;

    /// Parent rows this entity points at must exist.
    fn check_references(&self, _tables: &Tables) -> Result<(), RepositoryError> {
        Ok(())
    }

    /// Runs after the row with `id` was removed.
    fn on_delete(_id: EntityId, _tables: &mut Tables) {}
}

fn missing(field: &str, id: EntityId) -> RepositoryError {
    RepositoryError::InvalidReference(format!("{} {} does not exist", field, id))
}

impl InMemoryEntity for Activity {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.activities
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.activities
    }

    fn check_references(&self, tables: &Tables) -> Result<(), RepositoryError> {
        if tables.contacts.contains(self.contact_id) {
            Ok(())
        } else {
            Err(missing("contact_id", self.contact_id))
        }
    }

    fn on_delete(id: EntityId, tables: &mut Tables) {
        tables.tasks.rows.retain(|_, task| task.activity_id != id);
    }
}

impl InMemoryEntity for Task {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.tasks
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.tasks
    }

    fn check_references(&self, tables: &Tables) -> Result<(), RepositoryError> {
        if tables.activities.contains(self.activity_id) {
            Ok(())
        } else {
            Err(missing("activity_id", self.activity_id))
        }
    }
}

impl InMemoryEntity for Contact {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.contacts
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.contacts
    }

    fn check_references(&self, tables: &Tables) -> Result<(), RepositoryError> {
        match self.company_id {
            Some(company_id) if !tables.companies.contains(company_id) => {
                Err(missing("company_id", company_id))
            }
            _ => Ok(()),
        }
    }

    fn on_delete(id: EntityId, tables: &mut Tables) {
        let orphaned: Vec<EntityId> = tables
            .activities
            .rows
            .values()
            .filter(|activity| activity.contact_id == id)
            .map(|activity| activity.id)
            .collect();

        for activity_id in orphaned {
            tables.activities.rows.remove(&activity_id);
            Activity::on_delete(activity_id, tables);
        }
    }
}

impl InMemoryEntity for Company {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.companies
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.companies
    }

    fn on_delete(id: EntityId, tables: &mut Tables) {
        for contact in tables.contacts.rows.values_mut() {
            if contact.company_id == Some(id) {
                contact.company_id = None;
            }
        }
    }
}

impl InMemoryEntity for Lead {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.leads
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.leads
    }
}

impl InMemoryEntity for Opportunity {
    fn table(tables: &Tables) -> &Table<Self> {
        &tables.opportunities
    }

    fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
        &mut tables.opportunities
    }
}

#[derive(Clone)]
pub struct InMemoryRepository<E> {
    store: InMemoryStore,
    _entity: PhantomData<fn() -> E>,
}

impl<E: InMemoryEntity> InMemoryRepository<E> {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Fails when another row already holds `entity`'s unique key.
    fn ensure_unique(table: &Table<E>, entity: &E) -> Result<(), RepositoryError> {
        let Some(key) = entity.unique_key() else {
            return Ok(());
        };

        let taken = table
            .rows
            .values()
            .any(|row| row.id() != entity.id() && row.unique_key().as_deref() == Some(key.as_str()));

        if taken {
            Err(RepositoryError::AlreadyExists(format!("{} {}", E::KIND, key)))
        } else {
            Ok(())
        }
    }
}

/// Orders two rows by the requested field, ties broken by id.
fn compare_rows<E: CrmEntity>(a: &E, b: &E, query: &ListQuery) -> Ordering {
    let ordering = a
        .sort_value(&query.sort_by)
        .compare(&b.sort_value(&query.sort_by));
    let ordering = if query.ascending {
        ordering
    } else {
        ordering.reverse()
    };
    ordering.then_with(|| a.id().cmp(&b.id()))
}

#[async_trait]
impl<E: InMemoryEntity> EntityRepository<E> for InMemoryRepository<E> {
    async fn create(&self, entity: &E) -> Result<E, RepositoryError> {
        let mut tables = self.store.tables.write();
        entity.check_references(&tables)?;

        let table = E::table_mut(&mut tables);
        let mut row = entity.clone();
        row.assign_id(0);
        Self::ensure_unique(table, &row)?;

        table.last_id += 1;
        row.assign_id(table.last_id);
        table.rows.insert(row.id(), row.clone());
        Ok(row)
    }

    async fn get(&self, id: EntityId) -> Result<Option<E>, RepositoryError> {
        let tables = self.store.tables.read();
        Ok(E::table(&tables).rows.get(&id).cloned())
    }

    async fn update(&self, entity: &E) -> Result<E, RepositoryError> {
        let mut tables = self.store.tables.write();
        if !E::table(&tables).contains(entity.id()) {
            return Err(RepositoryError::NotFound(format!("{} {}", E::KIND, entity.id())));
        }
        entity.check_references(&tables)?;

        let table = E::table_mut(&mut tables);
        Self::ensure_unique(table, entity)?;
        table.rows.insert(entity.id(), entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: EntityId) -> Result<(), RepositoryError> {
        let mut tables = self.store.tables.write();
        if E::table_mut(&mut tables).rows.remove(&id).is_none() {
            return Err(RepositoryError::NotFound(format!("{} {}", E::KIND, id)));
        }
        E::on_delete(id, &mut tables);
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<E>, RepositoryError> {
        let tables = self.store.tables.read();
        let mut rows: Vec<&E> = E::table(&tables)
            .rows
            .values()
            .filter(|row| query.filter.is_none() || row.filter_value() == query.filter)
            .collect();

        rows.sort_by(|a, b| compare_rows(*a, *b, query));

        Ok(rows
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<E>, RepositoryError> {
        let tables = self.store.tables.read();
        Ok(E::table(&tables)
            .rows
            .values()
            .find(|row| row.email() == Some(email))
            .cloned())
    }
}
