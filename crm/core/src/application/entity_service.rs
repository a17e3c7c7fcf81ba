// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Entity Service
//!
//! The lifecycle every CRM entity shares, written once and instantiated six
//! times:
//!
//! ```text
//! validate ──▶ persist ──▶ notify ──▶ return
//!    │            │
//!    └─ rejected  └─ RepositoryError classified into CrmError
//!       before any I/O
//! ```
//!
//! Every operation takes the caller's [`CancellationToken`]; store calls race
//! against it and are abandoned (without compensation) when it fires.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Generic create/get/update/delete/list use cases

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::notifier::EventNotifier;
use crate::domain::entity::{CrmEntity, EntityId};
use crate::domain::errors::CrmError;
use crate::domain::events::{changed_fields, EntityEvent};
use crate::domain::lead::Lead;
use crate::domain::repository::{EntityRepository, ListQuery, RepositoryError};
use crate::domain::validation::{require_email, require_id};

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// List request as received from a caller. Zero page values mean "default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page_number: u32,
    pub page_size: u32,
    pub sort_by: Option<String>,
    pub ascending: bool,
    /// Parent id to filter on; ignored for entities without a filter field.
    pub filter: Option<EntityId>,
}

pub struct EntityService<E: CrmEntity> {
    repository: Arc<dyn EntityRepository<E>>,
    notifier: EventNotifier,
}

impl<E: CrmEntity> EntityService<E> {
    pub fn new(repository: Arc<dyn EntityRepository<E>>, notifier: EventNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub async fn create(&self, token: &CancellationToken, draft: E::Draft) -> Result<E, CrmError> {
        let now = Utc::now();
        let entity = E::from_draft(draft, now).inspect_err(|e| reject::<E>("create", e))?;

        let created = guarded(token, self.repository.create(&entity))
            .await?
            .map_err(|e| classify::<E>(e, describe(&entity)))?;

        info!(entity = %E::KIND, id = created.id(), "Created {} {}", E::KIND, created.id());
        self.notifier.publish(token, EntityEvent::created(&created));

        Ok(created)
    }

    pub async fn get(&self, token: &CancellationToken, id: EntityId) -> Result<E, CrmError> {
        debug!("Fetching {} {}", E::KIND, id);

        guarded(token, self.repository.get(id))
            .await?
            .map_err(|e| classify::<E>(e, format!("{} {}", E::KIND, id)))?
            .ok_or_else(|| CrmError::NotFound(format!("{} {}", E::KIND, id)))
    }

    pub async fn update(
        &self,
        token: &CancellationToken,
        id: EntityId,
        patch: E::Patch,
    ) -> Result<E, CrmError> {
        let now = Utc::now();
        require_id(id).inspect_err(|e| reject::<E>("update", e))?;
        E::validate_patch(&patch, now).inspect_err(|e| reject::<E>("update", e))?;

        let mut entity = self.get(token, id).await?;
        let before = serde_json::to_value(&entity).unwrap_or_default();

        entity.apply_patch(patch, now)?;
        entity.touch(now);

        let updated = guarded(token, self.repository.update(&entity))
            .await?
            .map_err(|e| classify::<E>(e, describe(&entity)))?;

        let after = serde_json::to_value(&updated).unwrap_or_default();
        let changed = changed_fields(&before, &after);

        info!(
            entity = %E::KIND,
            id = updated.id(),
            "Updated {} {} (changed: {:?})",
            E::KIND,
            updated.id(),
            changed
        );
        self.notifier.publish(token, EntityEvent::updated(&updated, changed));

        Ok(updated)
    }

    pub async fn delete(&self, token: &CancellationToken, id: EntityId) -> Result<(), CrmError> {
        require_id(id).inspect_err(|e| reject::<E>("delete", e))?;

        guarded(token, self.repository.delete(id))
            .await?
            .map_err(|e| classify::<E>(e, format!("{} {}", E::KIND, id)))?;

        info!(entity = %E::KIND, id, "Deleted {} {}", E::KIND, id);
        self.notifier
            .publish(token, EntityEvent::deleted(E::KIND, id, Utc::now()));

        Ok(())
    }

    pub async fn list(&self, token: &CancellationToken, params: ListParams) -> Result<Vec<E>, CrmError> {
        let query = self
            .normalize(params)
            .inspect_err(|e| reject::<E>("list", e))?;

        debug!(
            "Listing {} (limit: {}, offset: {}, sort: {} {})",
            E::KIND,
            query.limit,
            query.offset,
            query.sort_by,
            if query.ascending { "asc" } else { "desc" }
        );

        guarded(token, self.repository.list(&query))
            .await?
            .map_err(|e| classify::<E>(e, E::KIND.to_string()))
    }

    /// Applies pagination defaults and checks the sort key.
    pub fn normalize(&self, params: ListParams) -> Result<ListQuery, CrmError> {
        let page_number = if params.page_number == 0 {
            DEFAULT_PAGE_NUMBER
        } else {
            params.page_number
        };
        let page_size = if params.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            params.page_size
        };

        let (sort_by, ascending) = match params.sort_by.filter(|s| !s.trim().is_empty()) {
            Some(field) if E::SORT_FIELDS.contains(&field.as_str()) => (field, params.ascending),
            Some(field) => {
                return Err(CrmError::InvalidSortField(format!(
                    "'{}' is not sortable for {}; allowed: {}",
                    field,
                    E::KIND,
                    E::SORT_FIELDS.join(", ")
                )))
            }
            // Creation order keeps paging stable.
            None => ("id".to_string(), true),
        };

        let filter = match E::FILTER_FIELD {
            Some(_) => params.filter.filter(|id| *id > 0),
            None => None,
        };

        let offset = (i64::from(page_number) - 1)
            .checked_mul(i64::from(page_size))
            .ok_or_else(|| {
                CrmError::InvalidData(format!(
                    "page {} of size {} is out of range",
                    page_number, page_size
                ))
            })?;

        Ok(ListQuery {
            limit: i64::from(page_size),
            offset,
            sort_by,
            ascending,
            filter,
        })
    }
}

impl EntityService<Lead> {
    /// Exact match on the lead's email address.
    pub async fn get_by_email(&self, token: &CancellationToken, email: &str) -> Result<Lead, CrmError> {
        require_email("email", email).inspect_err(|e| reject::<Lead>("lookup", e))?;
        debug!("Fetching lead by email {}", email);

        guarded(token, self.repository.find_by_email(email))
            .await?
            .map_err(|e| classify::<Lead>(e, format!("lead with email {}", email)))?
            .ok_or_else(|| CrmError::NotFound(format!("lead with email {}", email)))
    }
}

/// Runs a store call unless the token fires first.
async fn guarded<T, F>(token: &CancellationToken, op: F) -> Result<T, CrmError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(CrmError::Cancelled),
        result = op => Ok(result),
    }
}

fn describe<E: CrmEntity>(entity: &E) -> String {
    match entity.unique_key() {
        Some(key) if entity.id() > 0 => format!("{} {} ({})", E::KIND, entity.id(), key),
        Some(key) => format!("{} '{}'", E::KIND, key),
        None => format!("{} {}", E::KIND, entity.id()),
    }
}

fn reject<E: CrmEntity>(operation: &str, err: &CrmError) {
    warn!(entity = %E::KIND, "Rejected {} request: {}", operation, err);
}

/// Translates store failures into service error kinds.
fn classify<E: CrmEntity>(err: RepositoryError, subject: String) -> CrmError {
    match err {
        RepositoryError::NotFound(_) => CrmError::NotFound(subject),
        RepositoryError::AlreadyExists(constraint) => {
            debug!(entity = %E::KIND, "Uniqueness violation on {}", constraint);
            CrmError::AlreadyExists(subject)
        }
        RepositoryError::InvalidReference(reference) => CrmError::InvalidData(format!(
            "{} references a parent that does not exist ({})",
            subject, reference
        )),
        other => {
            error!(entity = %E::KIND, "Store failure for {}: {}", subject, other);
            CrmError::Internal(other.to_string())
        }
    }
}
