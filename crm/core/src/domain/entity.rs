// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Entity Capability Trait
//!
//! The six CRM entities share one lifecycle: validate, persist, notify. The
//! generic [`crate::application::entity_service::EntityService`] drives that
//! lifecycle through [`CrmEntity`], which each entity module implements with
//! its own validation rules, patch policy and sort allow-list.
//!
//! ## Patch Policies
//!
//! | Policy | Entities | Update input |
//! |--------|----------|--------------|
//! | [`PatchPolicy::PartialPatch`] | Activity, Task, Opportunity | `Option` per field; `None` leaves the stored value untouched |
//! | [`PatchPolicy::FullReplace`] | Contact, Company, Lead | every mutable field; validated like a create |
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Capability trait consumed by the generic entity service and stores

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::domain::errors::CrmError;
use crate::domain::events::{EventAction, Topic};

/// Store-assigned identifier. Never reused, never mutated.
pub type EntityId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Activity,
    Task,
    Contact,
    Company,
    Lead,
    Opportunity,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Activity,
        EntityKind::Task,
        EntityKind::Contact,
        EntityKind::Company,
        EntityKind::Lead,
        EntityKind::Opportunity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Activity => "activity",
            EntityKind::Task => "task",
            EntityKind::Contact => "contact",
            EntityKind::Company => "company",
            EntityKind::Lead => "lead",
            EntityKind::Opportunity => "opportunity",
        }
    }

    /// Topic receiving this entity's events for the given mutation.
    pub fn topic(&self, action: EventAction) -> Topic {
        Topic::new(*self, action)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchPolicy {
    PartialPatch,
    FullReplace,
}

/// Comparable projection of one sortable field.
///
/// Absent values sort before present ones, mirroring `NULLS FIRST` on an
/// ascending Postgres ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl SortValue {
    pub fn compare(&self, other: &SortValue) -> Ordering {
        use SortValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Text(a), Text(b)) => a.cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl From<Option<DateTime<Utc>>> for SortValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map(SortValue::Time).unwrap_or(SortValue::Null)
    }
}

impl From<Option<&String>> for SortValue {
    fn from(value: Option<&String>) -> Self {
        value
            .map(|s| SortValue::Text(s.clone()))
            .unwrap_or(SortValue::Null)
    }
}

/// Capability implemented by every CRM entity.
pub trait CrmEntity: Clone + Send + Sync + Serialize + 'static {
    /// Create input, before validation and defaulting.
    type Draft: Send + 'static;

    /// Update input. For `FullReplace` entities this carries every mutable
    /// field; for `PartialPatch` entities each field is optional.
    type Patch: Send + 'static;

    const KIND: EntityKind;
    const PATCH_POLICY: PatchPolicy;

    /// Fields accepted as an explicit sort key. Always includes `id`.
    const SORT_FIELDS: &'static [&'static str];

    /// Parent reference a list request may filter on, if any.
    const FILTER_FIELD: Option<&'static str> = None;

    fn id(&self) -> EntityId;
    fn assign_id(&mut self, id: EntityId);
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    /// Records a successful mutation at `at`.
    fn touch(&mut self, at: DateTime<Utc>);

    /// Validates a create request and builds the unsaved entity (id 0),
    /// filling defaults such as due dates. `created_at == updated_at == now`.
    fn from_draft(draft: Self::Draft, now: DateTime<Utc>) -> Result<Self, CrmError>;

    /// Validation run before the current row is loaded.
    fn validate_patch(patch: &Self::Patch, now: DateTime<Utc>) -> Result<(), CrmError>;

    /// Applies an already validated patch according to [`Self::PATCH_POLICY`].
    /// Never touches `id`, `created_at` or `updated_at`.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> Result<(), CrmError>;

    /// Value the store keeps unique, rendered for comparison. `None` when the
    /// uniqueness constraint does not apply (e.g. a nullable key component).
    fn unique_key(&self) -> Option<String>;

    /// Value of [`Self::FILTER_FIELD`] on this row.
    fn filter_value(&self) -> Option<EntityId> {
        None
    }

    /// Projection used by the in-memory store when ordering list results.
    fn sort_value(&self, field: &str) -> SortValue;

    /// Address used for email lookups, for entities that have one.
    fn email(&self) -> Option<&str> {
        None
    }
}

/// Sort fields every entity accepts.
pub const COMMON_SORT_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Shared projection of the columns present on every entity.
pub fn common_sort_value<E: CrmEntity>(entity: &E, field: &str) -> Option<SortValue> {
    match field {
        "id" => Some(SortValue::Int(entity.id())),
        "created_at" => Some(SortValue::Time(entity.created_at())),
        "updated_at" => Some(SortValue::Time(entity.updated_at())),
        _ => None,
    }
}
