// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Entity Change Events
//!
//! Every successful mutation publishes one [`EntityEvent`] on a fixed topic
//! named `{entity}-created`, `{entity}-updated` or `{entity}-deleted`. Events
//! are advisory: the store row is the source of truth and delivery is
//! best-effort, at most once.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Topic names and the JSON event envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::domain::entity::{CrmEntity, EntityId, EntityKind};

pub const TOPIC_ACTIVITY_CREATED: &str = "activity-created";
pub const TOPIC_ACTIVITY_UPDATED: &str = "activity-updated";
pub const TOPIC_ACTIVITY_DELETED: &str = "activity-deleted";

pub const TOPIC_TASK_CREATED: &str = "task-created";
pub const TOPIC_TASK_UPDATED: &str = "task-updated";
pub const TOPIC_TASK_DELETED: &str = "task-deleted";

pub const TOPIC_CONTACT_CREATED: &str = "contact-created";
pub const TOPIC_CONTACT_UPDATED: &str = "contact-updated";
pub const TOPIC_CONTACT_DELETED: &str = "contact-deleted";

pub const TOPIC_COMPANY_CREATED: &str = "company-created";
pub const TOPIC_COMPANY_UPDATED: &str = "company-updated";
pub const TOPIC_COMPANY_DELETED: &str = "company-deleted";

pub const TOPIC_LEAD_CREATED: &str = "lead-created";
pub const TOPIC_LEAD_UPDATED: &str = "lead-updated";
pub const TOPIC_LEAD_DELETED: &str = "lead-deleted";

pub const TOPIC_OPPORTUNITY_CREATED: &str = "opportunity-created";
pub const TOPIC_OPPORTUNITY_UPDATED: &str = "opportunity-updated";
pub const TOPIC_OPPORTUNITY_DELETED: &str = "opportunity-deleted";

/// Every topic the service may publish to.
pub const ALL_TOPICS: [&str; 18] = [
    TOPIC_ACTIVITY_CREATED,
    TOPIC_ACTIVITY_UPDATED,
    TOPIC_ACTIVITY_DELETED,
    TOPIC_TASK_CREATED,
    TOPIC_TASK_UPDATED,
    TOPIC_TASK_DELETED,
    TOPIC_CONTACT_CREATED,
    TOPIC_CONTACT_UPDATED,
    TOPIC_CONTACT_DELETED,
    TOPIC_COMPANY_CREATED,
    TOPIC_COMPANY_UPDATED,
    TOPIC_COMPANY_DELETED,
    TOPIC_LEAD_CREATED,
    TOPIC_LEAD_UPDATED,
    TOPIC_LEAD_DELETED,
    TOPIC_OPPORTUNITY_CREATED,
    TOPIC_OPPORTUNITY_UPDATED,
    TOPIC_OPPORTUNITY_DELETED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Created,
    Updated,
    Deleted,
}

/// One of the eighteen fixed topic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic(&'static str);

impl Topic {
    pub fn new(kind: EntityKind, action: EventAction) -> Self {
        use EntityKind::*;
        use EventAction::*;
        Topic(match (kind, action) {
            (Activity, Created) => TOPIC_ACTIVITY_CREATED,
            (Activity, Updated) => TOPIC_ACTIVITY_UPDATED,
            (Activity, Deleted) => TOPIC_ACTIVITY_DELETED,
            (Task, Created) => TOPIC_TASK_CREATED,
            (Task, Updated) => TOPIC_TASK_UPDATED,
            (Task, Deleted) => TOPIC_TASK_DELETED,
            (Contact, Created) => TOPIC_CONTACT_CREATED,
            (Contact, Updated) => TOPIC_CONTACT_UPDATED,
            (Contact, Deleted) => TOPIC_CONTACT_DELETED,
            (Company, Created) => TOPIC_COMPANY_CREATED,
            (Company, Updated) => TOPIC_COMPANY_UPDATED,
            (Company, Deleted) => TOPIC_COMPANY_DELETED,
            (Lead, Created) => TOPIC_LEAD_CREATED,
            (Lead, Updated) => TOPIC_LEAD_UPDATED,
            (Lead, Deleted) => TOPIC_LEAD_DELETED,
            (Opportunity, Created) => TOPIC_OPPORTUNITY_CREATED,
            (Opportunity, Updated) => TOPIC_OPPORTUNITY_UPDATED,
            (Opportunity, Deleted) => TOPIC_OPPORTUNITY_DELETED,
        })
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// JSON envelope published for every mutation.
///
/// The bus key is always the entity id, so all events for one row land on
/// the same partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEvent {
    /// Topic name, e.g. `activity-created`.
    pub event: String,
    pub event_id: Uuid,
    pub entity: String,
    pub id: EntityId,
    pub occurred_at: DateTime<Utc>,

    /// Snapshot of the row after the mutation. Absent for deletions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Fields whose stored value changed. Only set for updates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed: Vec<String>,
}

impl EntityEvent {
    fn envelope(kind: EntityKind, action: EventAction, id: EntityId, at: DateTime<Utc>) -> Self {
        Self {
            event: kind.topic(action).as_str().to_string(),
            event_id: Uuid::new_v4(),
            entity: kind.as_str().to_string(),
            id,
            occurred_at: at,
            data: None,
            changed: Vec::new(),
        }
    }

    pub fn created<E: CrmEntity>(entity: &E) -> Self {
        let mut event = Self::envelope(E::KIND, EventAction::Created, entity.id(), entity.created_at());
        event.data = serde_json::to_value(entity).ok();
        event
    }

    pub fn updated<E: CrmEntity>(entity: &E, changed: Vec<String>) -> Self {
        let mut event = Self::envelope(E::KIND, EventAction::Updated, entity.id(), entity.updated_at());
        event.data = serde_json::to_value(entity).ok();
        event.changed = changed;
        event
    }

    pub fn deleted(kind: EntityKind, id: EntityId, at: DateTime<Utc>) -> Self {
        Self::envelope(kind, EventAction::Deleted, id, at)
    }

    /// Partition key: the entity id in decimal.
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Names of the serialized fields that differ between two snapshots of the
/// same row, ignoring the bookkeeping timestamp.
pub fn changed_fields(before: &Value, after: &Value) -> Vec<String> {
    let (Some(before), Some(after)) = (before.as_object(), after.as_object()) else {
        return Vec::new();
    };

    after
        .iter()
        .filter(|(name, _)| name.as_str() != "updated_at")
        .filter(|(name, value)| before.get(name.as_str()) != Some(*value))
        .map(|(name, _)| name.clone())
        .collect()
}
