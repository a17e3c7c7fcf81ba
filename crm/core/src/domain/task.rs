// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Task
//!
//! A concrete follow-up item belonging to an activity.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Task entity, create/patch inputs and validation rules

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    common_sort_value, CrmEntity, EntityId, EntityKind, PatchPolicy, SortValue,
};
use crate::domain::errors::CrmError;
use crate::domain::validation::{
    ensure_not_past, optional_text, parse_member, parse_member_if_present, require_reference,
    require_text, require_text_if_present, string_enum,
};

pub const DEFAULT_DUE_OFFSET_HOURS: i64 = 48;

string_enum! {
    pub enum TaskStatus("status") {
        Pending => "Pending",
        InProgress => "In Progress",
        Completed => "Completed",
    }
}

string_enum! {
    pub enum TaskPriority("priority") {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub activity_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub activity_id: EntityId,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub activity_id: Option<EntityId>,
}

impl CrmEntity for Task {
    type Draft = NewTask;
    type Patch = TaskPatch;

    const KIND: EntityKind = EntityKind::Task;
    const PATCH_POLICY: PatchPolicy = PatchPolicy::PartialPatch;
    const SORT_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "status",
        "priority",
        "due_date",
        "activity_id",
        "created_at",
        "updated_at",
    ];
    const FILTER_FIELD: Option<&'static str> = Some("activity_id");

    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    fn from_draft(draft: NewTask, now: DateTime<Utc>) -> Result<Self, CrmError> {
        require_text("title", &draft.title)?;
        let status = parse_member("status", &draft.status)?;
        let priority = parse_member("priority", &draft.priority)?;
        require_reference("activity_id", draft.activity_id)?;
        ensure_not_past("due_date", draft.due_date, now)?;

        let due_date = draft
            .due_date
            .unwrap_or(now + Duration::hours(DEFAULT_DUE_OFFSET_HOURS));

        Ok(Self {
            id: 0,
            title: draft.title,
            description: optional_text(draft.description),
            status,
            priority,
            due_date: Some(due_date),
            activity_id: draft.activity_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_patch(patch: &TaskPatch, now: DateTime<Utc>) -> Result<(), CrmError> {
        require_text_if_present("title", patch.title.as_deref())?;
        parse_member_if_present::<TaskStatus>("status", patch.status.as_deref())?;
        parse_member_if_present::<TaskPriority>("priority", patch.priority.as_deref())?;
        if let Some(activity_id) = patch.activity_id {
            require_reference("activity_id", activity_id)?;
        }
        ensure_not_past("due_date", patch.due_date, now)
    }

    fn apply_patch(&mut self, patch: TaskPatch, _now: DateTime<Utc>) -> Result<(), CrmError> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = optional_text(Some(description));
        }
        if let Some(status) = parse_member_if_present("status", patch.status.as_deref())? {
            self.status = status;
        }
        if let Some(priority) = parse_member_if_present("priority", patch.priority.as_deref())? {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(activity_id) = patch.activity_id {
            self.activity_id = activity_id;
        }
        Ok(())
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.title.clone())
    }

    fn filter_value(&self) -> Option<EntityId> {
        Some(self.activity_id)
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "title" => SortValue::Text(self.title.clone()),
            "status" => SortValue::Text(self.status.as_str().to_string()),
            "priority" => SortValue::Text(self.priority.as_str().to_string()),
            "due_date" => self.due_date.into(),
            "activity_id" => SortValue::Int(self.activity_id),
            other => common_sort_value(self, other).unwrap_or(SortValue::Null),
        }
    }
}
