// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Activity
//!
//! A customer interaction (call, meeting, email) attached to a contact.
//! Activities own tasks: deleting an activity deletes its tasks.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Activity entity, create/patch inputs and validation rules

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

/// Omitted due dates default to this many hours after creation.
pub const DEFAULT_DUE_OFFSET_HOURS: i64 = 24;

string_enum! {
    pub enum ActivityType("type") {
        Call => "Call",
        Meeting => "Meeting",
        Email => "Email",
    }
}

string_enum! {
    pub enum ActivityStatus("status") {
        Pending => "Pending",
        Completed => "Completed",
        Canceled => "Canceled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub status: ActivityStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub contact_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub title: String,
    pub description: Option<String>,
    pub activity_type: String,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub contact_id: EntityId,
}

/// Partial update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ActivityPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub activity_type: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub contact_id: Option<EntityId>,
}

impl CrmEntity for Activity {
    type Draft = NewActivity;
    type Patch = ActivityPatch;

    const KIND: EntityKind = EntityKind::Activity;
    const PATCH_POLICY: PatchPolicy = PatchPolicy::PartialPatch;
    const SORT_FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "type",
        "status",
        "due_date",
        "contact_id",
        "created_at",
        "updated_at",
    ];
    const FILTER_FIELD: Option<&'static str> = Some("contact_id");

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

    fn from_draft(draft: NewActivity, now: DateTime<Utc>) -> Result<Self, CrmError> {
        require_text("title", &draft.title)?;
        let activity_type = parse_member("type", &draft.activity_type)?;
        let status = parse_member("status", &draft.status)?;
        require_reference("contact_id", draft.contact_id)?;
        ensure_not_past("due_date", draft.due_date, now)?;

        Ok(Self {
            id: 0,
            title: draft.title,
            description: optional_text(draft.description),
            activity_type,
            status,
            due_date: Some(draft.due_date.unwrap_or(now + Duration::hours(DEFAULT_DUE_OFFSET_HOURS))),
            contact_id: draft.contact_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_patch(patch: &ActivityPatch, now: DateTime<Utc>) -> Result<(), CrmError> {
        require_text_if_present("title", patch.title.as_deref())?;
        parse_member_if_present::<ActivityType>("type", patch.activity_type.as_deref())?;
        parse_member_if_present::<ActivityStatus>("status", patch.status.as_deref())?;
        if let Some(contact_id) = patch.contact_id {
            require_reference("contact_id", contact_id)?;
        }
        ensure_not_past("due_date", patch.due_date, now)
    }

    fn apply_patch(&mut self, patch: ActivityPatch, _now: DateTime<Utc>) -> Result<(), CrmError> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = optional_text(Some(description));
        }
        if let Some(activity_type) = parse_member_if_present("type", patch.activity_type.as_deref())? {
            self.activity_type = activity_type;
        }
        if let Some(status) = parse_member_if_present("status", patch.status.as_deref())? {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(contact_id) = patch.contact_id {
            self.contact_id = contact_id;
        }
        Ok(())
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.title.clone())
    }

    fn filter_value(&self) -> Option<EntityId> {
        Some(self.contact_id)
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "title" => SortValue::Text(self.title.clone()),
            "type" => SortValue::Text(self.activity_type.as_str().to_string()),
            "status" => SortValue::Text(self.status.as_str().to_string()),
            "due_date" => self.due_date.into(),
            "contact_id" => SortValue::Int(self.contact_id),
            other => common_sort_value(self, other).unwrap_or(SortValue::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewActivity {
        NewActivity {
            title: "Kickoff".to_string(),
            description: None,
            activity_type: "Meeting".to_string(),
            status: "Pending".to_string(),
            due_date: None,
            contact_id: 1,
        }
    }

    #[test]
    fn test_create_defaults_due_date() {
        let now = Utc::now();
        let activity = Activity::from_draft(draft(), now).unwrap();
        assert_eq!(activity.due_date, Some(now + Duration::hours(24)));
        assert_eq!(activity.created_at, activity.updated_at);
        assert_eq!(activity.activity_type, ActivityType::Meeting);
    }

    #[test]
    fn test_create_rejects_missing_and_unknown_values() {
        let now = Utc::now();

        let mut d = draft();
        d.title = " ".to_string();
        assert!(matches!(Activity::from_draft(d, now), Err(CrmError::InvalidData(_))));

        let mut d = draft();
        d.activity_type = "Lunch".to_string();
        assert!(matches!(Activity::from_draft(d, now), Err(CrmError::InvalidData(_))));

        let mut d = draft();
        d.contact_id = 0;
        assert!(matches!(Activity::from_draft(d, now), Err(CrmError::InvalidData(_))));

        let mut d = draft();
        d.due_date = Some(now - Duration::minutes(5));
        assert!(matches!(Activity::from_draft(d, now), Err(CrmError::InvalidData(_))));
    }

    #[test]
    fn test_patch_touches_only_supplied_fields() {
        let now = Utc::now();
        let mut activity = Activity::from_draft(draft(), now).unwrap();
        let before = activity.clone();

        let patch = ActivityPatch {
            status: Some("Completed".to_string()),
            ..Default::default()
        };
        Activity::validate_patch(&patch, now).unwrap();
        activity.apply_patch(patch.clone(), now).unwrap();

        assert_eq!(activity.status, ActivityStatus::Completed);
        assert_eq!(activity.title, before.title);
        assert_eq!(activity.due_date, before.due_date);
        assert_eq!(activity.contact_id, before.contact_id);

        let once = activity.clone();
        activity.apply_patch(patch, now).unwrap();
        assert_eq!(activity, once);
    }

    #[test]
    fn test_patch_validation() {
        let now = Utc::now();
        let bad_status = ActivityPatch {
            status: Some("Done".to_string()),
            ..Default::default()
        };
        assert!(Activity::validate_patch(&bad_status, now).is_err());

        let past = ActivityPatch {
            due_date: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert!(Activity::validate_patch(&past, now).is_err());

        let blank_title = ActivityPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(Activity::validate_patch(&blank_title, now).is_err());
    }
}
