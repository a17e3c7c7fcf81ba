// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lead
//!
//! A prospective customer, unique by email. Updated by full replacement.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Lead entity and validation rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    common_sort_value, CrmEntity, EntityId, EntityKind, PatchPolicy, SortValue,
};
use crate::domain::errors::CrmError;
use crate::domain::validation::{optional_text, parse_member, require_email, require_text, string_enum};

string_enum! {
    pub enum LeadStatus("status") {
        New => "New",
        Contacted => "Contacted",
        Qualified => "Qualified",
        Unqualified => "Unqualified",
        Converted => "Converted",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: LeadStatus,
    /// User id in the user service.
    pub assigned_to: Option<EntityId>,
    /// Organization id in the organization service.
    pub organization_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct LeadFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub assigned_to: Option<EntityId>,
    pub organization_id: Option<EntityId>,
}

impl LeadFields {
    fn validate(&self) -> Result<LeadStatus, CrmError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_email("email", &self.email)?;
        parse_member("status", &self.status)
    }
}

impl CrmEntity for Lead {
    type Draft = LeadFields;
    type Patch = LeadFields;

    const KIND: EntityKind = EntityKind::Lead;
    const PATCH_POLICY: PatchPolicy = PatchPolicy::FullReplace;
    const SORT_FIELDS: &'static [&'static str] = &[
        "id",
        "first_name",
        "last_name",
        "email",
        "status",
        "created_at",
        "updated_at",
    ];

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

    fn from_draft(fields: LeadFields, now: DateTime<Utc>) -> Result<Self, CrmError> {
        let status = fields.validate()?;
        Ok(Self {
            id: 0,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone: optional_text(fields.phone),
            status,
            assigned_to: fields.assigned_to.filter(|id| *id > 0),
            organization_id: fields.organization_id.filter(|id| *id > 0),
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_patch(fields: &LeadFields, _now: DateTime<Utc>) -> Result<(), CrmError> {
        fields.validate().map(|_| ())
    }

    fn apply_patch(&mut self, fields: LeadFields, now: DateTime<Utc>) -> Result<(), CrmError> {
        let replacement = Self::from_draft(fields, now)?;
        *self = Self {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            ..replacement
        };
        Ok(())
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "first_name" => SortValue::Text(self.first_name.clone()),
            "last_name" => SortValue::Text(self.last_name.clone()),
            "email" => SortValue::Text(self.email.clone()),
            "status" => SortValue::Text(self.status.as_str().to_string()),
            other => common_sort_value(self, other).unwrap_or(SortValue::Null),
        }
    }

    fn email(&self) -> Option<&str> {
        Some(&self.email)
    }
}
