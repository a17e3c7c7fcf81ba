// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Company
//!
//! A registered organisation within a tenant (`organization_id`). Names are
//! unique per tenant. Updated by full replacement.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Company entity and validation rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    common_sort_value, CrmEntity, EntityId, EntityKind, PatchPolicy, SortValue,
};
use crate::domain::errors::CrmError;
use crate::domain::validation::{
    optional_text, require_reference, require_text, validate_optional_email,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: EntityId,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub created_by: Option<EntityId>,
    pub organization_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyFields {
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub created_by: Option<EntityId>,
    pub organization_id: EntityId,
}

impl CompanyFields {
    fn validate(&self) -> Result<(), CrmError> {
        require_text("name", &self.name)?;
        require_reference("organization_id", self.organization_id)?;
        validate_optional_email(self.email.as_deref())
    }
}

impl CrmEntity for Company {
    type Draft = CompanyFields;
    type Patch = CompanyFields;

    const KIND: EntityKind = EntityKind::Company;
    const PATCH_POLICY: PatchPolicy = PatchPolicy::FullReplace;
    const SORT_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "industry",
        "city",
        "country",
        "organization_id",
        "created_at",
        "updated_at",
    ];
    const FILTER_FIELD: Option<&'static str> = Some("organization_id");

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

    fn from_draft(fields: CompanyFields, now: DateTime<Utc>) -> Result<Self, CrmError> {
        fields.validate()?;
        Ok(Self {
            id: 0,
            name: fields.name,
            industry: optional_text(fields.industry),
            website: optional_text(fields.website),
            phone: optional_text(fields.phone),
            email: optional_text(fields.email),
            address: optional_text(fields.address),
            city: optional_text(fields.city),
            state: optional_text(fields.state),
            country: optional_text(fields.country),
            zip_code: optional_text(fields.zip_code),
            created_by: fields.created_by.filter(|id| *id > 0),
            organization_id: fields.organization_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_patch(fields: &CompanyFields, _now: DateTime<Utc>) -> Result<(), CrmError> {
        fields.validate()
    }

    fn apply_patch(&mut self, fields: CompanyFields, now: DateTime<Utc>) -> Result<(), CrmError> {
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
        Some(format!("{}/{}", self.organization_id, self.name))
    }

    fn filter_value(&self) -> Option<EntityId> {
        Some(self.organization_id)
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "name" => SortValue::Text(self.name.clone()),
            "industry" => self.industry.as_ref().into(),
            "city" => self.city.as_ref().into(),
            "country" => self.country.as_ref().into(),
            "organization_id" => SortValue::Int(self.organization_id),
            other => common_sort_value(self, other).unwrap_or(SortValue::Null),
        }
    }
}
