// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Contact
//!
//! A person or organisation the business talks to. Individuals need a first
//! and last name; company contacts need a company name. The optional
//! `company_id` links a registered [`crate::domain::company::Company`] and is
//! cleared when that company is deleted.
//!
//! Contacts are updated by full replacement.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Contact entity and its type-conditional validation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    common_sort_value, CrmEntity, EntityId, EntityKind, PatchPolicy, SortValue,
};
use crate::domain::errors::CrmError;
use crate::domain::validation::{
    optional_text, parse_member, require_email, require_reference, require_text, string_enum,
};

string_enum! {
    pub enum ContactType("contact_type") {
        Individual => "individual",
        Company => "company",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: EntityId,
    pub contact_type: ContactType,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub company_id: Option<EntityId>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub position: Option<String>,
    pub social_media_profiles: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every mutable contact field. Used for both create and update.
#[derive(Debug, Clone, Default)]
pub struct ContactFields {
    pub contact_type: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub company_id: Option<EntityId>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub position: Option<String>,
    pub social_media_profiles: Option<String>,
    pub notes: Option<String>,
}

impl ContactFields {
    fn validate(&self) -> Result<ContactType, CrmError> {
        let contact_type: ContactType = parse_member("contact_type", &self.contact_type)?;
        match contact_type {
            ContactType::Individual => {
                require_text("first_name", self.first_name.as_deref().unwrap_or_default())?;
                require_text("last_name", self.last_name.as_deref().unwrap_or_default())?;
            }
            ContactType::Company => {
                require_text("company_name", self.company_name.as_deref().unwrap_or_default())?;
            }
        }
        if let Some(company_id) = self.company_id {
            require_reference("company_id", company_id)?;
        }
        require_email("email", &self.email)?;
        Ok(contact_type)
    }
}

impl CrmEntity for Contact {
    type Draft = ContactFields;
    type Patch = ContactFields;

    const KIND: EntityKind = EntityKind::Contact;
    const PATCH_POLICY: PatchPolicy = PatchPolicy::FullReplace;
    const SORT_FIELDS: &'static [&'static str] = &[
        "id",
        "contact_type",
        "first_name",
        "last_name",
        "company_name",
        "email",
        "city",
        "country",
        "created_at",
        "updated_at",
    ];
    const FILTER_FIELD: Option<&'static str> = Some("company_id");

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

    fn from_draft(fields: ContactFields, now: DateTime<Utc>) -> Result<Self, CrmError> {
        let contact_type = fields.validate()?;
        Ok(Self {
            id: 0,
            contact_type,
            first_name: optional_text(fields.first_name),
            last_name: optional_text(fields.last_name),
            company_name: optional_text(fields.company_name),
            company_id: fields.company_id,
            email: fields.email,
            phone: optional_text(fields.phone),
            address: optional_text(fields.address),
            city: optional_text(fields.city),
            state: optional_text(fields.state),
            country: optional_text(fields.country),
            zip_code: optional_text(fields.zip_code),
            position: optional_text(fields.position),
            social_media_profiles: optional_text(fields.social_media_profiles),
            notes: optional_text(fields.notes),
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_patch(fields: &ContactFields, _now: DateTime<Utc>) -> Result<(), CrmError> {
        fields.validate().map(|_| ())
    }

    fn apply_patch(&mut self, fields: ContactFields, now: DateTime<Utc>) -> Result<(), CrmError> {
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

    fn filter_value(&self) -> Option<EntityId> {
        self.company_id
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "contact_type" => SortValue::Text(self.contact_type.as_str().to_string()),
            "first_name" => self.first_name.as_ref().into(),
            "last_name" => self.last_name.as_ref().into(),
            "company_name" => self.company_name.as_ref().into(),
            "email" => SortValue::Text(self.email.clone()),
            "city" => self.city.as_ref().into(),
            "country" => self.country.as_ref().into(),
            other => common_sort_value(self, other).unwrap_or(SortValue::Null),
        }
    }

    fn email(&self) -> Option<&str> {
        Some(&self.email)
    }
}
