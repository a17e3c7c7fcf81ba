// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Row Mapping
//!
//! Column lists, parameter binding and row decoding for each CRM table.
//! Enumerations are stored as their display text.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::str::FromStr;

use super::postgres::{PgEntity, PgQuery};
use crate::domain::activity::Activity;
use crate::domain::company::Company;
use crate::domain::contact::Contact;
use crate::domain::errors::CrmError;
use crate::domain::lead::Lead;
use crate::domain::opportunity::Opportunity;
use crate::domain::repository::RepositoryError;
use crate::domain::task::Task;

fn text_enum<T>(row: &PgRow, column: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = CrmError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: CrmError| {
        RepositoryError::Serialization(format!("Failed to decode {}: {}", column, e))
    })
}

fn timestamps(row: &PgRow) -> Result<(DateTime<Utc>, DateTime<Utc>), RepositoryError> {
    Ok((row.try_get("created_at")?, row.try_get("updated_at")?))
}

impl PgEntity for Activity {
    const TABLE: &'static str = "activities";
    const COLUMNS: &'static [&'static str] =
        &["title", "description", "type", "status", "due_date", "contact_id"];

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.title)
            .bind(self.description.as_deref())
            .bind(self.activity_type.as_str())
            .bind(self.status.as_str())
            .bind(self.due_date)
            .bind(self.contact_id)
    }

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        let (created_at, updated_at) = timestamps(row)?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            activity_type: text_enum(row, "type")?,
            status: text_enum(row, "status")?,
            due_date: row.try_get("due_date")?,
            contact_id: row.try_get("contact_id")?,
            created_at,
            updated_at,
        })
    }
}

impl PgEntity for Task {
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static [&'static str] =
        &["title", "description", "status", "priority", "due_date", "activity_id"];

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.title)
            .bind(self.description.as_deref())
            .bind(self.status.as_str())
            .bind(self.priority.as_str())
            .bind(self.due_date)
            .bind(self.activity_id)
    }

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        let (created_at, updated_at) = timestamps(row)?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status: text_enum(row, "status")?,
            priority: text_enum(row, "priority")?,
            due_date: row.try_get("due_date")?,
            activity_id: row.try_get("activity_id")?,
            created_at,
            updated_at,
        })
    }
}

impl PgEntity for Contact {
    const TABLE: &'static str = "contacts";
    const COLUMNS: &'static [&'static str] = &[
        "contact_type",
        "first_name",
        "last_name",
        "company_name",
        "company_id",
        "email",
        "phone",
        "address",
        "city",
        "state",
        "country",
        "zip_code",
        "position",
        "social_media_profiles",
        "notes",
    ];
    const EMAIL_COLUMN: Option<&'static str> = Some("email");

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.contact_type.as_str())
            .bind(self.first_name.as_deref())
            .bind(self.last_name.as_deref())
            .bind(self.company_name.as_deref())
            .bind(self.company_id)
            .bind(&self.email)
            .bind(self.phone.as_deref())
            .bind(self.address.as_deref())
            .bind(self.city.as_deref())
            .bind(self.state.as_deref())
            .bind(self.country.as_deref())
            .bind(self.zip_code.as_deref())
            .bind(self.position.as_deref())
            .bind(self.social_media_profiles.as_deref())
            .bind(self.notes.as_deref())
    }

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        let (created_at, updated_at) = timestamps(row)?;
        Ok(Self {
            id: row.try_get("id")?,
            contact_type: text_enum(row, "contact_type")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            company_name: row.try_get("company_name")?,
            company_id: row.try_get("company_id")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            country: row.try_get("country")?,
            zip_code: row.try_get("zip_code")?,
            position: row.try_get("position")?,
            social_media_profiles: row.try_get("social_media_profiles")?,
            notes: row.try_get("notes")?,
            created_at,
            updated_at,
        })
    }
}

impl PgEntity for Company {
    const TABLE: &'static str = "companies";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "industry",
        "website",
        "phone",
        "email",
        "address",
        "city",
        "state",
        "country",
        "zip_code",
        "created_by",
        "organization_id",
    ];

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.industry.as_deref())
            .bind(self.website.as_deref())
            .bind(self.phone.as_deref())
            .bind(self.email.as_deref())
            .bind(self.address.as_deref())
            .bind(self.city.as_deref())
            .bind(self.state.as_deref())
            .bind(self.country.as_deref())
            .bind(self.zip_code.as_deref())
            .bind(self.created_by)
            .bind(self.organization_id)
    }

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        let (created_at, updated_at) = timestamps(row)?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            industry: row.try_get("industry")?,
            website: row.try_get("website")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            country: row.try_get("country")?,
            zip_code: row.try_get("zip_code")?,
            created_by: row.try_get("created_by")?,
            organization_id: row.try_get("organization_id")?,
            created_at,
            updated_at,
        })
    }
}

impl PgEntity for Lead {
    const TABLE: &'static str = "leads";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "phone",
        "status",
        "assigned_to",
        "organization_id",
    ];
    const EMAIL_COLUMN: Option<&'static str> = Some("email");

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(&self.email)
            .bind(self.phone.as_deref())
            .bind(self.status.as_str())
            .bind(self.assigned_to)
            .bind(self.organization_id)
    }

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        let (created_at, updated_at) = timestamps(row)?;
        Ok(Self {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            status: text_enum(row, "status")?,
            assigned_to: row.try_get("assigned_to")?,
            organization_id: row.try_get("organization_id")?,
            created_at,
            updated_at,
        })
    }
}

impl PgEntity for Opportunity {
    const TABLE: &'static str = "opportunities";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "stage",
        "amount",
        "close_date",
        "probability",
        "lead_id",
        "account_id",
        "owner_id",
    ];

    fn bind_columns<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.description.as_deref())
            .bind(self.stage.as_str())
            .bind(self.amount)
            .bind(self.close_date)
            .bind(self.probability)
            .bind(self.lead_id)
            .bind(self.account_id)
            .bind(self.owner_id)
    }

    fn from_row(row: &PgRow) -> Result<Self, RepositoryError> {
        let (created_at, updated_at) = timestamps(row)?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            stage: text_enum(row, "stage")?,
            amount: row.try_get("amount")?,
            close_date: row.try_get("close_date")?,
            probability: row.try_get("probability")?,
            lead_id: row.try_get("lead_id")?,
            account_id: row.try_get("account_id")?,
            owner_id: row.try_get("owner_id")?,
            created_at,
            updated_at,
        })
    }
}
