// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Opportunity
//!
//! A potential deal moving through the sales pipeline.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Opportunity entity, create/patch inputs and validation rules

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    common_sort_value, CrmEntity, EntityId, EntityKind, PatchPolicy, SortValue,
};
use crate::domain::errors::CrmError;
use crate::domain::validation::{
    ensure_not_past, ensure_percentage, ensure_positive, optional_text, parse_member,
    parse_member_if_present, require_text, require_text_if_present, string_enum,
};

pub const DEFAULT_CLOSE_OFFSET_DAYS: i64 = 30;

string_enum! {
    pub enum OpportunityStage("stage") {
        Prospecting => "Prospecting",
        Qualification => "Qualification",
        Proposal => "Proposal",
        Negotiation => "Negotiation",
        ClosedWon => "Closed Won",
        ClosedLost => "Closed Lost",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub stage: OpportunityStage,
    pub amount: f64,
    pub close_date: Option<DateTime<Utc>>,
    /// Win likelihood in percent.
    pub probability: f64,
    pub lead_id: Option<EntityId>,
    pub account_id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewOpportunity {
    pub name: String,
    pub description: Option<String>,
    pub stage: String,
    pub amount: f64,
    pub close_date: Option<DateTime<Utc>>,
    pub probability: f64,
    pub lead_id: Option<EntityId>,
    pub account_id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
}

/// Partial update. `Some(0.0)` for probability is a real value, not "unset".
#[derive(Debug, Clone, Default)]
pub struct OpportunityPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stage: Option<String>,
    pub amount: Option<f64>,
    pub close_date: Option<DateTime<Utc>>,
    pub probability: Option<f64>,
    pub lead_id: Option<EntityId>,
    pub account_id: Option<EntityId>,
    pub owner_id: Option<EntityId>,
}

fn reference(id: Option<EntityId>) -> Option<EntityId> {
    id.filter(|id| *id > 0)
}

impl CrmEntity for Opportunity {
    type Draft = NewOpportunity;
    type Patch = OpportunityPatch;

    const KIND: EntityKind = EntityKind::Opportunity;
    const PATCH_POLICY: PatchPolicy = PatchPolicy::PartialPatch;
    const SORT_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "stage",
        "amount",
        "close_date",
        "probability",
        "owner_id",
        "created_at",
        "updated_at",
    ];
    const FILTER_FIELD: Option<&'static str> = Some("owner_id");

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

    fn from_draft(draft: NewOpportunity, now: DateTime<Utc>) -> Result<Self, CrmError> {
        require_text("name", &draft.name)?;
        let stage = parse_member("stage", &draft.stage)?;
        ensure_positive("amount", draft.amount)?;
        ensure_percentage("probability", draft.probability)?;
        ensure_not_past("close_date", draft.close_date, now)?;

        let close_date = draft
            .close_date
            .unwrap_or(now + Duration::days(DEFAULT_CLOSE_OFFSET_DAYS));

        Ok(Self {
            id: 0,
            name: draft.name,
            description: optional_text(draft.description),
            stage,
            amount: draft.amount,
            close_date: Some(close_date),
            probability: draft.probability,
            lead_id: reference(draft.lead_id),
            account_id: reference(draft.account_id),
            owner_id: reference(draft.owner_id),
            created_at: now,
            updated_at: now,
        })
    }

    fn validate_patch(patch: &OpportunityPatch, now: DateTime<Utc>) -> Result<(), CrmError> {
        require_text_if_present("name", patch.name.as_deref())?;
        parse_member_if_present::<OpportunityStage>("stage", patch.stage.as_deref())?;
        if let Some(amount) = patch.amount {
            ensure_positive("amount", amount)?;
        }
        if let Some(probability) = patch.probability {
            ensure_percentage("probability", probability)?;
        }
        ensure_not_past("close_date", patch.close_date, now)
    }

    fn apply_patch(&mut self, patch: OpportunityPatch, _now: DateTime<Utc>) -> Result<(), CrmError> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = optional_text(Some(description));
        }
        if let Some(stage) = parse_member_if_present("stage", patch.stage.as_deref())? {
            self.stage = stage;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(close_date) = patch.close_date {
            self.close_date = Some(close_date);
        }
        if let Some(probability) = patch.probability {
            self.probability = probability;
        }
        if patch.lead_id.is_some() {
            self.lead_id = reference(patch.lead_id);
        }
        if patch.account_id.is_some() {
            self.account_id = reference(patch.account_id);
        }
        if patch.owner_id.is_some() {
            self.owner_id = reference(patch.owner_id);
        }
        Ok(())
    }

    /// `(lead_id, name)`; opportunities without a lead are not constrained.
    fn unique_key(&self) -> Option<String> {
        self.lead_id.map(|lead| format!("{}/{}", lead, self.name))
    }

    fn filter_value(&self) -> Option<EntityId> {
        self.owner_id
    }

    fn sort_value(&self, field: &str) -> SortValue {
        match field {
            "name" => SortValue::Text(self.name.clone()),
            "stage" => SortValue::Text(self.stage.as_str().to_string()),
            "amount" => SortValue::Float(self.amount),
            "close_date" => self.close_date.into(),
            "probability" => SortValue::Float(self.probability),
            "owner_id" => self.owner_id.map(SortValue::Int).unwrap_or(SortValue::Null),
            other => common_sort_value(self, other).unwrap_or(SortValue::Null),
        }
    }
}
