// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Wire conversions shared by the gRPC handlers.
//!
//! Protobuf has no "absent" for scalars, so optional text travels as `""`,
//! optional references as `0`, and timestamps as second-precision RFC 3339
//! strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use tonic::Status;
use tracing::error;

use crate::application::entity_service::ListParams;
use crate::domain::entity::EntityId;
use crate::domain::errors::CrmError;

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC). Anything else
/// counts as absent.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn format_optional_timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map(format_timestamp).unwrap_or_default()
}

/// `""` means absent.
pub fn optional_string(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn entity_id(field: &str, value: u64) -> Result<EntityId, CrmError> {
    EntityId::try_from(value)
        .map_err(|_| CrmError::InvalidData(format!("{} {} is out of range", field, value)))
}

/// `0` means absent.
pub fn optional_reference(field: &str, value: u64) -> Result<Option<EntityId>, CrmError> {
    match value {
        0 => Ok(None),
        other => entity_id(field, other).map(Some),
    }
}

pub fn wire_id(id: EntityId) -> u64 {
    u64::try_from(id).unwrap_or_default()
}

pub fn wire_reference(id: Option<EntityId>) -> u64 {
    id.map(wire_id).unwrap_or_default()
}

pub fn list_params(
    page_number: u32,
    page_size: u32,
    sort_by: String,
    ascending: bool,
    filter: Option<(&str, u64)>,
) -> Result<ListParams, CrmError> {
    let filter = match filter {
        Some((field, value)) => optional_reference(field, value)?,
        None => None,
    };

    Ok(ListParams {
        page_number,
        page_size,
        sort_by: optional_string(sort_by),
        ascending,
        filter,
    })
}

pub fn missing_body(field: &str) -> Status {
    Status::invalid_argument(format!("{} is required", field))
}

impl From<CrmError> for Status {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::InvalidData(_) | CrmError::InvalidEmail(_) | CrmError::InvalidSortField(_) => {
                Status::invalid_argument(err.to_string())
            }
            CrmError::NotFound(_) => Status::not_found(err.to_string()),
            CrmError::AlreadyExists(_) => Status::already_exists(err.to_string()),
            CrmError::Cancelled => Status::cancelled(err.to_string()),
            CrmError::Internal(ref detail) => {
                error!("Internal error surfaced to client: {}", detail);
                Status::internal("internal error")
            }
        }
    }
}
