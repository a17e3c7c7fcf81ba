// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Validation Rules
//!
//! Pure, side-effect-free checks shared by the six entity modules. Nothing in
//! here touches the store; the services run these before any I/O so that a
//! rejected request never reaches persistence.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Required-field, enumerated-set, email-shape and temporal checks

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

use crate::domain::entity::EntityId;
use crate::domain::errors::CrmError;

/// Declares a closed set of textual values.
///
/// The generated enum serializes to, and parses from, exactly the listed
/// strings. Parsing anything else fails with [`CrmError::InvalidData`] naming
/// the field and the allowed values.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($field:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::errors::CrmError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::domain::errors::CrmError::InvalidData(format!(
                        "{} must be one of [{}], got '{}'",
                        $field,
                        [$($text),+].join(", "),
                        other
                    ))),
                }
            }
        }
    };
}

pub(crate) use string_enum;

/// Rejects a blank required text field.
pub fn require_text(field: &str, value: &str) -> Result<(), CrmError> {
    if value.trim().is_empty() {
        return Err(CrmError::InvalidData(format!("{} is required", field)));
    }
    Ok(())
}

/// Rejects a supplied-but-blank required text field in a partial patch.
pub fn require_text_if_present(field: &str, value: Option<&str>) -> Result<(), CrmError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

/// Normalizes an optional text field: blank strings are stored as absent.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses a required enumerated field.
pub fn parse_member<T>(field: &str, value: &str) -> Result<T, CrmError>
where
    T: FromStr<Err = CrmError>,
{
    require_text(field, value)?;
    value.parse()
}

/// Parses an enumerated field that a partial patch may omit.
pub fn parse_member_if_present<T>(field: &str, value: Option<&str>) -> Result<Option<T>, CrmError>
where
    T: FromStr<Err = CrmError>,
{
    value.map(|v| parse_member(field, v)).transpose()
}

/// Rejects a missing or non-positive parent reference.
pub fn require_reference(field: &str, id: EntityId) -> Result<(), CrmError> {
    if id <= 0 {
        return Err(CrmError::InvalidData(format!("{} is required", field)));
    }
    Ok(())
}

/// Rejects a zero identifier on update or delete.
pub fn require_id(id: EntityId) -> Result<(), CrmError> {
    if id <= 0 {
        return Err(CrmError::InvalidData("id is required".to_string()));
    }
    Ok(())
}

/// A due or close date may be "now" but never strictly earlier.
pub fn ensure_not_past(
    field: &str,
    date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), CrmError> {
    match date {
        Some(d) if d < now => Err(CrmError::InvalidData(format!(
            "{} cannot be in the past",
            field
        ))),
        _ => Ok(()),
    }
}

/// Required email: blank is `InvalidData`, malformed is `InvalidEmail`.
pub fn require_email(field: &str, email: &str) -> Result<(), CrmError> {
    require_text(field, email)?;
    validate_email(email)
}

/// Optional email: checked only when supplied.
pub fn validate_optional_email(email: Option<&str>) -> Result<(), CrmError> {
    match email {
        Some(e) if !e.trim().is_empty() => validate_email(e),
        _ => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<(), CrmError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(CrmError::InvalidEmail(format!(
            "'{}' is not a valid email address",
            email
        )))
    }
}

/// `local@domain.tld`, with a top-level label of at least two letters.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Probability is a percentage.
pub fn ensure_percentage(field: &str, value: f64) -> Result<(), CrmError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CrmError::InvalidData(format!(
            "{} must be between 0 and 100",
            field
        )));
    }
    Ok(())
}

pub fn ensure_positive(field: &str, value: f64) -> Result<(), CrmError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CrmError::InvalidData(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(())
}
