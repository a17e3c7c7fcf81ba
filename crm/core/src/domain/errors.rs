// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service-level error kinds
//!
//! Every entity service reports failures through [`CrmError`]. The set is
//! closed: the presentation layer matches on the variant to pick a transport
//! status, so adding a variant is a breaking change for every handler.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Closed error taxonomy shared by validation, services and handlers

/// Categorized failure returned by every entity service operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CrmError {
    /// Required field missing, enumerated value outside its set, date in the
    /// past, zero identifier or a dangling parent reference.
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid sort field: {0}")]
    InvalidSortField(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Opaque store failure. The message is logged, never retried.
    #[error("internal error: {0}")]
    Internal(String),

    /// The caller's cancellation token fired before the store answered.
    #[error("operation cancelled")]
    Cancelled,
}

impl CrmError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        CrmError::InvalidData(reason.into())
    }

    /// True for the variants produced by request validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CrmError::InvalidData(_) | CrmError::InvalidEmail(_) | CrmError::InvalidSortField(_)
        )
    }
}
