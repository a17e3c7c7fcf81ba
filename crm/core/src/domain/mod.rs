// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Entities, validation rules, events and persistence contracts for the CRM.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure business rules with no I/O

pub mod validation;
pub mod errors;
pub mod entity;
pub mod events;
pub mod repository;
pub mod bus;
pub mod service_config;

pub mod activity;
pub mod task;
pub mod contact;
pub mod company;
pub mod lead;
pub mod opportunity;

pub use entity::{CrmEntity, EntityId, EntityKind, PatchPolicy};
pub use errors::CrmError;
