// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod notifier;
pub mod entity_service;
pub mod crm_services;
pub mod repository_factory;

pub use crm_services::{CrmServices, RepositorySet};
pub use entity_service::{EntityService, ListParams};
pub use notifier::EventNotifier;
