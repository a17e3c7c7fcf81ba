// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! CRM Services
//!
//! Wires one [`EntityService`] per entity around a shared notifier.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Composition root for the entity services

use std::sync::Arc;

use crate::application::entity_service::EntityService;
use crate::application::notifier::EventNotifier;
use crate::domain::activity::Activity;
use crate::domain::company::Company;
use crate::domain::contact::Contact;
use crate::domain::lead::Lead;
use crate::domain::opportunity::Opportunity;
use crate::domain::repository::EntityRepository;
use crate::domain::task::Task;

/// One repository per entity, all backed by the same store.
#[derive(Clone)]
pub struct RepositorySet {
    pub activities: Arc<dyn EntityRepository<Activity>>,
    pub tasks: Arc<dyn EntityRepository<Task>>,
    pub contacts: Arc<dyn EntityRepository<Contact>>,
    pub companies: Arc<dyn EntityRepository<Company>>,
    pub leads: Arc<dyn EntityRepository<Lead>>,
    pub opportunities: Arc<dyn EntityRepository<Opportunity>>,
}

#[derive(Clone)]
pub struct CrmServices {
    pub activities: Arc<EntityService<Activity>>,
    pub tasks: Arc<EntityService<Task>>,
    pub contacts: Arc<EntityService<Contact>>,
    pub companies: Arc<EntityService<Company>>,
    pub leads: Arc<EntityService<Lead>>,
    pub opportunities: Arc<EntityService<Opportunity>>,
}

impl CrmServices {
    pub fn new(repositories: RepositorySet, notifier: EventNotifier) -> Self {
        Self {
            activities: Arc::new(EntityService::new(repositories.activities, notifier.clone())),
            tasks: Arc::new(EntityService::new(repositories.tasks, notifier.clone())),
            contacts: Arc::new(EntityService::new(repositories.contacts, notifier.clone())),
            companies: Arc::new(EntityService::new(repositories.companies, notifier.clone())),
            leads: Arc::new(EntityService::new(repositories.leads, notifier.clone())),
            opportunities: Arc::new(EntityService::new(repositories.opportunities, notifier)),
        }
    }
}
