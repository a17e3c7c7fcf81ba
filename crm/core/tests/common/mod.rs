// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared fixtures for the integration tests: an in-memory wiring of all six
//! services, a call-counting repository wrapper and a bus that always fails.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crm_core::application::repository_factory::create_in_memory_repositories;
use crm_core::application::{CrmServices, EventNotifier};
use crm_core::domain::activity::{Activity, NewActivity};
use crm_core::domain::bus::{BusError, MessageBus};
use crm_core::domain::contact::{Contact, ContactFields};
use crm_core::domain::entity::{CrmEntity, EntityId};
use crm_core::domain::repository::{EntityRepository, ListQuery, RepositoryError};
use crm_core::infrastructure::event_bus::{BusMessage, TopicReceiver};
use crm_core::infrastructure::repositories::InMemoryStore;
use crm_core::infrastructure::BroadcastBus;

pub struct Harness {
    pub services: CrmServices,
    pub bus: BroadcastBus,
    pub store: InMemoryStore,
    pub token: CancellationToken,
}

pub fn harness() -> Harness {
    let store = InMemoryStore::new();
    let bus = BroadcastBus::new(64);
    let services = CrmServices::new(
        create_in_memory_repositories(store.clone()),
        EventNotifier::new(Arc::new(bus.clone())),
    );
    Harness {
        services,
        bus,
        store,
        token: CancellationToken::new(),
    }
}

/// Services whose every publish fails.
pub fn harness_with_failing_bus() -> Harness {
    let store = InMemoryStore::new();
    let services = CrmServices::new(
        create_in_memory_repositories(store.clone()),
        EventNotifier::new(Arc::new(FailingBus)),
    );
    Harness {
        services,
        bus: BroadcastBus::new(1),
        store,
        token: CancellationToken::new(),
    }
}

/// Waits briefly for the next record on `receiver`.
pub async fn next_message(receiver: &mut TopicReceiver) -> Option<BusMessage> {
    tokio::time::timeout(Duration::from_millis(500), receiver.recv())
        .await
        .ok()
        .and_then(Result::ok)
}

pub fn contact_fields(email: &str) -> ContactFields {
    ContactFields {
        contact_type: "individual".to_string(),
        first_name: Some("Grace".to_string()),
        last_name: Some("Hopper".to_string()),
        email: email.to_string(),
        ..Default::default()
    }
}

pub async fn seed_contact(h: &Harness, email: &str) -> Contact {
    h.services
        .contacts
        .create(&h.token, contact_fields(email))
        .await
        .unwrap()
}

pub fn kickoff(contact_id: EntityId) -> NewActivity {
    NewActivity {
        title: "Kickoff".to_string(),
        activity_type: "Meeting".to_string(),
        status: "Pending".to_string(),
        contact_id,
        ..Default::default()
    }
}

pub async fn seed_activity(h: &Harness, title: &str, contact_id: EntityId) -> Activity {
    h.services
        .activities
        .create(
            &h.token,
            NewActivity {
                title: title.to_string(),
                ..kickoff(contact_id)
            },
        )
        .await
        .unwrap()
}

pub struct FailingBus;

#[async_trait]
impl MessageBus for FailingBus {
    async fn publish(&self, _: &str, _: &str, _: Vec<u8>) -> Result<(), BusError> {
        Err(BusError::Transport("broker unreachable".to_string()))
    }
}

/// Counts every call before delegating.
pub struct SpyRepository<E> {
    inner: Arc<dyn EntityRepository<E>>,
    calls: AtomicUsize,
}

impl<E: CrmEntity> SpyRepository<E> {
    pub fn new(inner: Arc<dyn EntityRepository<E>>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<E: CrmEntity> EntityRepository<E> for SpyRepository<E> {
    async fn create(&self, entity: &E) -> Result<E, RepositoryError> {
        self.record();
        self.inner.create(entity).await
    }

    async fn get(&self, id: EntityId) -> Result<Option<E>, RepositoryError> {
        self.record();
        self.inner.get(id).await
    }

    async fn update(&self, entity: &E) -> Result<E, RepositoryError> {
        self.record();
        self.inner.update(entity).await
    }

    async fn delete(&self, id: EntityId) -> Result<(), RepositoryError> {
        self.record();
        self.inner.delete(id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<E>, RepositoryError> {
        self.record();
        self.inner.list(query).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<E>, RepositoryError> {
        self.record();
        self.inner.find_by_email(email).await
    }
}
