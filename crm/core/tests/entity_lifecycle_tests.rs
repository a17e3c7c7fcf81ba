// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! End-to-end lifecycle tests over the in-memory store and broadcast bus.
//!
//! Covers creation, uniqueness, missing rows, pagination, partial and full
//! updates, delete cascades, event emission and cancellation.

mod common;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use common::*;
use crm_core::application::repository_factory::create_in_memory_repositories;
use crm_core::application::{EntityService, EventNotifier, ListParams};
use crm_core::domain::activity::{Activity, ActivityPatch, ActivityStatus};
use crm_core::domain::company::CompanyFields;
use crm_core::domain::entity::CrmEntity;
use crm_core::domain::errors::CrmError;
use crm_core::domain::events::EntityEvent;
use crm_core::domain::lead::{Lead, LeadFields};
use crm_core::domain::opportunity::{NewOpportunity, OpportunityPatch};
use crm_core::domain::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use crm_core::infrastructure::repositories::InMemoryStore;
use crm_core::infrastructure::BroadcastBus;

fn lead_fields(email: &str) -> LeadFields {
    LeadFields {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        status: "New".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_assigns_id_and_matching_timestamps() {
    let h = harness();
    let contact = seed_contact(&h, "grace@navy.mil").await;

    assert!(contact.id > 0);
    assert_eq!(contact.created_at, contact.updated_at);

    let fetched = h.services.contacts.get(&h.token, contact.id).await.unwrap();
    assert_eq!(fetched, contact);
}

#[tokio::test]
async fn test_duplicate_contact_email_is_rejected() {
    let h = harness();
    seed_contact(&h, "a@b.com").await;

    let err = h
        .services
        .contacts
        .create(&h.token, contact_fields("a@b.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::AlreadyExists(_)));
}

/// Get, update and delete of an id that was never assigned.
async fn assert_missing_row<E: CrmEntity>(
    svc: &EntityService<E>,
    token: &CancellationToken,
    patch: E::Patch,
) {
    assert!(
        matches!(svc.get(token, 999_999).await, Err(CrmError::NotFound(_))),
        "get {}",
        E::KIND
    );
    assert!(
        matches!(svc.update(token, 999_999, patch).await, Err(CrmError::NotFound(_))),
        "update {}",
        E::KIND
    );
    assert!(
        matches!(svc.delete(token, 999_999).await, Err(CrmError::NotFound(_))),
        "delete {}",
        E::KIND
    );
}

/// Creates `draft()` twice; the second insert must collide.
async fn assert_duplicate_rejected<E: CrmEntity + std::fmt::Debug>(
    svc: &EntityService<E>,
    token: &CancellationToken,
    draft: impl Fn() -> E::Draft,
) {
    svc.create(token, draft()).await.unwrap();
    let err = svc.create(token, draft()).await.unwrap_err();
    assert!(
        matches!(err, CrmError::AlreadyExists(_)),
        "{}: expected AlreadyExists, got {:?}",
        E::KIND,
        err
    );
}

fn company_fields(name: &str) -> CompanyFields {
    CompanyFields {
        name: name.to_string(),
        organization_id: 1,
        ..Default::default()
    }
}

fn send_deck(activity_id: i64) -> NewTask {
    NewTask {
        title: "Send deck".to_string(),
        status: "Pending".to_string(),
        priority: "High".to_string(),
        activity_id,
        ..Default::default()
    }
}

fn platform_deal() -> NewOpportunity {
    NewOpportunity {
        name: "Platform deal".to_string(),
        stage: "Prospecting".to_string(),
        amount: 50_000.0,
        probability: 25.0,
        lead_id: Some(1),
        owner_id: Some(4),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_missing_rows_are_not_found_for_every_entity() {
    let h = harness();
    let s = &h.services;

    assert_missing_row(
        &*s.activities,
        &h.token,
        ActivityPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_missing_row(
        &*s.tasks,
        &h.token,
        TaskPatch {
            priority: Some("Low".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_missing_row(&*s.contacts, &h.token, contact_fields("ghost@example.com")).await;
    assert_missing_row(&*s.companies, &h.token, company_fields("Ghost Corp")).await;
    assert_missing_row(&*s.leads, &h.token, lead_fields("ghost@example.com")).await;
    assert_missing_row(
        &*s.opportunities,
        &h.token,
        OpportunityPatch {
            stage: Some("Proposal".to_string()),
            ..Default::default()
        },
    )
    .await;
}

#[tokio::test]
async fn test_duplicate_unique_keys_rejected_for_every_entity() {
    let h = harness();
    let s = &h.services;
    let contact = seed_contact(&h, "owner@example.com").await;
    let activity = seed_activity(&h, "Parent", contact.id).await;

    assert_duplicate_rejected(&*s.activities, &h.token, || kickoff(contact.id)).await;
    assert_duplicate_rejected(&*s.tasks, &h.token, || send_deck(activity.id)).await;
    assert_duplicate_rejected(&*s.contacts, &h.token, || contact_fields("dup@example.com")).await;
    assert_duplicate_rejected(&*s.companies, &h.token, || company_fields("Analytical Engines"))
        .await;
    assert_duplicate_rejected(&*s.leads, &h.token, || lead_fields("dup@example.com")).await;
    assert_duplicate_rejected(&*s.opportunities, &h.token, platform_deal).await;
}

#[tokio::test]
async fn test_zero_pagination_uses_defaults() {
    let h = harness();
    for i in 0..12 {
        h.services
            .leads
            .create(&h.token, lead_fields(&format!("lead{}@example.com", i)))
            .await
            .unwrap();
    }

    let first_page = h
        .services
        .leads
        .list(
            &h.token,
            ListParams {
                page_number: 0,
                page_size: 0,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first_page.len(), 10);
    assert_eq!(first_page[0].id, 1);

    let second_page = h
        .services
        .leads
        .list(
            &h.token,
            ListParams {
                page_number: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let ids: Vec<i64> = second_page.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![11, 12]);
}

#[tokio::test]
async fn test_sort_and_filter() {
    let h = harness();
    let first = seed_contact(&h, "first@example.com").await;
    let second = seed_contact(&h, "second@example.com").await;
    seed_activity(&h, "Beta", first.id).await;
    seed_activity(&h, "Alpha", first.id).await;
    seed_activity(&h, "Gamma", second.id).await;

    let titles: Vec<String> = h
        .services
        .activities
        .list(
            &h.token,
            ListParams {
                sort_by: Some("title".to_string()),
                ascending: true,
                filter: Some(first.id),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(titles, vec!["Alpha", "Beta"]);

    let descending = h
        .services
        .activities
        .list(
            &h.token,
            ListParams {
                sort_by: Some("title".to_string()),
                ascending: false,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(descending[0].title, "Gamma");
}

#[tokio::test]
async fn test_unknown_sort_field_is_rejected() {
    let h = harness();
    let err = h
        .services
        .companies
        .list(
            &h.token,
            ListParams {
                sort_by: Some("secret".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::InvalidSortField(_)));
}

#[tokio::test]
async fn test_partial_update_is_idempotent_and_leaves_other_fields() {
    let h = harness();
    let contact = seed_contact(&h, "owner@example.com").await;
    let activity = h
        .services
        .activities
        .create(&h.token, kickoff(contact.id))
        .await
        .unwrap();

    let patch = ActivityPatch {
        status: Some("Completed".to_string()),
        ..Default::default()
    };
    let once = h
        .services
        .activities
        .update(&h.token, activity.id, patch.clone())
        .await
        .unwrap();
    let twice = h
        .services
        .activities
        .update(&h.token, activity.id, patch)
        .await
        .unwrap();

    assert_eq!(once.status, ActivityStatus::Completed);
    assert_eq!(once.title, activity.title);
    assert_eq!(once.activity_type, activity.activity_type);
    assert_eq!(once.due_date, activity.due_date);
    assert_eq!(once.contact_id, activity.contact_id);
    assert_eq!(once.created_at, activity.created_at);

    assert_eq!(
        Activity { updated_at: once.updated_at, ..twice.clone() },
        once
    );
    assert!(twice.updated_at >= once.updated_at);
}

#[tokio::test]
async fn test_task_partial_update_is_idempotent() {
    let h = harness();
    let contact = seed_contact(&h, "tasks@example.com").await;
    let activity = seed_activity(&h, "Planning", contact.id).await;
    let task = h
        .services
        .tasks
        .create(&h.token, send_deck(activity.id))
        .await
        .unwrap();

    let patch = TaskPatch {
        status: Some("In Progress".to_string()),
        ..Default::default()
    };
    let once = h
        .services
        .tasks
        .update(&h.token, task.id, patch.clone())
        .await
        .unwrap();
    let twice = h
        .services
        .tasks
        .update(&h.token, task.id, patch)
        .await
        .unwrap();

    assert_eq!(once.status, TaskStatus::InProgress);
    assert_eq!(once.title, task.title);
    assert_eq!(once.priority, TaskPriority::High);
    assert_eq!(once.due_date, task.due_date);
    assert_eq!(once.activity_id, activity.id);
    assert_eq!(once.created_at, task.created_at);

    assert_eq!(Task { updated_at: once.updated_at, ..twice }, once);
}

#[tokio::test]
async fn test_opportunity_zero_probability_patch() {
    let h = harness();
    let opportunity = h
        .services
        .opportunities
        .create(
            &h.token,
            NewOpportunity {
                name: "Platform deal".to_string(),
                stage: "Prospecting".to_string(),
                amount: 50_000.0,
                probability: 25.0,
                owner_id: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = h
        .services
        .opportunities
        .update(
            &h.token,
            opportunity.id,
            OpportunityPatch {
                probability: Some(0.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.probability, 0.0);
    assert_eq!(updated.amount, 50_000.0);
    assert_eq!(updated.owner_id, Some(4));
}

#[tokio::test]
async fn test_full_replace_update_validates_everything() {
    let h = harness();
    let contact = seed_contact(&h, "replace@example.com").await;

    let mut fields = contact_fields("replace@example.com");
    fields.city = Some("Arlington".to_string());
    let updated = h
        .services
        .contacts
        .update(&h.token, contact.id, fields)
        .await
        .unwrap();
    assert_eq!(updated.city.as_deref(), Some("Arlington"));
    assert_eq!(updated.created_at, contact.created_at);

    let err = h
        .services
        .contacts
        .update(&h.token, contact.id, contact_fields("broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::InvalidEmail(_)));
}

#[tokio::test]
async fn test_kickoff_scenario_emits_one_event_then_deletes() {
    let h = harness();
    let contact = seed_contact(&h, "kickoff@example.com").await;
    let mut created = h.bus.subscribe_topic("activity-created");
    let mut deleted = h.bus.subscribe_topic("activity-deleted");

    let activity = h
        .services
        .activities
        .create(&h.token, kickoff(contact.id))
        .await
        .unwrap();

    let message = next_message(&mut created).await.expect("created event");
    assert_eq!(message.key, activity.id.to_string());
    assert!(String::from_utf8_lossy(&message.payload).contains("Kickoff"));
    assert!(next_message(&mut created).await.is_none());

    h.services
        .activities
        .delete(&h.token, activity.id)
        .await
        .unwrap();
    let message = next_message(&mut deleted).await.expect("deleted event");
    let event: EntityEvent = message.json().unwrap();
    assert_eq!(event.id, activity.id);
    assert!(event.data.is_none());

    assert!(matches!(
        h.services.activities.get(&h.token, activity.id).await,
        Err(CrmError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_event_lists_changed_fields() {
    let h = harness();
    let contact = seed_contact(&h, "changes@example.com").await;
    let activity = seed_activity(&h, "Demo", contact.id).await;
    let mut updated = h.bus.subscribe_topic("activity-updated");

    h.services
        .activities
        .update(
            &h.token,
            activity.id,
            ActivityPatch {
                title: Some("Demo v2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let event: EntityEvent = next_message(&mut updated)
        .await
        .expect("updated event")
        .json()
        .unwrap();
    assert_eq!(event.changed, vec!["title".to_string()]);
}

#[tokio::test]
async fn test_invalid_lead_email_never_reaches_store() {
    let store = InMemoryStore::new();
    let spy = Arc::new(SpyRepository::<Lead>::new(
        create_in_memory_repositories(store).leads,
    ));
    let service = EntityService::new(
        spy.clone(),
        EventNotifier::new(Arc::new(BroadcastBus::new(8))),
    );

    let err = service
        .create(&CancellationToken::new(), lead_fields("not-an-email"))
        .await
        .unwrap_err();

    assert!(matches!(err, CrmError::InvalidEmail(_)));
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_lead_lookup_by_email() {
    let h = harness();
    let lead = h
        .services
        .leads
        .create(&h.token, lead_fields("ada@engine.org"))
        .await
        .unwrap();

    let found = h
        .services
        .leads
        .get_by_email(&h.token, "ada@engine.org")
        .await
        .unwrap();
    assert_eq!(found.id, lead.id);

    assert!(matches!(
        h.services.leads.get_by_email(&h.token, "nobody@engine.org").await,
        Err(CrmError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_missing_parent_is_invalid_data() {
    let h = harness();
    let err = h
        .services
        .activities
        .create(&h.token, kickoff(42))
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::InvalidData(_)));
}

#[tokio::test]
async fn test_deleting_contact_cascades_to_activities_and_tasks() {
    let h = harness();
    let contact = seed_contact(&h, "cascade@example.com").await;
    let activity = seed_activity(&h, "Cascade", contact.id).await;
    let task = h
        .services
        .tasks
        .create(&h.token, send_deck(activity.id))
        .await
        .unwrap();

    h.services.contacts.delete(&h.token, contact.id).await.unwrap();

    assert!(matches!(
        h.services.activities.get(&h.token, activity.id).await,
        Err(CrmError::NotFound(_))
    ));
    assert!(matches!(
        h.services.tasks.get(&h.token, task.id).await,
        Err(CrmError::NotFound(_))
    ));
    assert_eq!(h.store.count::<Task>(), 0);
}

#[tokio::test]
async fn test_deleting_company_detaches_contacts() {
    let h = harness();
    let company = h
        .services
        .companies
        .create(
            &h.token,
            CompanyFields {
                name: "Analytical Engines".to_string(),
                organization_id: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut fields = contact_fields("employee@engines.io");
    fields.company_id = Some(company.id);
    let contact = h.services.contacts.create(&h.token, fields).await.unwrap();

    h.services.companies.delete(&h.token, company.id).await.unwrap();

    let contact = h.services.contacts.get(&h.token, contact.id).await.unwrap();
    assert_eq!(contact.company_id, None);
}

#[tokio::test]
async fn test_bus_failure_does_not_fail_mutation() {
    let h = harness_with_failing_bus();
    let lead = h
        .services
        .leads
        .create(&h.token, lead_fields("resilient@example.com"))
        .await
        .unwrap();
    h.services.leads.delete(&h.token, lead.id).await.unwrap();
}

#[tokio::test]
async fn test_cancelled_request_is_abandoned() {
    let h = harness();
    let token = CancellationToken::new();
    token.cancel();

    let err = h
        .services
        .leads
        .create(&token, lead_fields("late@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err, CrmError::Cancelled);
    assert!(h
        .services
        .leads
        .list(&h.token, ListParams::default())
        .await
        .unwrap()
        .is_empty());
}
