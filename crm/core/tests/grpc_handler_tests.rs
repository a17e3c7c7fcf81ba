// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! gRPC handler tests: wire decoding, status codes and round-trips, driven
//! through the generated service traits without a network listener.

mod common;

use tokio_util::sync::CancellationToken;
use tonic::{Code, Request};

use common::harness;
use crm_core::presentation::grpc::activity::ActivityHandler;
use crm_core::presentation::grpc::contact::ContactHandler;
use crm_core::presentation::grpc::lead::LeadHandler;
use crm_core::presentation::grpc::opportunity::OpportunityHandler;
use crm_core::presentation::grpc::proto::activity_service_server::ActivityService;
use crm_core::presentation::grpc::proto::contact_service_server::ContactService;
use crm_core::presentation::grpc::proto::lead_service_server::LeadService;
use crm_core::presentation::grpc::proto::opportunity_service_server::OpportunityService;
use crm_core::presentation::grpc::proto::*;

fn contact_message(email: &str) -> Contact {
    Contact {
        contact_type: "individual".to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: email.to_string(),
        ..Default::default()
    }
}

fn lead_message(email: &str) -> Lead {
    Lead {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        status: "Qualified".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_activity_round_trip_preserves_fields() {
    let h = harness();
    let shutdown = CancellationToken::new();
    let contacts = ContactHandler::new(h.services.contacts.clone(), shutdown.clone());
    let activities = ActivityHandler::new(h.services.activities.clone(), shutdown);

    let contact = contacts
        .create_contact(Request::new(CreateContactRequest {
            contact: Some(contact_message("wire@example.com")),
        }))
        .await
        .unwrap()
        .into_inner()
        .contact
        .unwrap();

    let sent = Activity {
        title: "Kickoff".to_string(),
        description: "Agenda TBD".to_string(),
        r#type: "Meeting".to_string(),
        status: "Pending".to_string(),
        due_date: "2099-01-02T03:04:05Z".to_string(),
        contact_id: contact.id,
        ..Default::default()
    };
    let created = activities
        .create_activity(Request::new(CreateActivityRequest {
            activity: Some(sent.clone()),
        }))
        .await
        .unwrap()
        .into_inner()
        .activity
        .unwrap();

    assert!(created.id > 0);
    assert_eq!(created.title, sent.title);
    assert_eq!(created.description, sent.description);
    assert_eq!(created.r#type, sent.r#type);
    assert_eq!(created.due_date, sent.due_date);
    assert_eq!(created.contact_id, contact.id);
    assert_eq!(created.created_at, created.updated_at);
    assert!(created.created_at.ends_with('Z'));
    assert_eq!(created.created_at.len(), "2099-01-02T03:04:05Z".len());

    let fetched = activities
        .get_activity(Request::new(GetActivityRequest { id: created.id }))
        .await
        .unwrap()
        .into_inner()
        .activity
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_date_only_input_is_accepted() {
    let h = harness();
    let handler = OpportunityHandler::new(h.services.opportunities.clone(), CancellationToken::new());

    let created = handler
        .create_opportunity(Request::new(CreateOpportunityRequest {
            opportunity: Some(Opportunity {
                name: "Expansion".to_string(),
                stage: "Negotiation".to_string(),
                amount: 1200.5,
                probability: 60.0,
                close_date: "2099-06-30".to_string(),
                ..Default::default()
            }),
        }))
        .await
        .unwrap()
        .into_inner()
        .opportunity
        .unwrap();

    assert_eq!(created.close_date, "2099-06-30T00:00:00Z");
    assert_eq!(created.lead_id, 0);
    assert_eq!(created.description, "");
}

#[tokio::test]
async fn test_partial_update_over_the_wire() {
    let h = harness();
    let handler = OpportunityHandler::new(h.services.opportunities.clone(), CancellationToken::new());
    let created = handler
        .create_opportunity(Request::new(CreateOpportunityRequest {
            opportunity: Some(Opportunity {
                name: "Renewal".to_string(),
                stage: "Proposal".to_string(),
                amount: 900.0,
                probability: 30.0,
                ..Default::default()
            }),
        }))
        .await
        .unwrap()
        .into_inner()
        .opportunity
        .unwrap();

    let updated = handler
        .update_opportunity(Request::new(UpdateOpportunityRequest {
            id: created.id,
            stage: Some("Closed Won".to_string()),
            probability: Some(100.0),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner()
        .opportunity
        .unwrap();

    assert_eq!(updated.stage, "Closed Won");
    assert_eq!(updated.probability, 100.0);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.amount, created.amount);
    assert_eq!(updated.close_date, created.close_date);
}

#[tokio::test]
async fn test_status_codes() {
    let h = harness();
    let leads = LeadHandler::new(h.services.leads.clone(), CancellationToken::new());

    let status = leads
        .create_lead(Request::new(CreateLeadRequest {
            lead: Some(lead_message("not-an-email")),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = leads
        .create_lead(Request::new(CreateLeadRequest { lead: None }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = leads
        .get_lead(Request::new(GetLeadRequest { id: 999_999 }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    leads
        .create_lead(Request::new(CreateLeadRequest {
            lead: Some(lead_message("dup@example.com")),
        }))
        .await
        .unwrap();
    let status = leads
        .create_lead(Request::new(CreateLeadRequest {
            lead: Some(lead_message("dup@example.com")),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::AlreadyExists);

    let status = leads
        .list_leads(Request::new(ListLeadsRequest {
            sort_by: "password".to_string(),
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = leads
        .list_leads(Request::new(ListLeadsRequest {
            page_number: u32::MAX,
            page_size: u32::MAX,
            ..Default::default()
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_shutdown_cancels_requests() {
    let h = harness();
    let shutdown = CancellationToken::new();
    let leads = LeadHandler::new(h.services.leads.clone(), shutdown.clone());
    shutdown.cancel();

    let status = leads
        .get_lead(Request::new(GetLeadRequest { id: 1 }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Cancelled);
}

#[tokio::test]
async fn test_get_lead_by_email() {
    let h = harness();
    let leads = LeadHandler::new(h.services.leads.clone(), CancellationToken::new());

    let created = leads
        .create_lead(Request::new(CreateLeadRequest {
            lead: Some(lead_message("lookup@example.com")),
        }))
        .await
        .unwrap()
        .into_inner()
        .lead
        .unwrap();

    let found = leads
        .get_lead_by_email(Request::new(GetLeadByEmailRequest {
            email: "lookup@example.com".to_string(),
        }))
        .await
        .unwrap()
        .into_inner()
        .lead
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.status, "Qualified");

    let blank = leads
        .get_lead_by_email(Request::new(GetLeadByEmailRequest { email: String::new() }))
        .await
        .unwrap_err();
    assert_eq!(blank.code(), Code::InvalidArgument);

    let missing = leads
        .get_lead_by_email(Request::new(GetLeadByEmailRequest {
            email: "ghost@example.com".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(missing.code(), Code::NotFound);
}

#[tokio::test]
async fn test_delete_then_list_by_parent() {
    let h = harness();
    let shutdown = CancellationToken::new();
    let contacts = ContactHandler::new(h.services.contacts.clone(), shutdown.clone());
    let activities = ActivityHandler::new(h.services.activities.clone(), shutdown);

    let contact = contacts
        .create_contact(Request::new(CreateContactRequest {
            contact: Some(contact_message("parent@example.com")),
        }))
        .await
        .unwrap()
        .into_inner()
        .contact
        .unwrap();

    for title in ["One", "Two"] {
        activities
            .create_activity(Request::new(CreateActivityRequest {
                activity: Some(Activity {
                    title: title.to_string(),
                    r#type: "Call".to_string(),
                    status: "Pending".to_string(),
                    contact_id: contact.id,
                    ..Default::default()
                }),
            }))
            .await
            .unwrap();
    }

    let listed = activities
        .list_activities(Request::new(ListActivitiesRequest {
            contact_id: contact.id,
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner()
        .activities;
    assert_eq!(listed.len(), 2);

    let deleted = contacts
        .delete_contact(Request::new(DeleteContactRequest { id: contact.id }))
        .await
        .unwrap()
        .into_inner();
    assert!(deleted.success);

    let listed = activities
        .list_activities(Request::new(ListActivitiesRequest::default()))
        .await
        .unwrap()
        .into_inner()
        .activities;
    assert!(listed.is_empty());
}
