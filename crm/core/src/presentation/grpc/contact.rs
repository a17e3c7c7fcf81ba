// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Contact gRPC handler
//!
//! Updates replace every mutable field, so create and update share one
//! decoder.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use super::convert::{
    entity_id, format_timestamp, list_params, missing_body, optional_reference, optional_string,
    wire_id, wire_reference,
};
use super::proto::contact_service_server::{ContactService, ContactServiceServer};
use super::proto::{self as pb};
use crate::application::entity_service::EntityService;
use crate::domain::contact::{Contact, ContactFields};
use crate::domain::errors::CrmError;

pub struct ContactHandler {
    service: Arc<EntityService<Contact>>,
    shutdown: CancellationToken,
}

impl ContactHandler {
    pub fn new(service: Arc<EntityService<Contact>>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    pub fn into_server(self) -> ContactServiceServer<Self> {
        ContactServiceServer::new(self)
    }
}

pub fn to_proto(contact: &Contact) -> pb::Contact {
    pb::Contact {
        id: wire_id(contact.id),
        contact_type: contact.contact_type.to_string(),
        first_name: contact.first_name.clone().unwrap_or_default(),
        last_name: contact.last_name.clone().unwrap_or_default(),
        company_name: contact.company_name.clone().unwrap_or_default(),
        company_id: wire_reference(contact.company_id),
        email: contact.email.clone(),
        phone: contact.phone.clone().unwrap_or_default(),
        address: contact.address.clone().unwrap_or_default(),
        city: contact.city.clone().unwrap_or_default(),
        state: contact.state.clone().unwrap_or_default(),
        country: contact.country.clone().unwrap_or_default(),
        zip_code: contact.zip_code.clone().unwrap_or_default(),
        position: contact.position.clone().unwrap_or_default(),
        social_media_profiles: contact.social_media_profiles.clone().unwrap_or_default(),
        notes: contact.notes.clone().unwrap_or_default(),
        created_at: format_timestamp(contact.created_at),
        updated_at: format_timestamp(contact.updated_at),
    }
}

pub fn contact_fields(message: pb::Contact) -> Result<ContactFields, CrmError> {
    Ok(ContactFields {
        contact_type: message.contact_type,
        first_name: optional_string(message.first_name),
        last_name: optional_string(message.last_name),
        company_name: optional_string(message.company_name),
        company_id: optional_reference("company_id", message.company_id)?,
        email: message.email,
        phone: optional_string(message.phone),
        address: optional_string(message.address),
        city: optional_string(message.city),
        state: optional_string(message.state),
        country: optional_string(message.country),
        zip_code: optional_string(message.zip_code),
        position: optional_string(message.position),
        social_media_profiles: optional_string(message.social_media_profiles),
        notes: optional_string(message.notes),
    })
}

#[tonic::async_trait]
impl ContactService for ContactHandler {
    async fn create_contact(
        &self,
        request: Request<pb::CreateContactRequest>,
    ) -> Result<Response<pb::CreateContactResponse>, Status> {
        let message = request
            .into_inner()
            .contact
            .ok_or_else(|| missing_body("contact"))?;
        let token = self.shutdown.child_token();

        let created = self.service.create(&token, contact_fields(message)?).await?;
        Ok(Response::new(pb::CreateContactResponse {
            contact: Some(to_proto(&created)),
        }))
    }

    async fn get_contact(
        &self,
        request: Request<pb::GetContactRequest>,
    ) -> Result<Response<pb::GetContactResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        let contact = self.service.get(&token, id).await?;
        Ok(Response::new(pb::GetContactResponse {
            contact: Some(to_proto(&contact)),
        }))
    }

    async fn update_contact(
        &self,
        request: Request<pb::UpdateContactRequest>,
    ) -> Result<Response<pb::UpdateContactResponse>, Status> {
        let message = request
            .into_inner()
            .contact
            .ok_or_else(|| missing_body("contact"))?;
        let id = entity_id("id", message.id)?;
        let token = self.shutdown.child_token();

        let updated = self
            .service
            .update(&token, id, contact_fields(message)?)
            .await?;
        Ok(Response::new(pb::UpdateContactResponse {
            contact: Some(to_proto(&updated)),
        }))
    }

    async fn delete_contact(
        &self,
        request: Request<pb::DeleteContactRequest>,
    ) -> Result<Response<pb::DeleteContactResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        self.service.delete(&token, id).await?;
        Ok(Response::new(pb::DeleteContactResponse { success: true }))
    }

    async fn list_contacts(
        &self,
        request: Request<pb::ListContactsRequest>,
    ) -> Result<Response<pb::ListContactsResponse>, Status> {
        let request = request.into_inner();
        let params = list_params(
            request.page_number,
            request.page_size,
            request.sort_by,
            request.ascending,
            Some(("company_id", request.company_id)),
        )?;
        let token = self.shutdown.child_token();

        let contacts = self.service.list(&token, params).await?;
        Ok(Response::new(pb::ListContactsResponse {
            contacts: contacts.iter().map(to_proto).collect(),
        }))
    }
}
