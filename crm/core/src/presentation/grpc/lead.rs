// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lead gRPC handler

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use super::convert::{
    entity_id, format_timestamp, list_params, missing_body, optional_reference, optional_string,
    wire_id, wire_reference,
};
use super::proto::lead_service_server::{LeadService, LeadServiceServer};
use super::proto::{self as pb};
use crate::application::entity_service::EntityService;
use crate::domain::errors::CrmError;
use crate::domain::lead::{Lead, LeadFields};

pub struct LeadHandler {
    service: Arc<EntityService<Lead>>,
    shutdown: CancellationToken,
}

impl LeadHandler {
    pub fn new(service: Arc<EntityService<Lead>>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    pub fn into_server(self) -> LeadServiceServer<Self> {
        LeadServiceServer::new(self)
    }
}

pub fn to_proto(lead: &Lead) -> pb::Lead {
    pb::Lead {
        id: wire_id(lead.id),
        first_name: lead.first_name.clone(),
        last_name: lead.last_name.clone(),
        email: lead.email.clone(),
        phone: lead.phone.clone().unwrap_or_default(),
        status: lead.status.to_string(),
        assigned_to: wire_reference(lead.assigned_to),
        organization_id: wire_reference(lead.organization_id),
        created_at: format_timestamp(lead.created_at),
        updated_at: format_timestamp(lead.updated_at),
    }
}

pub fn lead_fields(message: pb::Lead) -> Result<LeadFields, CrmError> {
    Ok(LeadFields {
        first_name: message.first_name,
        last_name: message.last_name,
        email: message.email,
        phone: optional_string(message.phone),
        status: message.status,
        assigned_to: optional_reference("assigned_to", message.assigned_to)?,
        organization_id: optional_reference("organization_id", message.organization_id)?,
    })
}

#[tonic::async_trait]
impl LeadService for LeadHandler {
    async fn create_lead(
        &self,
        request: Request<pb::CreateLeadRequest>,
    ) -> Result<Response<pb::CreateLeadResponse>, Status> {
        let message = request.into_inner().lead.ok_or_else(|| missing_body("lead"))?;
        let token = self.shutdown.child_token();

        let created = self.service.create(&token, lead_fields(message)?).await?;
        Ok(Response::new(pb::CreateLeadResponse {
            lead: Some(to_proto(&created)),
        }))
    }

    async fn get_lead(
        &self,
        request: Request<pb::GetLeadRequest>,
    ) -> Result<Response<pb::GetLeadResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        let lead = self.service.get(&token, id).await?;
        Ok(Response::new(pb::GetLeadResponse {
            lead: Some(to_proto(&lead)),
        }))
    }

    async fn get_lead_by_email(
        &self,
        request: Request<pb::GetLeadByEmailRequest>,
    ) -> Result<Response<pb::GetLeadByEmailResponse>, Status> {
        let email = request.into_inner().email;
        let token = self.shutdown.child_token();

        let lead = self.service.get_by_email(&token, email.trim()).await?;
        Ok(Response::new(pb::GetLeadByEmailResponse {
            lead: Some(to_proto(&lead)),
        }))
    }

    async fn update_lead(
        &self,
        request: Request<pb::UpdateLeadRequest>,
    ) -> Result<Response<pb::UpdateLeadResponse>, Status> {
        let message = request.into_inner().lead.ok_or_else(|| missing_body("lead"))?;
        let id = entity_id("id", message.id)?;
        let token = self.shutdown.child_token();

        let updated = self.service.update(&token, id, lead_fields(message)?).await?;
        Ok(Response::new(pb::UpdateLeadResponse {
            lead: Some(to_proto(&updated)),
        }))
    }

    async fn delete_lead(
        &self,
        request: Request<pb::DeleteLeadRequest>,
    ) -> Result<Response<pb::DeleteLeadResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        self.service.delete(&token, id).await?;
        Ok(Response::new(pb::DeleteLeadResponse { success: true }))
    }

    async fn list_leads(
        &self,
        request: Request<pb::ListLeadsRequest>,
    ) -> Result<Response<pb::ListLeadsResponse>, Status> {
        let request = request.into_inner();
        let params = list_params(
            request.page_number,
            request.page_size,
            request.sort_by,
            request.ascending,
            None,
        )?;
        let token = self.shutdown.child_token();

        let leads = self.service.list(&token, params).await?;
        Ok(Response::new(pb::ListLeadsResponse {
            leads: leads.iter().map(to_proto).collect(),
        }))
    }
}
