// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Opportunity gRPC handler

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use super::convert::{
    entity_id, format_optional_timestamp, format_timestamp, list_params, missing_body,
    optional_reference, optional_string, parse_timestamp, wire_id, wire_reference,
};
use super::proto::opportunity_service_server::{OpportunityService, OpportunityServiceServer};
use super::proto::{self as pb};
use crate::application::entity_service::EntityService;
use crate::domain::entity::EntityId;
use crate::domain::errors::CrmError;
use crate::domain::opportunity::{NewOpportunity, Opportunity, OpportunityPatch};

pub struct OpportunityHandler {
    service: Arc<EntityService<Opportunity>>,
    shutdown: CancellationToken,
}

impl OpportunityHandler {
    pub fn new(service: Arc<EntityService<Opportunity>>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    pub fn into_server(self) -> OpportunityServiceServer<Self> {
        OpportunityServiceServer::new(self)
    }
}

pub fn to_proto(opportunity: &Opportunity) -> pb::Opportunity {
    pb::Opportunity {
        id: wire_id(opportunity.id),
        name: opportunity.name.clone(),
        description: opportunity.description.clone().unwrap_or_default(),
        stage: opportunity.stage.to_string(),
        amount: opportunity.amount,
        close_date: format_optional_timestamp(opportunity.close_date),
        probability: opportunity.probability,
        lead_id: wire_reference(opportunity.lead_id),
        account_id: wire_reference(opportunity.account_id),
        owner_id: wire_reference(opportunity.owner_id),
        created_at: format_timestamp(opportunity.created_at),
        updated_at: format_timestamp(opportunity.updated_at),
    }
}

pub fn new_opportunity(message: pb::Opportunity) -> Result<NewOpportunity, CrmError> {
    Ok(NewOpportunity {
        name: message.name,
        description: optional_string(message.description),
        stage: message.stage,
        amount: message.amount,
        close_date: parse_timestamp(&message.close_date),
        probability: message.probability,
        lead_id: optional_reference("lead_id", message.lead_id)?,
        account_id: optional_reference("account_id", message.account_id)?,
        owner_id: optional_reference("owner_id", message.owner_id)?,
    })
}

fn patch_reference(field: &str, value: Option<u64>) -> Result<Option<EntityId>, CrmError> {
    match value {
        Some(id) => optional_reference(field, id),
        None => Ok(None),
    }
}

pub fn opportunity_patch(request: &pb::UpdateOpportunityRequest) -> Result<OpportunityPatch, CrmError> {
    Ok(OpportunityPatch {
        name: request.name.clone(),
        description: request.description.clone(),
        stage: request.stage.clone(),
        amount: request.amount,
        close_date: request.close_date.as_deref().and_then(parse_timestamp),
        probability: request.probability,
        lead_id: patch_reference("lead_id", request.lead_id)?,
        account_id: patch_reference("account_id", request.account_id)?,
        owner_id: patch_reference("owner_id", request.owner_id)?,
    })
}

#[tonic::async_trait]
impl OpportunityService for OpportunityHandler {
    async fn create_opportunity(
        &self,
        request: Request<pb::CreateOpportunityRequest>,
    ) -> Result<Response<pb::CreateOpportunityResponse>, Status> {
        let message = request
            .into_inner()
            .opportunity
            .ok_or_else(|| missing_body("opportunity"))?;
        let token = self.shutdown.child_token();

        let created = self
            .service
            .create(&token, new_opportunity(message)?)
            .await?;
        Ok(Response::new(pb::CreateOpportunityResponse {
            opportunity: Some(to_proto(&created)),
        }))
    }

    async fn get_opportunity(
        &self,
        request: Request<pb::GetOpportunityRequest>,
    ) -> Result<Response<pb::GetOpportunityResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        let opportunity = self.service.get(&token, id).await?;
        Ok(Response::new(pb::GetOpportunityResponse {
            opportunity: Some(to_proto(&opportunity)),
        }))
    }

    async fn update_opportunity(
        &self,
        request: Request<pb::UpdateOpportunityRequest>,
    ) -> Result<Response<pb::UpdateOpportunityResponse>, Status> {
        let request = request.into_inner();
        let id = entity_id("id", request.id)?;
        let patch = opportunity_patch(&request)?;
        let token = self.shutdown.child_token();

        let updated = self.service.update(&token, id, patch).await?;
        Ok(Response::new(pb::UpdateOpportunityResponse {
            opportunity: Some(to_proto(&updated)),
        }))
    }

    async fn delete_opportunity(
        &self,
        request: Request<pb::DeleteOpportunityRequest>,
    ) -> Result<Response<pb::DeleteOpportunityResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        self.service.delete(&token, id).await?;
        Ok(Response::new(pb::DeleteOpportunityResponse { success: true }))
    }

    async fn list_opportunities(
        &self,
        request: Request<pb::ListOpportunitiesRequest>,
    ) -> Result<Response<pb::ListOpportunitiesResponse>, Status> {
        let request = request.into_inner();
        let params = list_params(
            request.page_number,
            request.page_size,
            request.sort_by,
            request.ascending,
            Some(("owner_id", request.owner_id)),
        )?;
        let token = self.shutdown.child_token();

        let opportunities = self.service.list(&token, params).await?;
        Ok(Response::new(pb::ListOpportunitiesResponse {
            opportunities: opportunities.iter().map(to_proto).collect(),
        }))
    }
}
