// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Company gRPC handler

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use super::convert::{
    entity_id, format_timestamp, list_params, missing_body, optional_reference, optional_string,
    wire_id, wire_reference,
};
use super::proto::company_service_server::{CompanyService, CompanyServiceServer};
use super::proto::{self as pb};
use crate::application::entity_service::EntityService;
use crate::domain::company::{Company, CompanyFields};
use crate::domain::errors::CrmError;

pub struct CompanyHandler {
    service: Arc<EntityService<Company>>,
    shutdown: CancellationToken,
}

impl CompanyHandler {
    pub fn new(service: Arc<EntityService<Company>>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    pub fn into_server(self) -> CompanyServiceServer<Self> {
        CompanyServiceServer::new(self)
    }
}

pub fn to_proto(company: &Company) -> pb::Company {
    pb::Company {
        id: wire_id(company.id),
        name: company.name.clone(),
        industry: company.industry.clone().unwrap_or_default(),
        website: company.website.clone().unwrap_or_default(),
        phone: company.phone.clone().unwrap_or_default(),
        email: company.email.clone().unwrap_or_default(),
        address: company.address.clone().unwrap_or_default(),
        city: company.city.clone().unwrap_or_default(),
        state: company.state.clone().unwrap_or_default(),
        country: company.country.clone().unwrap_or_default(),
        zip_code: company.zip_code.clone().unwrap_or_default(),
        created_by: wire_reference(company.created_by),
        organization_id: wire_id(company.organization_id),
        created_at: format_timestamp(company.created_at),
        updated_at: format_timestamp(company.updated_at),
    }
}

pub fn company_fields(message: pb::Company) -> Result<CompanyFields, CrmError> {
    Ok(CompanyFields {
        name: message.name,
        industry: optional_string(message.industry),
        website: optional_string(message.website),
        phone: optional_string(message.phone),
        email: optional_string(message.email),
        address: optional_string(message.address),
        city: optional_string(message.city),
        state: optional_string(message.state),
        country: optional_string(message.country),
        zip_code: optional_string(message.zip_code),
        created_by: optional_reference("created_by", message.created_by)?,
        organization_id: entity_id("organization_id", message.organization_id)?,
    })
}

#[tonic::async_trait]
impl CompanyService for CompanyHandler {
    async fn create_company(
        &self,
        request: Request<pb::CreateCompanyRequest>,
    ) -> Result<Response<pb::CreateCompanyResponse>, Status> {
        let message = request
            .into_inner()
            .company
            .ok_or_else(|| missing_body("company"))?;
        let token = self.shutdown.child_token();

        let created = self.service.create(&token, company_fields(message)?).await?;
        Ok(Response::new(pb::CreateCompanyResponse {
            company: Some(to_proto(&created)),
        }))
    }

    async fn get_company(
        &self,
        request: Request<pb::GetCompanyRequest>,
    ) -> Result<Response<pb::GetCompanyResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        let company = self.service.get(&token, id).await?;
        Ok(Response::new(pb::GetCompanyResponse {
            company: Some(to_proto(&company)),
        }))
    }

    async fn update_company(
        &self,
        request: Request<pb::UpdateCompanyRequest>,
    ) -> Result<Response<pb::UpdateCompanyResponse>, Status> {
        let message = request
            .into_inner()
            .company
            .ok_or_else(|| missing_body("company"))?;
        let id = entity_id("id", message.id)?;
        let token = self.shutdown.child_token();

        let updated = self
            .service
            .update(&token, id, company_fields(message)?)
            .await?;
        Ok(Response::new(pb::UpdateCompanyResponse {
            company: Some(to_proto(&updated)),
        }))
    }

    async fn delete_company(
        &self,
        request: Request<pb::DeleteCompanyRequest>,
    ) -> Result<Response<pb::DeleteCompanyResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        self.service.delete(&token, id).await?;
        Ok(Response::new(pb::DeleteCompanyResponse { success: true }))
    }

    async fn list_companies(
        &self,
        request: Request<pb::ListCompaniesRequest>,
    ) -> Result<Response<pb::ListCompaniesResponse>, Status> {
        let request = request.into_inner();
        let params = list_params(
            request.page_number,
            request.page_size,
            request.sort_by,
            request.ascending,
            Some(("organization_id", request.organization_id)),
        )?;
        let token = self.shutdown.child_token();

        let companies = self.service.list(&token, params).await?;
        Ok(Response::new(pb::ListCompaniesResponse {
            companies: companies.iter().map(to_proto).collect(),
        }))
    }
}
