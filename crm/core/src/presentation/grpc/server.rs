// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! gRPC server for the CRM services

use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tonic::transport::server::Router;
use tonic::transport::Server;

use super::activity::ActivityHandler;
use super::company::CompanyHandler;
use super::contact::ContactHandler;
use super::lead::LeadHandler;
use super::opportunity::OpportunityHandler;
use super::task::TaskHandler;
use crate::application::crm_services::CrmServices;

/// Registers all six services. Requests exceeding `request_timeout` are
/// dropped, which cancels their in-flight store calls.
pub fn crm_router(
    services: &CrmServices,
    shutdown: &CancellationToken,
    request_timeout: Duration,
) -> Router {
    Server::builder()
        .timeout(request_timeout)
        .add_service(ActivityHandler::new(services.activities.clone(), shutdown.clone()).into_server())
        .add_service(TaskHandler::new(services.tasks.clone(), shutdown.clone()).into_server())
        .add_service(ContactHandler::new(services.contacts.clone(), shutdown.clone()).into_server())
        .add_service(CompanyHandler::new(services.companies.clone(), shutdown.clone()).into_server())
        .add_service(LeadHandler::new(services.leads.clone(), shutdown.clone()).into_server())
        .add_service(
            OpportunityHandler::new(services.opportunities.clone(), shutdown.clone()).into_server(),
        )
}

/// Start the gRPC server; returns once `shutdown` fires and in-flight calls drain.
pub async fn start_grpc_server(
    addr: SocketAddr,
    services: CrmServices,
    shutdown: CancellationToken,
    request_timeout: Duration,
) -> anyhow::Result<()> {
    tracing::info!("Starting CRM gRPC server on {}", addr);

    let router = crm_router(&services, &shutdown, request_timeout);
    router
        .serve_with_shutdown(addr, async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("gRPC server stopped");
    Ok(())
}
