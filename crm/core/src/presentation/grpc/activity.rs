// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Activity gRPC handler

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use super::convert::{
    entity_id, format_optional_timestamp, format_timestamp, list_params, missing_body,
    optional_reference, optional_string, parse_timestamp, wire_id,
};
use super::proto::activity_service_server::{ActivityService, ActivityServiceServer};
use super::proto::{self as pb};
use crate::application::entity_service::EntityService;
use crate::domain::activity::{Activity, ActivityPatch, NewActivity};
use crate::domain::errors::CrmError;

pub struct ActivityHandler {
    service: Arc<EntityService<Activity>>,
    shutdown: CancellationToken,
}

impl ActivityHandler {
    pub fn new(service: Arc<EntityService<Activity>>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    pub fn into_server(self) -> ActivityServiceServer<Self> {
        ActivityServiceServer::new(self)
    }
}

pub fn to_proto(activity: &Activity) -> pb::Activity {
    pb::Activity {
        id: wire_id(activity.id),
        title: activity.title.clone(),
        description: activity.description.clone().unwrap_or_default(),
        r#type: activity.activity_type.to_string(),
        status: activity.status.to_string(),
        due_date: format_optional_timestamp(activity.due_date),
        contact_id: wire_id(activity.contact_id),
        created_at: format_timestamp(activity.created_at),
        updated_at: format_timestamp(activity.updated_at),
    }
}

pub fn new_activity(message: pb::Activity) -> Result<NewActivity, CrmError> {
    Ok(NewActivity {
        title: message.title,
        description: optional_string(message.description),
        activity_type: message.r#type,
        status: message.status,
        due_date: parse_timestamp(&message.due_date),
        contact_id: entity_id("contact_id", message.contact_id)?,
    })
}

pub fn activity_patch(request: &pb::UpdateActivityRequest) -> Result<ActivityPatch, CrmError> {
    Ok(ActivityPatch {
        title: request.title.clone(),
        description: request.description.clone(),
        activity_type: request.r#type.clone(),
        status: request.status.clone(),
        due_date: request.due_date.as_deref().and_then(parse_timestamp),
        contact_id: match request.contact_id {
            Some(id) => optional_reference("contact_id", id)?,
            None => None,
        },
    })
}

#[tonic::async_trait]
impl ActivityService for ActivityHandler {
    async fn create_activity(
        &self,
        request: Request<pb::CreateActivityRequest>,
    ) -> Result<Response<pb::CreateActivityResponse>, Status> {
        let message = request
            .into_inner()
            .activity
            .ok_or_else(|| missing_body("activity"))?;
        let token = self.shutdown.child_token();

        let created = self.service.create(&token, new_activity(message)?).await?;
        Ok(Response::new(pb::CreateActivityResponse {
            activity: Some(to_proto(&created)),
        }))
    }

    async fn get_activity(
        &self,
        request: Request<pb::GetActivityRequest>,
    ) -> Result<Response<pb::GetActivityResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        let activity = self.service.get(&token, id).await?;
        Ok(Response::new(pb::GetActivityResponse {
            activity: Some(to_proto(&activity)),
        }))
    }

    async fn update_activity(
        &self,
        request: Request<pb::UpdateActivityRequest>,
    ) -> Result<Response<pb::UpdateActivityResponse>, Status> {
        let request = request.into_inner();
        let id = entity_id("id", request.id)?;
        let patch = activity_patch(&request)?;
        let token = self.shutdown.child_token();

        let updated = self.service.update(&token, id, patch).await?;
        Ok(Response::new(pb::UpdateActivityResponse {
            activity: Some(to_proto(&updated)),
        }))
    }

    async fn delete_activity(
        &self,
        request: Request<pb::DeleteActivityRequest>,
    ) -> Result<Response<pb::DeleteActivityResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        self.service.delete(&token, id).await?;
        Ok(Response::new(pb::DeleteActivityResponse { success: true }))
    }

    async fn list_activities(
        &self,
        request: Request<pb::ListActivitiesRequest>,
    ) -> Result<Response<pb::ListActivitiesResponse>, Status> {
        let request = request.into_inner();
        let params = list_params(
            request.page_number,
            request.page_size,
            request.sort_by,
            request.ascending,
            Some(("contact_id", request.contact_id)),
        )?;
        let token = self.shutdown.child_token();

        let activities = self.service.list(&token, params).await?;
        Ok(Response::new(pb::ListActivitiesResponse {
            activities: activities.iter().map(to_proto).collect(),
        }))
    }
}
