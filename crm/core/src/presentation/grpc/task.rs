// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Task gRPC handler

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use super::convert::{
    entity_id, format_optional_timestamp, format_timestamp, list_params, missing_body,
    optional_reference, optional_string, parse_timestamp, wire_id,
};
use super::proto::task_service_server::{TaskService, TaskServiceServer};
use super::proto::{self as pb};
use crate::application::entity_service::EntityService;
use crate::domain::errors::CrmError;
use crate::domain::task::{NewTask, Task, TaskPatch};

pub struct TaskHandler {
    service: Arc<EntityService<Task>>,
    shutdown: CancellationToken,
}

impl TaskHandler {
    pub fn new(service: Arc<EntityService<Task>>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    pub fn into_server(self) -> TaskServiceServer<Self> {
        TaskServiceServer::new(self)
    }
}

pub fn to_proto(task: &Task) -> pb::Task {
    pb::Task {
        id: wire_id(task.id),
        title: task.title.clone(),
        description: task.description.clone().unwrap_or_default(),
        status: task.status.to_string(),
        priority: task.priority.to_string(),
        due_date: format_optional_timestamp(task.due_date),
        activity_id: wire_id(task.activity_id),
        created_at: format_timestamp(task.created_at),
        updated_at: format_timestamp(task.updated_at),
    }
}

pub fn new_task(message: pb::Task) -> Result<NewTask, CrmError> {
    Ok(NewTask {
        title: message.title,
        description: optional_string(message.description),
        status: message.status,
        priority: message.priority,
        due_date: parse_timestamp(&message.due_date),
        activity_id: entity_id("activity_id", message.activity_id)?,
    })
}

pub fn task_patch(request: &pb::UpdateTaskRequest) -> Result<TaskPatch, CrmError> {
    Ok(TaskPatch {
        title: request.title.clone(),
        description: request.description.clone(),
        status: request.status.clone(),
        priority: request.priority.clone(),
        due_date: request.due_date.as_deref().and_then(parse_timestamp),
        activity_id: match request.activity_id {
            Some(id) => optional_reference("activity_id", id)?,
            None => None,
        },
    })
}

#[tonic::async_trait]
impl TaskService for TaskHandler {
    async fn create_task(
        &self,
        request: Request<pb::CreateTaskRequest>,
    ) -> Result<Response<pb::CreateTaskResponse>, Status> {
        let message = request.into_inner().task.ok_or_else(|| missing_body("task"))?;
        let token = self.shutdown.child_token();

        let created = self.service.create(&token, new_task(message)?).await?;
        Ok(Response::new(pb::CreateTaskResponse {
            task: Some(to_proto(&created)),
        }))
    }

    async fn get_task(
        &self,
        request: Request<pb::GetTaskRequest>,
    ) -> Result<Response<pb::GetTaskResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        let task = self.service.get(&token, id).await?;
        Ok(Response::new(pb::GetTaskResponse {
            task: Some(to_proto(&task)),
        }))
    }

    async fn update_task(
        &self,
        request: Request<pb::UpdateTaskRequest>,
    ) -> Result<Response<pb::UpdateTaskResponse>, Status> {
        let request = request.into_inner();
        let id = entity_id("id", request.id)?;
        let patch = task_patch(&request)?;
        let token = self.shutdown.child_token();

        let updated = self.service.update(&token, id, patch).await?;
        Ok(Response::new(pb::UpdateTaskResponse {
            task: Some(to_proto(&updated)),
        }))
    }

    async fn delete_task(
        &self,
        request: Request<pb::DeleteTaskRequest>,
    ) -> Result<Response<pb::DeleteTaskResponse>, Status> {
        let id = entity_id("id", request.into_inner().id)?;
        let token = self.shutdown.child_token();

        self.service.delete(&token, id).await?;
        Ok(Response::new(pb::DeleteTaskResponse { success: true }))
    }

    async fn list_tasks(
        &self,
        request: Request<pb::ListTasksRequest>,
    ) -> Result<Response<pb::ListTasksResponse>, Status> {
        let request = request.into_inner();
        let params = list_params(
            request.page_number,
            request.page_size,
            request.sort_by,
            request.ascending,
            Some(("activity_id", request.activity_id)),
        )?;
        let token = self.shutdown.child_token();

        let tasks = self.service.list(&token, params).await?;
        Ok(Response::new(pb::ListTasksResponse {
            tasks: tasks.iter().map(to_proto).collect(),
        }))
    }
}
