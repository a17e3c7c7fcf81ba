// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # gRPC Surface
//!
//! One handler per entity service in package `crm.v1`. Handlers decode wire
//! messages, call the matching [`EntityService`](crate::application::EntityService)
//! and map [`CrmError`](crate::domain::CrmError) onto `tonic::Status`.

pub mod convert;
pub mod server;

pub mod activity;
pub mod task;
pub mod contact;
pub mod company;
pub mod lead;
pub mod opportunity;

// Generated protobuf code
pub mod proto {
    tonic::include_proto!("crm.v1");
}

pub use server::{crm_router, start_grpc_server};
