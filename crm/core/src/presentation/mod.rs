// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`crm-core`)
//!
//! Network surface that translates external requests into application
//! service calls. No business logic lives here.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | Liveness endpoint |
//! | [`grpc`] | gRPC (Tonic) | The six `crm.v1` entity services |

pub mod api;
pub mod grpc;
