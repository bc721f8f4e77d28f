// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Framegen pipeline.
//!
//! Exposes the enqueue surface, the stateless worker invocation surface used
//! by the dispatch trigger, and queue inspection, behind optional bearer auth.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{build_router, start_server, GatewayState, HealthState, ServerConfig};
