// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all collaborator adapters implement.

use async_trait::async_trait;

use crate::error::FramegenError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Framegen collaborator adapters.
///
/// Every adapter (queue store, entity store, backend, etc.) implements this
/// trait, which provides identity and a health check.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the role of this adapter in the pipeline.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, FramegenError> {
        Ok(HealthStatus::Healthy)
    }
}
