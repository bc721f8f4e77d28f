// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage and entity record store traits.

use async_trait::async_trait;

use crate::error::FramegenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::EntityKey;

/// Durable object storage for generated assets.
#[async_trait]
pub trait ObjectStore: PluginAdapter {
    /// Stores `bytes` at `path` and returns the public URL of the object.
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, FramegenError>;
}

/// Key-addressed store of externally owned entity records.
///
/// The pipeline never creates records; it only reads and merge-patches them.
#[async_trait]
pub trait EntityStore: PluginAdapter {
    /// Returns the current record, or `None` if it does not exist.
    async fn get(&self, key: &EntityKey) -> Result<Option<serde_json::Value>, FramegenError>;

    /// Merge-patches an existing record. Returns `false` if the record does not exist.
    async fn update(
        &self,
        key: &EntityKey,
        patch: &serde_json::Value,
    ) -> Result<bool, FramegenError>;
}
