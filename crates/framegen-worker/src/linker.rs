// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merges published asset references into owning entity records.

use std::sync::Arc;

use framegen_core::types::{AssetPatch, EntityKey};
use framegen_core::{EntityStore, FramegenError};
use tracing::{info, warn};

pub struct EntityLinker {
    store: Arc<dyn EntityStore>,
}

impl EntityLinker {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Merge-patches `patch` into the record at `key`.
    ///
    /// Returns `false` when the record does not exist; records are never created.
    pub async fn link(&self, key: &EntityKey, patch: &AssetPatch) -> Result<bool, FramegenError> {
        let linked = self
            .store
            .update(key, &patch.to_value())
            .await
            .map_err(|e| FramegenError::Link {
                key: key.to_string(),
                source: Box::new(e),
            })?;

        if linked {
            info!(%key, asset_url = %patch.asset_url, "entity linked");
        } else {
            warn!(%key, asset_url = %patch.asset_url, "entity record not found, asset left unlinked");
        }
        Ok(linked)
    }
}
