// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default completed-asset notifier.

use async_trait::async_trait;
use framegen_core::types::{AdapterType, AssetReady};
use framegen_core::{AssetNotifier, FramegenError, PluginAdapter};
use tracing::info;

/// Emits a structured log line per completed asset.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl PluginAdapter for LogNotifier {
    fn name(&self) -> &str {
        "log-notifier"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }
}

#[async_trait]
impl AssetNotifier for LogNotifier {
    async fn asset_ready(&self, event: &AssetReady) -> Result<(), FramegenError> {
        info!(
            owner = event.owner_entity_key.as_deref().unwrap_or("-"),
            asset_url = %event.asset_url,
            media_kind = %event.media_kind,
            "asset ready"
        );
        Ok(())
    }
}
