// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completed-asset notification sink (the canvas renderer side).

use async_trait::async_trait;

use crate::error::FramegenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::AssetReady;

/// Receives a notification once an asset is durably stored.
#[async_trait]
pub trait AssetNotifier: PluginAdapter {
    async fn asset_ready(&self, event: &AssetReady) -> Result<(), FramegenError>;
}
