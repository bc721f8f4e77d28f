// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generative backend traits (image and long-running video) and the
//! reference-asset fetcher.

use async_trait::async_trait;

use crate::error::FramegenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    GeneratedMedia, ImageRequest, InlineAsset, OperationHandle, OperationStatus, VideoRequest,
};

/// Synchronous image generation backend.
///
/// A quota or rate-limit response must surface as
/// [`FramegenError::RateLimited`] so the fallback chain can move on.
#[async_trait]
pub trait ImageBackend: PluginAdapter {
    /// Generates an image with `model`, blocking until the image or an error is ready.
    async fn generate(
        &self,
        model: &str,
        request: &ImageRequest,
    ) -> Result<GeneratedMedia, FramegenError>;
}

/// Long-running video generation backend.
#[async_trait]
pub trait VideoBackend: PluginAdapter {
    /// Submits a generation operation and returns its handle.
    async fn submit(
        &self,
        model: &str,
        request: &VideoRequest,
    ) -> Result<OperationHandle, FramegenError>;

    /// Fetches the current status of a submitted operation.
    async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, FramegenError>;

    /// Downloads a finished result. Implementations re-send their credential.
    async fn download(&self, uri: &str) -> Result<GeneratedMedia, FramegenError>;
}

/// Fetches reference assets so they can be embedded inline in requests.
#[async_trait]
pub trait AssetFetcher: PluginAdapter {
    async fn fetch(&self, url: &str) -> Result<InlineAsset, FramegenError>;
}
