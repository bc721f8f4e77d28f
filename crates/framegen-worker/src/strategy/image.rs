// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous image generation.

use std::sync::Arc;

use async_trait::async_trait;
use framegen_core::types::{AttemptStatus, ImageRequest, InlineAsset, JobPayload, MediaKind};
use framegen_core::{AssetFetcher, FramegenError, ImageBackend};
use tracing::debug;

use super::fallback::{params_for, FallbackChain};
use super::{GenerationOutput, GenerationStrategy};

/// One blocking backend call per candidate model; no polling.
pub struct ImageStrategy {
    backend: Arc<dyn ImageBackend>,
    fetcher: Arc<dyn AssetFetcher>,
    chain: FallbackChain,
}

impl ImageStrategy {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        fetcher: Arc<dyn AssetFetcher>,
        chain: FallbackChain,
    ) -> Self {
        Self {
            backend,
            fetcher,
            chain,
        }
    }

    /// The reference is only sent when editing an existing image.
    async fn reference(&self, job: &JobPayload) -> Result<Option<InlineAsset>, FramegenError> {
        match (&job.reference_asset_url, job.edit_mode) {
            (Some(url), true) => {
                debug!(url, "fetching edit reference");
                Ok(Some(self.fetcher.fetch(url).await?))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl GenerationStrategy for ImageStrategy {
    fn media_kind(&self) -> MediaKind {
        MediaKind::Image
    }

    async fn generate(&self, job: &JobPayload) -> Result<GenerationOutput, FramegenError> {
        let reference = self.reference(job).await?;
        let backend = &self.backend;

        let accepted = self
            .chain
            .submit(|candidate| {
                let request = ImageRequest {
                    prompt: job.prompt.clone(),
                    reference: reference.clone(),
                    params: params_for(candidate, &job.generation_params),
                };
                async move { backend.generate(&candidate.id, &request).await }
            })
            .await?;

        let mut attempts = accepted.attempts;
        if let Some(last) = attempts.last_mut() {
            last.status = AttemptStatus::Done;
        }
        Ok(GenerationOutput {
            media: accepted.value,
            model_used: accepted.candidate.id.clone(),
            attempts,
        })
    }
}
