// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-media-kind generation strategies.
//!
//! A strategy turns a validated [`JobPayload`] into raw media bytes and
//! reports which model produced them. Images are a single synchronous call per
//! candidate; videos submit a long-running operation and poll it.

pub mod extract;
pub mod fallback;
pub mod image;
pub mod poller;
pub mod video;

use async_trait::async_trait;
use framegen_core::types::{GeneratedMedia, GenerationAttempt, JobPayload, MediaKind};
use framegen_core::FramegenError;

pub use fallback::FallbackChain;
pub use image::ImageStrategy;
pub use poller::OperationPoller;
pub use video::VideoStrategy;

/// Media produced by a strategy, with the model that actually succeeded.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub media: GeneratedMedia,
    pub model_used: String,
    /// Every model tried for this job, in order.
    pub attempts: Vec<GenerationAttempt>,
}

#[async_trait]
pub trait GenerationStrategy: Send + Sync {
    /// The media kind this strategy produces.
    fn media_kind(&self) -> MediaKind;

    /// Runs the job to completion or failure.
    async fn generate(&self, job: &JobPayload) -> Result<GenerationOutput, FramegenError>;
}
