// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asynchronous media generation pipeline.
//!
//! Producers enqueue [`JobPayload`](framegen_core::JobPayload)s through the
//! [`QueueClient`]; the [`JobProcessor`] drains one batch per invocation,
//! runs the matching [`GenerationStrategy`](strategy::GenerationStrategy),
//! publishes the bytes, links them to the owning entity and acknowledges.
//! Unacknowledged messages are redelivered by the queue store.

pub mod dispatch;
pub mod fetch;
pub mod linker;
pub mod notifier;
pub mod processor;
pub mod publisher;
pub mod queue;
pub mod scheduler;
pub mod strategy;

use std::sync::Arc;
use std::time::Duration;

use framegen_config::FramegenConfig;
use framegen_core::{
    AssetFetcher, AssetNotifier, EntityStore, FramegenError, ImageBackend, ObjectStore,
    QueueStore, VideoBackend,
};

pub use dispatch::{DispatchTrigger, EnqueueService};
pub use fetch::HttpAssetFetcher;
pub use linker::EntityLinker;
pub use notifier::LogNotifier;
pub use processor::{JobProcessor, ProcessorSettings};
pub use publisher::{AssetPublisher, PublishedAsset};
pub use queue::QueueClient;
pub use scheduler::spawn_schedule;
pub use strategy::{
    FallbackChain, GenerationOutput, GenerationStrategy, ImageStrategy, OperationPoller,
    VideoStrategy,
};

/// The collaborators a processor is wired to.
pub struct Adapters {
    pub queue: Arc<dyn QueueStore>,
    pub entities: Arc<dyn EntityStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub image: Arc<dyn ImageBackend>,
    pub video: Arc<dyn VideoBackend>,
    pub fetcher: Arc<dyn AssetFetcher>,
    pub notifier: Option<Arc<dyn AssetNotifier>>,
}

impl JobProcessor {
    /// Builds strategies, fallback chains and queue settings from configuration.
    pub fn from_config(config: &FramegenConfig, adapters: Adapters) -> Result<Self, FramegenError> {
        let image = ImageStrategy::new(
            adapters.image,
            adapters.fetcher.clone(),
            FallbackChain::new(config.image.models.clone())?,
        );
        let video = VideoStrategy::new(
            adapters.video,
            adapters.fetcher,
            FallbackChain::new(config.video.models.clone())?,
            OperationPoller::new(
                Duration::from_secs(config.video.poll_interval_secs),
                config.video.max_poll_attempts,
            ),
        );

        let processor = JobProcessor::new(
            QueueClient::new(adapters.queue),
            Arc::new(image),
            Arc::new(video),
            AssetPublisher::new(adapters.objects),
            EntityLinker::new(adapters.entities),
            ProcessorSettings::from_config(config),
        )?;
        Ok(match adapters.notifier {
            Some(notifier) => processor.with_notifier(notifier),
            None => processor,
        })
    }
}
