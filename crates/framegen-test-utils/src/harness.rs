// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` wires a [`JobProcessor`] to in-memory collaborators and
//! scriptable backends, configured through the same [`FramegenConfig`] the
//! binary uses.

use std::sync::Arc;

use framegen_config::model::FramegenConfig;
use framegen_config::ModelCandidate;
use framegen_core::types::{BatchSummary, EntityKey, JobPayload, MessageId, QueueName};
use framegen_core::FramegenError;
use framegen_worker::{Adapters, JobProcessor};

use crate::memory_queue::MemoryQueue;
use crate::memory_stores::{MemoryEntityStore, MemoryObjectStore};
use crate::mock_backends::{MockFetcher, MockImageBackend, MockVideoBackend, RecordingNotifier};

/// Public base URL of the harness object store.
pub const HARNESS_CDN: &str = "https://cdn.test";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: FramegenConfig,
    video: Option<MockVideoBackend>,
    entities: Vec<(String, serde_json::Value)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: FramegenConfig::default(),
            video: None,
            entities: Vec::new(),
        }
    }

    /// Sets the image fallback chain.
    pub fn with_image_models(mut self, ids: &[&str]) -> Self {
        self.config.image.models = ids.iter().map(|id| ModelCandidate::new(*id)).collect();
        self
    }

    /// Sets the video fallback chain.
    pub fn with_video_models(mut self, models: Vec<ModelCandidate>) -> Self {
        self.config.video.models = models;
        self
    }

    /// Uses a pre-scripted video backend.
    pub fn with_video_backend(mut self, backend: MockVideoBackend) -> Self {
        self.video = Some(backend);
        self
    }

    pub fn with_poll(mut self, interval_secs: u64, max_attempts: u32) -> Self {
        self.config.video.poll_interval_secs = interval_secs;
        self.config.video.max_poll_attempts = max_attempts;
        self
    }

    pub fn with_max_read_count(mut self, max: i32) -> Self {
        self.config.worker.max_read_count = Some(max);
        self
    }

    pub fn with_image_batch(mut self, batch_size: usize, concurrency: usize) -> Self {
        self.config.image.batch_size = batch_size;
        self.config.image.concurrency = concurrency;
        self
    }

    /// Seeds an entity record under `key` (`kind:id`).
    pub fn with_entity(mut self, key: &str, record: serde_json::Value) -> Self {
        self.entities.push((key.to_string(), record));
        self
    }

    /// Applies an arbitrary config tweak.
    pub fn configure(mut self, f: impl FnOnce(&mut FramegenConfig)) -> Self {
        f(&mut self.config);
        self
    }

    pub async fn build(self) -> Result<TestHarness, FramegenError> {
        let queue = Arc::new(MemoryQueue::new());
        let entities = Arc::new(MemoryEntityStore::new());
        let objects = Arc::new(MemoryObjectStore::new(HARNESS_CDN));
        let image = Arc::new(MockImageBackend::new());
        let video = Arc::new(self.video.unwrap_or_default());
        let fetcher = Arc::new(MockFetcher::new());
        let notifier = Arc::new(RecordingNotifier::new());

        for (key, record) in self.entities {
            entities.insert(&EntityKey::parse(&key)?, record).await;
        }

        let processor = JobProcessor::from_config(
            &self.config,
            Adapters {
                queue: queue.clone(),
                entities: entities.clone(),
                objects: objects.clone(),
                image: image.clone(),
                video: video.clone(),
                fetcher: fetcher.clone(),
                notifier: Some(notifier.clone()),
            },
        )?;

        Ok(TestHarness {
            queue,
            entities,
            objects,
            image,
            video,
            fetcher,
            notifier,
            processor: Arc::new(processor),
            config: self.config,
        })
    }
}

/// A complete pipeline with in-memory collaborators.
pub struct TestHarness {
    pub queue: Arc<MemoryQueue>,
    pub entities: Arc<MemoryEntityStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub image: Arc<MockImageBackend>,
    pub video: Arc<MockVideoBackend>,
    pub fetcher: Arc<MockFetcher>,
    pub notifier: Arc<RecordingNotifier>,
    pub processor: Arc<JobProcessor>,
    pub config: FramegenConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Enqueues `payload` on the queue for its media kind.
    pub async fn enqueue(&self, payload: &JobPayload) -> Result<MessageId, FramegenError> {
        self.processor
            .queue_client()
            .enqueue(payload.media_kind.queue(), payload)
            .await
    }

    /// Runs one worker invocation on `queue`.
    pub async fn run(&self, queue: QueueName) -> Result<BatchSummary, FramegenError> {
        self.processor.run(queue).await
    }

    /// Simulates the visibility timeout elapsing for every claimed message.
    pub async fn expire_visibility(&self, queue: QueueName) {
        self.queue.expire_visibility(queue).await;
    }

    pub async fn entity(&self, key: &str) -> Option<serde_json::Value> {
        let key = EntityKey::parse(key).ok()?;
        self.entities.get_record(&key).await
    }
}
