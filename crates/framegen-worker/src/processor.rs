// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The job processor: one batch per invocation.
//!
//! Every message is handled in isolation: read, decode, generate, publish,
//! link, acknowledge. A failure anywhere before publication leaves the message
//! unacknowledged so the queue redelivers it after the visibility timeout.
//! Linking is best-effort and never blocks acknowledgment.

use std::sync::Arc;

use chrono::Utc;
use framegen_config::{FramegenConfig, QueueSettings};
use framegen_core::types::{
    AssetPatch, AssetReady, BatchSummary, EntityKey, Envelope, GeneratedMedia, JobOutcome,
    JobPayload, JobResult, MediaKind, QueueName,
};
use framegen_core::{AssetNotifier, FramegenError};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::linker::EntityLinker;
use crate::notifier::LogNotifier;
use crate::publisher::AssetPublisher;
use crate::queue::QueueClient;
use crate::strategy::{GenerationOutput, GenerationStrategy};

/// Per-queue read parameters plus the optional dead-letter cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorSettings {
    pub image: QueueSettings,
    pub video: QueueSettings,
    /// Archive instead of processing once `read_count` exceeds this.
    pub max_read_count: Option<i32>,
}

impl ProcessorSettings {
    pub fn from_config(config: &FramegenConfig) -> Self {
        Self {
            image: config.queue_settings(QueueName::ImageGeneration),
            video: config.queue_settings(QueueName::VideoGeneration),
            max_read_count: config.worker.max_read_count,
        }
    }

    pub fn queue(&self, queue: QueueName) -> QueueSettings {
        match queue {
            QueueName::ImageGeneration => self.image,
            QueueName::VideoGeneration => self.video,
        }
    }
}

pub struct JobProcessor {
    queue: QueueClient,
    image: Arc<dyn GenerationStrategy>,
    video: Arc<dyn GenerationStrategy>,
    publisher: AssetPublisher,
    linker: EntityLinker,
    notifier: Arc<dyn AssetNotifier>,
    settings: ProcessorSettings,
    /// One batch at a time per queue, so overlapping triggers keep the concurrency cap.
    image_gate: Mutex<()>,
    video_gate: Mutex<()>,
}

impl JobProcessor {
    pub fn new(
        queue: QueueClient,
        image: Arc<dyn GenerationStrategy>,
        video: Arc<dyn GenerationStrategy>,
        publisher: AssetPublisher,
        linker: EntityLinker,
        settings: ProcessorSettings,
    ) -> Result<Self, FramegenError> {
        for (slot, strategy) in [(MediaKind::Image, &image), (MediaKind::Video, &video)] {
            if strategy.media_kind() != slot {
                return Err(FramegenError::Config(format!(
                    "{} strategy wired into the {slot} slot",
                    strategy.media_kind()
                )));
            }
        }
        Ok(Self {
            queue,
            image,
            video,
            publisher,
            linker,
            notifier: Arc::new(LogNotifier),
            settings,
            image_gate: Mutex::new(()),
            video_gate: Mutex::new(()),
        })
    }

    /// Replaces the default [`LogNotifier`].
    pub fn with_notifier(mut self, notifier: Arc<dyn AssetNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn queue_client(&self) -> &QueueClient {
        &self.queue
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    fn strategy(&self, kind: MediaKind) -> &dyn GenerationStrategy {
        match kind {
            MediaKind::Image => self.image.as_ref(),
            MediaKind::Video => self.video.as_ref(),
        }
    }

    /// Drains one batch from `queue` and reports what happened to each message.
    ///
    /// Only a failed read is an error; per-message failures are results.
    pub async fn run(&self, queue: QueueName) -> Result<BatchSummary, FramegenError> {
        let _running = match queue {
            QueueName::ImageGeneration => self.image_gate.lock().await,
            QueueName::VideoGeneration => self.video_gate.lock().await,
        };
        let settings = self.settings.queue(queue);
        let envelopes = self
            .queue
            .read_batch(queue, settings.visibility_timeout, settings.batch_size)
            .await?;

        if envelopes.is_empty() {
            debug!(%queue, "no visible messages");
            return Ok(BatchSummary::from_results(queue, Vec::new()));
        }
        info!(%queue, count = envelopes.len(), concurrency = settings.concurrency, "processing batch");

        let mut results: Vec<JobResult> = stream::iter(envelopes)
            .map(|envelope| self.process(queue, envelope))
            .buffer_unordered(settings.concurrency.max(1))
            .collect()
            .await;
        results.sort_by_key(|r| r.message_id);

        let summary = BatchSummary::from_results(queue, results);
        info!(
            %queue,
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            timed_out = summary.timed_out,
            "batch complete"
        );
        Ok(summary)
    }

    async fn process(&self, queue: QueueName, envelope: Envelope) -> JobResult {
        let id = envelope.message_id;
        let owner_hint = envelope
            .payload
            .get("owner_entity_key")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);

        if let Some(max) = self.settings.max_read_count
            && envelope.read_count > max
        {
            return self.dead_letter(queue, &envelope, owner_hint).await;
        }

        match self.execute(queue, &envelope).await {
            Ok(result) => result,
            Err(e) => {
                let outcome = if e.is_timed_out() {
                    JobOutcome::TimedOut
                } else {
                    JobOutcome::Failed
                };
                warn!(
                    %queue,
                    message_id = %id,
                    read_count = envelope.read_count,
                    %outcome,
                    error = %e,
                    "job failed, leaving for redelivery"
                );
                JobResult::failure(id, outcome, owner_hint, e.to_string())
            }
        }
    }

    async fn execute(&self, queue: QueueName, envelope: &Envelope) -> Result<JobResult, FramegenError> {
        let id = envelope.message_id;
        let job: JobPayload = serde_json::from_value(envelope.payload.clone())
            .map_err(|e| FramegenError::InvalidPayload(e.to_string()))?;
        job.validate()?;
        let owner = job.owner()?;

        if job.media_kind.queue() != queue {
            warn!(%queue, message_id = %id, media_kind = %job.media_kind, "job found on another kind's queue");
        }
        debug!(%queue, message_id = %id, read_count = envelope.read_count, "generating");

        let GenerationOutput {
            media: GeneratedMedia {
                bytes,
                content_type,
            },
            model_used,
            attempts,
        } = self.strategy(job.media_kind).generate(&job).await?;
        debug!(message_id = %id, model = %model_used, tried = attempts.len(), "generation done");

        let asset = self
            .publisher
            .publish(owner.as_ref(), id, job.media_kind, bytes, &content_type)
            .await?;

        let linked = match &owner {
            Some(key) => Some(self.link(key, &job, &asset.url, &model_used).await),
            None => None,
        };

        if linked != Some(false) {
            let event = AssetReady {
                owner_entity_key: job.owner_entity_key.clone(),
                asset_url: asset.url.clone(),
                media_kind: job.media_kind,
            };
            if let Err(e) = self.notifier.asset_ready(&event).await {
                warn!(message_id = %id, error = %e, "asset notification failed");
            }
        }

        let mut result = JobResult {
            message_id: id,
            success: true,
            outcome: JobOutcome::Succeeded,
            owner_entity_key: job.owner_entity_key.clone(),
            asset_url: Some(asset.url),
            model_used: Some(model_used),
            linked,
            error: None,
        };

        match self.queue.acknowledge(queue, id).await {
            Ok(true) => info!(%queue, message_id = %id, "job acknowledged"),
            Ok(false) => {
                warn!(%queue, message_id = %id, "message already gone at acknowledgment")
            }
            Err(e) => {
                // The asset exists but the message will be redelivered.
                error!(%queue, message_id = %id, error = %e, "acknowledge failed");
                result.success = false;
                result.outcome = JobOutcome::Failed;
                result.error = Some(format!("acknowledge failed: {e}"));
            }
        }
        Ok(result)
    }

    /// Best-effort link. Errors are a reconciliation gap, not a job failure.
    async fn link(&self, key: &EntityKey, job: &JobPayload, url: &str, model: &str) -> bool {
        let patch = AssetPatch {
            asset_url: url.to_string(),
            asset_kind: job.media_kind,
            generated_at: Utc::now(),
            model_used: model.to_string(),
        };
        match self.linker.link(key, &patch).await {
            Ok(linked) => linked,
            Err(e) => {
                error!(%key, asset_url = url, error = %e, "link failed, asset published but unlinked");
                false
            }
        }
    }

    async fn dead_letter(
        &self,
        queue: QueueName,
        envelope: &Envelope,
        owner_hint: Option<String>,
    ) -> JobResult {
        let id = envelope.message_id;
        let deliveries = envelope.read_count - 1;
        match self.queue.archive(queue, id).await {
            Ok(_) => {
                warn!(%queue, message_id = %id, deliveries, "message dead-lettered");
                JobResult::failure(
                    id,
                    JobOutcome::DeadLettered,
                    owner_hint,
                    format!("dead-lettered after {deliveries} deliveries"),
                )
            }
            Err(e) => {
                error!(%queue, message_id = %id, error = %e, "dead-letter archive failed");
                JobResult::failure(
                    id,
                    JobOutcome::Failed,
                    owner_hint,
                    format!("dead-letter archive failed: {e}"),
                )
            }
        }
    }
}
