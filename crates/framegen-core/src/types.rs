// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the queue, the generation strategies, and the
//! collaborator traits.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FramegenError;

/// Current version of the [`JobPayload`] shape.
pub const PAYLOAD_VERSION: u32 = 1;

/// Opaque handle assigned to a message by the queue store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Queue,
    EntityStore,
    ObjectStore,
    ImageBackend,
    VideoBackend,
    Fetcher,
    Notifier,
}

/// The kind of media a job produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// The queue that carries jobs of this kind.
    pub fn queue(self) -> QueueName {
        match self {
            MediaKind::Image => QueueName::ImageGeneration,
            MediaKind::Video => QueueName::VideoGeneration,
        }
    }

    /// File extension used when the backend content type is not recognized.
    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Image => "png",
            MediaKind::Video => "mp4",
        }
    }
}

/// The fixed set of queues this pipeline produces to and consumes from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueueName {
    ImageGeneration,
    VideoGeneration,
}

impl QueueName {
    /// All known queues, in a stable order.
    pub const ALL: [QueueName; 2] = [QueueName::ImageGeneration, QueueName::VideoGeneration];

    /// The media kind processed from this queue.
    pub fn media_kind(self) -> MediaKind {
        match self {
            QueueName::ImageGeneration => MediaKind::Image,
            QueueName::VideoGeneration => MediaKind::Video,
        }
    }
}

/// A queued unit of work plus the metadata the queue store assigned to it.
///
/// The payload stays as raw JSON here: the queue layer only checks structural
/// shape, semantic decoding happens in the job processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<P = serde_json::Value> {
    pub message_id: MessageId,
    /// Number of deliveries, including the current one.
    pub read_count: i32,
    pub enqueued_at: DateTime<Utc>,
    /// When the message becomes visible to other readers again.
    pub visible_at: DateTime<Utc>,
    pub payload: P,
}

/// Backend tuning knobs carried with a job. Unknown keys pass through in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The immutable job description a producer enqueues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    #[serde(default = "default_payload_version")]
    pub version: u32,
    /// `kind:id` of the record to patch. `None` produces a standalone asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_entity_key: Option<String>,
    pub media_kind: MediaKind,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_asset_url: Option<String>,
    #[serde(default)]
    pub edit_mode: bool,
    #[serde(default)]
    pub generation_params: GenerationParams,
}

fn default_payload_version() -> u32 {
    PAYLOAD_VERSION
}

impl JobPayload {
    /// Creates a version-1 payload with no owner, reference, or params.
    pub fn new(media_kind: MediaKind, prompt: impl Into<String>) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            owner_entity_key: None,
            media_kind,
            prompt: prompt.into(),
            reference_asset_url: None,
            edit_mode: false,
            generation_params: GenerationParams::default(),
        }
    }

    /// Sets the owning entity key.
    pub fn with_owner(mut self, key: impl Into<String>) -> Self {
        self.owner_entity_key = Some(key.into());
        self
    }

    /// Sets the reference asset URL.
    pub fn with_reference(mut self, url: impl Into<String>) -> Self {
        self.reference_asset_url = Some(url.into());
        self
    }

    /// Semantic validation applied by the job processor after decoding.
    pub fn validate(&self) -> Result<(), FramegenError> {
        if self.version != PAYLOAD_VERSION {
            return Err(FramegenError::InvalidPayload(format!(
                "unsupported payload version {}",
                self.version
            )));
        }
        if self.prompt.trim().is_empty() {
            return Err(FramegenError::InvalidPayload("prompt is empty".into()));
        }
        if self.edit_mode && self.reference_asset_url.is_none() {
            return Err(FramegenError::InvalidPayload(
                "edit_mode requires reference_asset_url".into(),
            ));
        }
        if let Some(key) = &self.owner_entity_key {
            EntityKey::parse(key)?;
        }
        Ok(())
    }

    /// Parsed owning entity key, if any.
    pub fn owner(&self) -> Result<Option<EntityKey>, FramegenError> {
        self.owner_entity_key
            .as_deref()
            .map(EntityKey::parse)
            .transpose()
    }
}

/// Composite key of an externally owned entity record, written `kind:id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: String,
    pub id: String,
}

impl EntityKey {
    /// Parses `kind:id`, splitting on the first `:`.
    pub fn parse(raw: &str) -> Result<Self, FramegenError> {
        match raw.split_once(':') {
            Some((kind, id)) if !kind.is_empty() && !id.is_empty() => Ok(Self {
                kind: kind.to_string(),
                id: id.to_string(),
            }),
            _ => Err(FramegenError::InvalidPayload(format!(
                "owner_entity_key `{raw}` is not of the form kind:id"
            ))),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Fields merged into an entity record after a successful publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPatch {
    pub asset_url: String,
    pub asset_kind: MediaKind,
    pub generated_at: DateTime<Utc>,
    pub model_used: String,
}

impl AssetPatch {
    /// Renders the patch as a JSON object for a merge-patch update.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "asset_url": self.asset_url,
            "asset_kind": self.asset_kind,
            "generated_at": self.generated_at.to_rfc3339(),
            "model_used": self.model_used,
        })
    }
}

// --- Backend request/response types ---

/// Asset bytes sent inline to a backend (reference images).
#[derive(Debug, Clone, PartialEq)]
pub struct InlineAsset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// A synchronous image generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub reference: Option<InlineAsset>,
    pub params: GenerationParams,
}

/// A long-running video generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRequest {
    pub prompt: String,
    pub reference: Option<InlineAsset>,
    pub params: GenerationParams,
}

/// Raw media produced by a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMedia {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Handle of a submitted long-running operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle(pub String);

/// Snapshot of a long-running operation's status.
///
/// `body` is the backend's raw response; its shape varies between backend
/// versions so result extraction is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationStatus {
    pub done: bool,
    pub body: serde_json::Value,
}

// --- Attempt and result types ---

/// Lifecycle state of one generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttemptStatus {
    Submitted,
    Polling,
    Done,
    Failed,
    TimedOut,
}

/// In-memory record of one model being tried for a job. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationAttempt {
    pub model_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_handle: Option<String>,
    pub status: AttemptStatus,
}

impl GenerationAttempt {
    pub fn submitted(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            started_at: Utc::now(),
            operation_handle: None,
            status: AttemptStatus::Submitted,
        }
    }
}

/// Terminal outcome of one message within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobOutcome {
    Succeeded,
    Failed,
    TimedOut,
    DeadLettered,
}

/// Per-message entry of a [`BatchSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub message_id: MessageId,
    pub success: bool,
    pub outcome: JobOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_entity_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Whether the entity record was patched. `None` when there was nothing to link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobResult {
    /// A failed result carrying only the error text.
    pub fn failure(
        message_id: MessageId,
        outcome: JobOutcome,
        owner_entity_key: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            success: false,
            outcome,
            owner_entity_key,
            asset_url: None,
            model_used: None,
            linked: None,
            error: Some(error.into()),
        }
    }
}

/// What one worker invocation did. The only synchronous feedback a caller gets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub queue: QueueName,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub results: Vec<JobResult>,
}

impl BatchSummary {
    /// Builds the summary counts from per-message results.
    pub fn from_results(queue: QueueName, results: Vec<JobResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        let timed_out = results
            .iter()
            .filter(|r| r.outcome == JobOutcome::TimedOut)
            .count();
        Self {
            queue,
            processed: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            timed_out,
            results,
        }
    }
}

/// Notification sent to the canvas renderer once an asset is durable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetReady {
    pub owner_entity_key: Option<String>,
    pub asset_url: String,
    pub media_kind: MediaKind,
}
