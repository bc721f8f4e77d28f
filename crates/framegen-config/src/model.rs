// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Framegen pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use framegen_core::QueueName;
use serde::{Deserialize, Serialize};

/// Top-level Framegen configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and defaults sensibly.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FramegenConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// SQLite database holding the queue and entity records.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Durable object storage for generated assets.
    #[serde(default)]
    pub objects: ObjectsConfig,

    /// Generative backend API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Image queue and model chain.
    #[serde(default)]
    pub image: ImageConfig,

    /// Video queue, model chain, and poller.
    #[serde(default)]
    pub video: VideoConfig,

    /// Worker scheduling and dead-letter policy.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Out-of-band dispatch trigger.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// HTTP gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Queue tuning resolved for one queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSettings {
    pub visibility_timeout: Duration,
    pub batch_size: usize,
    pub concurrency: usize,
}

impl FramegenConfig {
    /// Resolves the read/processing parameters for `queue`.
    pub fn queue_settings(&self, queue: QueueName) -> QueueSettings {
        match queue {
            QueueName::ImageGeneration => QueueSettings {
                visibility_timeout: Duration::from_secs(self.image.visibility_timeout_secs),
                batch_size: self.image.batch_size,
                concurrency: self.image.concurrency,
            },
            QueueName::VideoGeneration => QueueSettings {
                visibility_timeout: Duration::from_secs(self.video.visibility_timeout_secs),
                batch_size: self.video.batch_size,
                concurrency: self.video.concurrency,
            },
        }
    }
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in logs and the health endpoint.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "framegen".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "framegen.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Which object storage adapter to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectBackend {
    /// Files under `root_dir`, served from `public_base_url`.
    #[default]
    Local,
    /// HTTP PUT to `endpoint/bucket/path`.
    Http,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectsConfig {
    #[serde(default)]
    pub backend: ObjectBackend,

    /// Root directory for the local backend.
    #[serde(default = "default_objects_root")]
    pub root_dir: String,

    /// Base URL under which stored objects are publicly reachable.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Upload endpoint for the http backend.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bucket name for the http backend.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Bearer credential for the http backend.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self {
            backend: ObjectBackend::default(),
            root_dir: default_objects_root(),
            public_base_url: default_public_base_url(),
            endpoint: None,
            bucket: default_bucket(),
            api_key: None,
        }
    }
}

fn default_objects_root() -> String {
    "assets".to_string()
}

fn default_public_base_url() -> String {
    "http://127.0.0.1:8787/assets".to_string()
}

fn default_bucket() -> String {
    "generated-assets".to_string()
}

/// Generative backend API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` requires the `FRAMEGEN_GEMINI_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (overridable for testing and proxies).
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// One entry of a model fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelCandidate {
    /// Backend model identifier.
    pub id: String,

    /// Whether the model accepts a `resolution` parameter. When false the
    /// parameter is stripped before the request is sent.
    #[serde(default = "default_true")]
    pub supports_resolution: bool,
}

impl ModelCandidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supports_resolution: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Image queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// How long a read image job stays hidden from other workers.
    #[serde(default = "default_image_visibility_timeout")]
    pub visibility_timeout_secs: u64,

    /// Messages read per worker invocation.
    #[serde(default = "default_image_batch_size")]
    pub batch_size: usize,

    /// Messages processed in parallel within one batch.
    #[serde(default = "default_image_concurrency")]
    pub concurrency: usize,

    /// Ordered model fallback chain.
    #[serde(default = "default_image_models")]
    pub models: Vec<ModelCandidate>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_secs: default_image_visibility_timeout(),
            batch_size: default_image_batch_size(),
            concurrency: default_image_concurrency(),
            models: default_image_models(),
        }
    }
}

fn default_image_visibility_timeout() -> u64 {
    60
}

fn default_image_batch_size() -> usize {
    5
}

fn default_image_concurrency() -> usize {
    4
}

fn default_image_models() -> Vec<ModelCandidate> {
    vec![ModelCandidate::new("gemini-2.5-flash-image")]
}

/// Video queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VideoConfig {
    /// How long a read video job stays hidden. Must exceed the poll budget.
    #[serde(default = "default_video_visibility_timeout")]
    pub visibility_timeout_secs: u64,

    #[serde(default = "default_video_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_video_concurrency")]
    pub concurrency: usize,

    /// Fixed delay between operation status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Poll attempts before the job is reported as timed out.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Ordered model fallback chain.
    #[serde(default = "default_video_models")]
    pub models: Vec<ModelCandidate>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_secs: default_video_visibility_timeout(),
            batch_size: default_video_batch_size(),
            concurrency: default_video_concurrency(),
            poll_interval_secs: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            models: default_video_models(),
        }
    }
}

impl VideoConfig {
    /// Upper bound on the time the poller can spend on one operation.
    pub fn poll_budget(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs * u64::from(self.max_poll_attempts))
    }
}

fn default_video_visibility_timeout() -> u64 {
    600
}

fn default_video_batch_size() -> usize {
    1
}

fn default_video_concurrency() -> usize {
    1
}

fn default_poll_interval() -> u64 {
    10
}

fn default_max_poll_attempts() -> u32 {
    36
}

fn default_video_models() -> Vec<ModelCandidate> {
    vec![
        ModelCandidate::new("veo-3.0-generate-001"),
        ModelCandidate::new("veo-3.0-fast-generate-001"),
        ModelCandidate {
            id: "veo-2.0-generate-001".to_string(),
            supports_resolution: false,
        },
    ]
}

/// Worker scheduling and dead-letter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Archive messages delivered more than this many times. `None` retries forever.
    #[serde(default)]
    pub max_read_count: Option<i32>,

    /// Interval of the baseline pull schedule in `framegen serve`.
    #[serde(default = "default_schedule_interval")]
    pub schedule_interval_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_read_count: None,
            schedule_interval_secs: default_schedule_interval(),
        }
    }
}

fn default_schedule_interval() -> u64 {
    30
}

/// Dispatch trigger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Fire the trigger after every enqueue.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the worker invocation surface (the gateway).
    #[serde(default = "default_worker_url")]
    pub worker_url: String,

    /// Timeout for the trigger request. Kept short: the trigger is best-effort.
    #[serde(default = "default_dispatch_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            worker_url: default_worker_url(),
            timeout_ms: default_dispatch_timeout_ms(),
        }
    }
}

fn default_worker_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_dispatch_timeout_ms() -> u64 {
    2000
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on `/v1/*`. `None` disables auth.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8787
}
