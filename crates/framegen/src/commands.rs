// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot operator commands: `work`, `enqueue`, `queue *`, `config check`.
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::time::Duration;

use framegen_config::FramegenConfig;
use framegen_core::types::{GenerationParams, JobPayload, MessageId, QueueName};
use framegen_core::FramegenError;
use serde_json::json;

use crate::pipeline::Stores;

/// Arguments of `framegen enqueue`.
#[derive(Debug, Clone)]
pub struct EnqueueArgs {
    pub queue: QueueName,
    pub prompt: String,
    pub owner: Option<String>,
    pub reference: Option<String>,
    pub edit: bool,
    pub params: Option<String>,
}

impl EnqueueArgs {
    /// Builds and validates the payload. The media kind follows the queue.
    pub fn into_payload(self) -> Result<JobPayload, FramegenError> {
        let mut payload = JobPayload::new(self.queue.media_kind(), self.prompt);
        payload.owner_entity_key = self.owner;
        payload.reference_asset_url = self.reference;
        payload.edit_mode = self.edit;
        if let Some(raw) = self.params {
            payload.generation_params = serde_json::from_str::<GenerationParams>(&raw)
                .map_err(|e| FramegenError::InvalidPayload(format!("--params: {e}")))?;
        }
        payload.validate()?;
        Ok(payload)
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), FramegenError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| FramegenError::Internal(format!("failed to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

pub async fn run_work(config: &FramegenConfig, queue: QueueName) -> Result<(), FramegenError> {
    let stores = Stores::open(config).await?;
    let summary = stores.processor(config)?.run(queue).await;
    stores.close().await?;
    print_json(&summary?)
}

pub async fn run_enqueue(config: &FramegenConfig, args: EnqueueArgs) -> Result<(), FramegenError> {
    let payload = args.into_payload()?;
    let stores = Stores::open(config).await?;
    let service = stores.enqueue_service(config)?;
    let submitted = service.submit(&payload).await;
    // The trigger runs in a spawned task; give it its own timeout to land.
    if submitted.is_ok() && config.dispatch.enabled {
        tokio::time::sleep(Duration::from_millis(config.dispatch.timeout_ms)).await;
    }
    stores.close().await?;
    let (message_id, queue) = submitted?;
    print_json(&json!({ "message_id": message_id, "queue": queue }))
}

pub async fn run_count(config: &FramegenConfig, queue: QueueName) -> Result<(), FramegenError> {
    let stores = Stores::open(config).await?;
    let count = stores.queue_client().count(queue).await;
    stores.close().await?;
    print_json(&json!({ "queue": queue, "count": count? }))
}

pub async fn run_peek(
    config: &FramegenConfig,
    queue: QueueName,
    qty: usize,
    vt: u64,
) -> Result<(), FramegenError> {
    let stores = Stores::open(config).await?;
    let envelopes = stores
        .queue_client()
        .peek(queue, Duration::from_secs(vt), qty)
        .await;
    stores.close().await?;
    print_json(&envelopes?)
}

pub async fn run_archive(
    config: &FramegenConfig,
    queue: QueueName,
    id: MessageId,
) -> Result<(), FramegenError> {
    let stores = Stores::open(config).await?;
    let archived = stores.queue_client().archive(queue, id).await;
    stores.close().await?;
    print_json(&json!({ "queue": queue, "message_id": id, "archived": archived? }))
}

/// Prints the effective configuration with secrets masked.
pub fn run_config_check(config: &FramegenConfig) -> Result<(), FramegenError> {
    let mut shown = config.clone();
    mask(&mut shown.gemini.api_key);
    mask(&mut shown.objects.api_key);
    mask(&mut shown.gateway.bearer_token);
    eprintln!("framegen: configuration is valid");
    print_json(&shown)
}

fn mask(secret: &mut Option<String>) {
    if secret.is_some() {
        *secret = Some("[redacted]".to_string());
    }
}
