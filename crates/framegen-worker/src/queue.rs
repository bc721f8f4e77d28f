// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Producer/consumer wrapper over a [`QueueStore`].

use std::sync::Arc;
use std::time::Duration;

use framegen_core::types::{Envelope, JobPayload, MessageId, QueueName};
use framegen_core::{FramegenError, QueueStore};
use tracing::debug;

/// Thin, stateless client over the queue store.
///
/// Only structural shape is checked here. Semantic validation of payloads is
/// the job processor's concern.
#[derive(Clone)]
pub struct QueueClient {
    store: Arc<dyn QueueStore>,
}

impl QueueClient {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }

    /// Enqueues a typed payload on `queue`.
    pub async fn enqueue(
        &self,
        queue: QueueName,
        payload: &JobPayload,
    ) -> Result<MessageId, FramegenError> {
        let value = serde_json::to_value(payload).map_err(|e| FramegenError::Queue {
            message: format!("failed to encode payload: {e}"),
            source: Some(Box::new(e)),
        })?;
        self.enqueue_value(queue, &value).await
    }

    /// Enqueues a raw JSON payload. It must be a JSON object.
    pub async fn enqueue_value(
        &self,
        queue: QueueName,
        payload: &serde_json::Value,
    ) -> Result<MessageId, FramegenError> {
        if !payload.is_object() {
            return Err(FramegenError::InvalidPayload(
                "payload must be a JSON object".into(),
            ));
        }
        let id = self.store.send(queue, payload).await?;
        debug!(%queue, message_id = %id, "job enqueued");
        Ok(id)
    }

    /// Claims up to `max_count` messages, hiding them for `visibility_timeout`.
    ///
    /// Claimed messages resurface after the timeout unless acknowledged.
    pub async fn read_batch(
        &self,
        queue: QueueName,
        visibility_timeout: Duration,
        max_count: usize,
    ) -> Result<Vec<Envelope>, FramegenError> {
        if max_count == 0 {
            return Ok(Vec::new());
        }
        self.store.read(queue, visibility_timeout, max_count).await
    }

    /// Deletes a processed message.
    pub async fn acknowledge(&self, queue: QueueName, id: MessageId) -> Result<bool, FramegenError> {
        self.store.delete(queue, id).await
    }

    pub async fn archive(&self, queue: QueueName, id: MessageId) -> Result<bool, FramegenError> {
        self.store.archive(queue, id).await
    }

    pub async fn count(&self, queue: QueueName) -> Result<u64, FramegenError> {
        self.store.count(queue).await
    }

    /// Operator inspection. Same semantics as [`read_batch`](Self::read_batch):
    /// a zero timeout leaves the messages visible, but their read count still
    /// increments.
    pub async fn peek(
        &self,
        queue: QueueName,
        visibility_timeout: Duration,
        max_count: usize,
    ) -> Result<Vec<Envelope>, FramegenError> {
        self.read_batch(queue, visibility_timeout, max_count).await
    }
}
