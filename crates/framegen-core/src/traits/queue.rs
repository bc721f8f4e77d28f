// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue store trait: a durable, at-least-once, FIFO-per-queue message store.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FramegenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Envelope, MessageId, QueueName};

/// Adapter for the external queue store.
///
/// Implementations must guarantee that a message returned by [`read`](Self::read)
/// is hidden from every other reader until its visibility timeout expires.
/// The whole retry story of the pipeline rests on that guarantee.
#[async_trait]
pub trait QueueStore: PluginAdapter {
    /// Appends a payload to the queue and returns its message id.
    async fn send(
        &self,
        queue: QueueName,
        payload: &serde_json::Value,
    ) -> Result<MessageId, FramegenError>;

    /// Claims up to `max_count` visible messages, hiding them for
    /// `visibility_timeout` and incrementing their read count.
    async fn read(
        &self,
        queue: QueueName,
        visibility_timeout: Duration,
        max_count: usize,
    ) -> Result<Vec<Envelope>, FramegenError>;

    /// Permanently removes a message. Returns `false` if it did not exist.
    async fn delete(&self, queue: QueueName, id: MessageId) -> Result<bool, FramegenError>;

    /// Moves a message out of the live queue into the archive.
    /// Returns `false` if it did not exist.
    async fn archive(&self, queue: QueueName, id: MessageId) -> Result<bool, FramegenError>;

    /// Number of live (non-archived) messages, visible or not.
    async fn count(&self, queue: QueueName) -> Result<u64, FramegenError>;
}
