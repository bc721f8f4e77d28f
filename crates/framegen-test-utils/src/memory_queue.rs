// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory queue store with visibility timeouts.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use framegen_core::types::{AdapterType, Envelope, MessageId, QueueName};
use framegen_core::{FramegenError, PluginAdapter, QueueStore};

#[derive(Debug, Clone)]
struct Stored {
    payload: serde_json::Value,
    read_count: i32,
    enqueued_at: DateTime<Utc>,
    visible_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    live: HashMap<QueueName, BTreeMap<MessageId, Stored>>,
    archived: HashMap<QueueName, Vec<MessageId>>,
}

/// A [`QueueStore`] kept in memory. Claims are serialized by one mutex, so
/// concurrent readers never receive the same un-expired message.
#[derive(Default)]
pub struct MemoryQueue {
    state: Mutex<State>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues any JSON value, bypassing client-side checks.
    pub async fn send_raw(&self, queue: QueueName, payload: serde_json::Value) -> MessageId {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = MessageId(state.next_id);
        let now = Utc::now();
        state.live.entry(queue).or_default().insert(
            id,
            Stored {
                payload,
                read_count: 0,
                enqueued_at: now,
                visible_at: now,
            },
        );
        id
    }

    /// Number of live messages on `queue`.
    pub async fn len(&self, queue: QueueName) -> usize {
        self.state
            .lock()
            .await
            .live
            .get(&queue)
            .map_or(0, BTreeMap::len)
    }

    /// Ids archived from `queue`, in archive order.
    pub async fn archived(&self, queue: QueueName) -> Vec<MessageId> {
        self.state
            .lock()
            .await
            .archived
            .get(&queue)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes every claimed message on `queue` visible again, as if its
    /// visibility timeout had elapsed.
    pub async fn expire_visibility(&self, queue: QueueName) {
        let now = Utc::now();
        if let Some(messages) = self.state.lock().await.live.get_mut(&queue) {
            for stored in messages.values_mut() {
                stored.visible_at = now;
            }
        }
    }

    /// Overrides the delivery count of a message.
    pub async fn set_read_count(&self, queue: QueueName, id: MessageId, read_count: i32) {
        if let Some(stored) = self
            .state
            .lock()
            .await
            .live
            .get_mut(&queue)
            .and_then(|m| m.get_mut(&id))
        {
            stored.read_count = read_count;
        }
    }
}

#[async_trait]
impl PluginAdapter for MemoryQueue {
    fn name(&self) -> &str {
        "memory-queue"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Queue
    }
}

#[async_trait]
impl QueueStore for MemoryQueue {
    async fn send(
        &self,
        queue: QueueName,
        payload: &serde_json::Value,
    ) -> Result<MessageId, FramegenError> {
        Ok(self.send_raw(queue, payload.clone()).await)
    }

    async fn read(
        &self,
        queue: QueueName,
        visibility_timeout: Duration,
        max_count: usize,
    ) -> Result<Vec<Envelope>, FramegenError> {
        let timeout = chrono::Duration::from_std(visibility_timeout)
            .map_err(|e| FramegenError::Internal(format!("visibility timeout out of range: {e}")))?;
        let now = Utc::now();

        let mut state = self.state.lock().await;
        let Some(messages) = state.live.get_mut(&queue) else {
            return Ok(Vec::new());
        };

        Ok(messages
            .iter_mut()
            .filter(|(_, stored)| stored.visible_at <= now)
            .take(max_count)
            .map(|(id, stored)| {
                stored.read_count += 1;
                stored.visible_at = now + timeout;
                Envelope {
                    message_id: *id,
                    read_count: stored.read_count,
                    enqueued_at: stored.enqueued_at,
                    visible_at: stored.visible_at,
                    payload: stored.payload.clone(),
                }
            })
            .collect())
    }

    async fn delete(&self, queue: QueueName, id: MessageId) -> Result<bool, FramegenError> {
        let mut state = self.state.lock().await;
        Ok(state
            .live
            .get_mut(&queue)
            .and_then(|m| m.remove(&id))
            .is_some())
    }

    async fn archive(&self, queue: QueueName, id: MessageId) -> Result<bool, FramegenError> {
        let mut state = self.state.lock().await;
        let removed = state
            .live
            .get_mut(&queue)
            .and_then(|m| m.remove(&id))
            .is_some();
        if removed {
            state.archived.entry(queue).or_default().push(id);
        }
        Ok(removed)
    }

    async fn count(&self, queue: QueueName) -> Result<u64, FramegenError> {
        Ok(self.len(queue).await as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn claimed_messages_are_hidden_until_expired() {
        let queue = MemoryQueue::new();
        queue.send_raw(QueueName::VideoGeneration, json!({"n": 1})).await;

        let first = queue
            .read(QueueName::VideoGeneration, Duration::from_secs(600), 1)
            .await
            .unwrap();
        let second = queue
            .read(QueueName::VideoGeneration, Duration::from_secs(600), 1)
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());

        queue.expire_visibility(QueueName::VideoGeneration).await;
        let third = queue
            .read(QueueName::VideoGeneration, Duration::from_secs(600), 1)
            .await
            .unwrap();
        assert_eq!(third[0].read_count, 2);
    }

    #[tokio::test]
    async fn queues_are_independent() {
        let queue = MemoryQueue::new();
        queue.send_raw(QueueName::ImageGeneration, json!({})).await;
        assert_eq!(queue.count(QueueName::VideoGeneration).await.unwrap(), 0);
        assert_eq!(queue.count(QueueName::ImageGeneration).await.unwrap(), 1);
    }
}
