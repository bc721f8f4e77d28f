// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enqueue followed by an optional push-style worker nudge.
//!
//! The trigger is a latency optimization only. The baseline schedule drains
//! the queues whether or not a trigger ever lands, so trigger failures are
//! logged and swallowed.

use std::time::Duration;

use framegen_config::model::{DispatchConfig, GatewayConfig};
use framegen_core::types::{JobPayload, MessageId, QueueName};
use framegen_core::FramegenError;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};

use crate::queue::QueueClient;

/// Fire-and-forget call to `POST {worker_url}/v1/worker/{queue}`.
#[derive(Debug, Clone)]
pub struct DispatchTrigger {
    client: reqwest::Client,
    worker_url: String,
    bearer_token: Option<String>,
}

impl DispatchTrigger {
    pub fn new(
        worker_url: impl Into<String>,
        timeout: Duration,
        bearer_token: Option<String>,
    ) -> Result<Self, FramegenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FramegenError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            worker_url: worker_url.into().trim_end_matches('/').to_string(),
            bearer_token,
        })
    }

    /// Builds the trigger from config, or `None` when dispatch is disabled.
    pub fn from_config(
        dispatch: &DispatchConfig,
        gateway: &GatewayConfig,
    ) -> Result<Option<Self>, FramegenError> {
        if !dispatch.enabled {
            return Ok(None);
        }
        Self::new(
            &dispatch.worker_url,
            Duration::from_millis(dispatch.timeout_ms),
            gateway.bearer_token.clone(),
        )
        .map(Some)
    }

    /// Invokes the worker for `queue` and waits for the response or the timeout.
    ///
    /// Returns whether the worker accepted the call. Never errors.
    pub async fn trigger(&self, queue: QueueName) -> bool {
        let url = format!("{}/v1/worker/{queue}", self.worker_url);
        let mut request = self.client.post(&url);
        if let Some(token) = &self.bearer_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(%queue, "worker triggered");
                true
            }
            Ok(response) => {
                warn!(%queue, status = %response.status(), "worker trigger rejected");
                false
            }
            Err(e) => {
                warn!(%queue, error = %e, "worker trigger failed");
                false
            }
        }
    }

    /// Spawns [`trigger`](Self::trigger) in the background.
    pub fn fire(&self, queue: QueueName) {
        let trigger = self.clone();
        tokio::spawn(async move {
            trigger.trigger(queue).await;
        });
    }
}

/// Producer-side entry point: enqueue on the job's queue, then nudge the worker.
#[derive(Clone)]
pub struct EnqueueService {
    queue: QueueClient,
    trigger: Option<DispatchTrigger>,
}

impl EnqueueService {
    pub fn new(queue: QueueClient, trigger: Option<DispatchTrigger>) -> Self {
        Self { queue, trigger }
    }

    /// Enqueues `payload` on the queue for its media kind.
    ///
    /// The result reflects the enqueue alone; the trigger cannot change it.
    pub async fn submit(&self, payload: &JobPayload) -> Result<(MessageId, QueueName), FramegenError> {
        let queue = payload.media_kind.queue();
        let id = self.queue.enqueue(queue, payload).await?;
        if let Some(trigger) = &self.trigger {
            trigger.fire(queue);
        }
        Ok((id, queue))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use framegen_core::types::MediaKind;
    use framegen_test_utils::MemoryQueue;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn trigger_posts_to_worker_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/worker/video_generation"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let trigger =
            DispatchTrigger::new(server.uri(), Duration::from_secs(1), Some("t".into())).unwrap();
        assert!(trigger.trigger(QueueName::VideoGeneration).await);
    }

    #[tokio::test]
    async fn slow_worker_times_out_quietly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let trigger = DispatchTrigger::new(server.uri(), Duration::from_millis(50), None).unwrap();
        assert!(!trigger.trigger(QueueName::ImageGeneration).await);
    }

    #[tokio::test]
    async fn unreachable_worker_does_not_fail_enqueue() {
        // Nothing listens on port 9; the trigger fails, the enqueue does not.
        let trigger =
            DispatchTrigger::new("http://127.0.0.1:9", Duration::from_millis(100), None).unwrap();
        let queue = Arc::new(MemoryQueue::new());
        let service = EnqueueService::new(QueueClient::new(queue.clone()), Some(trigger));

        let (id, name) = service
            .submit(&JobPayload::new(MediaKind::Video, "waves"))
            .await
            .unwrap();
        assert_eq!(name, QueueName::VideoGeneration);
        assert_eq!(queue.len(QueueName::VideoGeneration).await, 1);
        assert!(id.0 > 0);
    }

    #[test]
    fn disabled_dispatch_builds_no_trigger() {
        let dispatch = DispatchConfig {
            enabled: false,
            ..DispatchConfig::default()
        };
        let trigger = DispatchTrigger::from_config(&dispatch, &GatewayConfig::default()).unwrap();
        assert!(trigger.is_none());
    }
}
