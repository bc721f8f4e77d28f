// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-interval polling of long-running operations.

use std::time::Duration;

use framegen_core::types::{OperationHandle, OperationStatus};
use framegen_core::{FramegenError, VideoBackend};
use tracing::{debug, warn};

/// Polls an operation every `interval`, at most `max_attempts` times.
///
/// The wall time budget is `interval * max_attempts` and must stay below the
/// queue's visibility timeout.
#[derive(Debug, Clone, Copy)]
pub struct OperationPoller {
    interval: Duration,
    max_attempts: u32,
}

impl OperationPoller {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Waits for `handle` to finish.
    ///
    /// Sleeps before every poll. A failed poll consumes an attempt and the
    /// loop carries on. An exhausted budget is always
    /// [`FramegenError::PollTimeout`]; a trailing poll error is only logged.
    pub async fn wait(
        &self,
        backend: &dyn VideoBackend,
        model: &str,
        handle: &OperationHandle,
    ) -> Result<OperationStatus, FramegenError> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;

            match backend.poll(handle).await {
                Ok(status) if status.done => {
                    debug!(model, attempt, operation = %handle.0, "operation done");
                    return Ok(status);
                }
                Ok(_) => {
                    debug!(model, attempt, operation = %handle.0, "operation pending");
                    last_error = None;
                }
                Err(e) => {
                    warn!(model, attempt, operation = %handle.0, error = %e, "poll failed");
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            warn!(model, operation = %handle.0, error = %e, "poll budget exhausted after a failed poll");
        }
        Err(FramegenError::PollTimeout {
            model: model.to_string(),
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegen_test_utils::MockVideoBackend;
    use serde_json::json;

    fn pending() -> OperationStatus {
        OperationStatus {
            done: false,
            body: json!({"done": false}),
        }
    }

    fn done() -> OperationStatus {
        OperationStatus {
            done: true,
            body: json!({"done": true}),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_when_done() {
        let backend = MockVideoBackend::new();
        backend
            .push_polls(vec![Ok(pending()), Ok(pending()), Ok(pending()), Ok(done())])
            .await;

        let started = tokio::time::Instant::now();
        let poller = OperationPoller::new(Duration::from_secs(10), 36);
        let status = poller
            .wait(&backend, "veo", &OperationHandle("op".into()))
            .await
            .unwrap();

        assert!(status.done);
        assert_eq!(backend.poll_count().await, 4);
        assert_eq!(started.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_is_timeout() {
        let backend = MockVideoBackend::new();
        // An empty poll script reports pending forever.
        let poller = OperationPoller::new(Duration::from_secs(10), 36);
        let err = poller
            .wait(&backend, "veo", &OperationHandle("op".into()))
            .await
            .unwrap_err();

        assert!(err.is_timed_out(), "got: {err}");
        assert_eq!(backend.poll_count().await, 36);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_poll_errors_are_tolerated() {
        let backend = MockVideoBackend::new();
        backend
            .push_polls(vec![
                Err(FramegenError::backend("veo", "503")),
                Ok(done()),
            ])
            .await;

        let poller = OperationPoller::new(Duration::from_secs(1), 3);
        let status = poller
            .wait(&backend, "veo", &OperationHandle("op".into()))
            .await
            .unwrap();
        assert!(status.done);
    }

    #[tokio::test(start_paused = true)]
    async fn trailing_poll_error_still_times_out() {
        let backend = MockVideoBackend::new();
        backend
            .push_polls(vec![
                Ok(pending()),
                Err(FramegenError::backend("veo", "operation not found")),
            ])
            .await;

        let poller = OperationPoller::new(Duration::from_secs(1), 2);
        let err = poller
            .wait(&backend, "veo", &OperationHandle("op".into()))
            .await
            .unwrap_err();
        assert!(err.is_timed_out(), "got: {err}");
        assert_eq!(backend.poll_count().await, 2);
    }
}
