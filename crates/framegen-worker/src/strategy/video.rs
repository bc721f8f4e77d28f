// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submit-and-poll video generation.
//!
//! Per job: `submitted -> polling -> {done | failed | timed_out}`. Only
//! submission failures fall through to the next candidate model. Once an
//! operation is accepted the job is bound to that model: the poll budget is
//! sized against the visibility timeout and cannot be spent twice.

use std::sync::Arc;

use async_trait::async_trait;
use framegen_core::types::{AttemptStatus, InlineAsset, JobPayload, MediaKind, VideoRequest};
use framegen_core::{AssetFetcher, FramegenError, VideoBackend};
use tracing::{info, warn};

use super::extract::{extract_video_uri, operation_error};
use super::fallback::{params_for, FallbackChain};
use super::poller::OperationPoller;
use super::{GenerationOutput, GenerationStrategy};

pub struct VideoStrategy {
    backend: Arc<dyn VideoBackend>,
    fetcher: Arc<dyn AssetFetcher>,
    chain: FallbackChain,
    poller: OperationPoller,
}

impl VideoStrategy {
    pub fn new(
        backend: Arc<dyn VideoBackend>,
        fetcher: Arc<dyn AssetFetcher>,
        chain: FallbackChain,
        poller: OperationPoller,
    ) -> Self {
        Self {
            backend,
            fetcher,
            chain,
            poller,
        }
    }

    /// A reference image, when given, is the starting frame.
    async fn reference(&self, job: &JobPayload) -> Result<Option<InlineAsset>, FramegenError> {
        match &job.reference_asset_url {
            Some(url) => Ok(Some(self.fetcher.fetch(url).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl GenerationStrategy for VideoStrategy {
    fn media_kind(&self) -> MediaKind {
        MediaKind::Video
    }

    async fn generate(&self, job: &JobPayload) -> Result<GenerationOutput, FramegenError> {
        let reference = self.reference(job).await?;
        let backend = &self.backend;

        let accepted = self
            .chain
            .submit(|candidate| {
                let request = VideoRequest {
                    prompt: job.prompt.clone(),
                    reference: reference.clone(),
                    params: params_for(candidate, &job.generation_params),
                };
                async move { backend.submit(&candidate.id, &request).await }
            })
            .await?;

        let model = accepted.candidate.id.clone();
        let handle = accepted.value;
        let mut attempts = accepted.attempts;
        let Some(attempt) = attempts.last_mut() else {
            return Err(FramegenError::Internal("accepted submission without attempt".into()));
        };
        attempt.operation_handle = Some(handle.0.clone());
        attempt.status = AttemptStatus::Polling;
        info!(%model, operation = %handle.0, "polling video operation");

        let status = match self.poller.wait(self.backend.as_ref(), &model, &handle).await {
            Ok(status) => status,
            Err(e) => {
                attempt.status = if e.is_timed_out() {
                    AttemptStatus::TimedOut
                } else {
                    AttemptStatus::Failed
                };
                warn!(%model, operation = %handle.0, status = %attempt.status, error = %e, "video operation did not complete");
                return Err(e);
            }
        };

        if let Some(message) = operation_error(&status.body) {
            attempt.status = AttemptStatus::Failed;
            return Err(FramegenError::backend(&model, message));
        }
        let uri = extract_video_uri(&status.body).ok_or_else(|| {
            FramegenError::ExtractionFailed {
                model: model.clone(),
            }
        })?;

        let media = self.backend.download(uri).await?;
        attempt.status = AttemptStatus::Done;
        info!(%model, size = media.bytes.len(), "video ready");

        Ok(GenerationOutput {
            media,
            model_used: model,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use framegen_config::ModelCandidate;
    use framegen_core::types::OperationStatus;
    use framegen_test_utils::{MockFetcher, MockVideoBackend};
    use serde_json::json;

    fn strategy(backend: Arc<MockVideoBackend>, models: Vec<ModelCandidate>) -> VideoStrategy {
        VideoStrategy::new(
            backend,
            Arc::new(MockFetcher::new()),
            FallbackChain::new(models).unwrap(),
            OperationPoller::new(Duration::from_secs(10), 36),
        )
    }

    fn candidates(ids: &[&str]) -> Vec<ModelCandidate> {
        ids.iter().map(|id| ModelCandidate::new(*id)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn third_candidate_succeeds_after_quota_errors() {
        let backend = Arc::new(MockVideoBackend::completing_after(3));
        backend.rate_limit("veo-3").await;
        backend.rate_limit("veo-3-fast").await;

        let output = strategy(backend.clone(), candidates(&["veo-3", "veo-3-fast", "veo-2", "veo-1"]))
            .generate(&JobPayload::new(MediaKind::Video, "waves"))
            .await
            .unwrap();

        assert_eq!(output.model_used, "veo-2");
        assert_eq!(output.media.content_type, "video/mp4");
        assert_eq!(backend.submitted_models().await, vec!["veo-3", "veo-3-fast", "veo-2"]);
        assert_eq!(backend.poll_count().await, 4);
        assert_eq!(output.attempts.len(), 3);
        assert_eq!(output.attempts[2].status, AttemptStatus::Done);
        assert!(output.attempts[2].operation_handle.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_poll_budget_is_timed_out() {
        let backend = Arc::new(MockVideoBackend::new());
        let err = strategy(backend.clone(), candidates(&["veo-3", "veo-2"]))
            .generate(&JobPayload::new(MediaKind::Video, "waves"))
            .await
            .unwrap_err();

        assert!(err.is_timed_out(), "got: {err}");
        assert_eq!(backend.poll_count().await, 36);
        // The second candidate is never submitted once an operation was accepted.
        assert_eq!(backend.submitted_models().await, vec!["veo-3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn resolution_stripped_for_legacy_model() {
        let backend = Arc::new(MockVideoBackend::completing_after(0));
        backend.rate_limit("veo-3").await;
        let mut job = JobPayload::new(MediaKind::Video, "waves");
        job.generation_params.resolution = Some("1080p".into());

        let models = vec![
            ModelCandidate::new("veo-3"),
            ModelCandidate {
                id: "veo-2".into(),
                supports_resolution: false,
            },
        ];
        strategy(backend.clone(), models).generate(&job).await.unwrap();

        let requests = backend.requests().await;
        assert_eq!(requests[0].1.params.resolution.as_deref(), Some("1080p"));
        assert_eq!(requests[1].1.params.resolution, None);
    }

    #[tokio::test(start_paused = true)]
    async fn operation_error_fails_without_download() {
        let backend = Arc::new(MockVideoBackend::new());
        backend
            .push_polls(vec![Ok(OperationStatus {
                done: true,
                body: json!({"done": true, "error": {"code": 3, "message": "blocked"}}),
            })])
            .await;

        let err = strategy(backend.clone(), candidates(&["veo-3"]))
            .generate(&JobPayload::new(MediaKind::Video, "waves"))
            .await
            .unwrap_err();
        assert!(!err.is_timed_out());
        assert!(err.to_string().contains("blocked"));
        assert!(backend.downloads().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unrecognized_result_shape_is_extraction_failure() {
        let backend = Arc::new(MockVideoBackend::new());
        backend
            .push_polls(vec![Ok(OperationStatus {
                done: true,
                body: json!({"done": true, "response": {"somethingNew": {}}}),
            })])
            .await;

        let err = strategy(backend, candidates(&["veo-3"]))
            .generate(&JobPayload::new(MediaKind::Video, "waves"))
            .await
            .unwrap_err();
        assert!(matches!(err, FramegenError::ExtractionFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn reference_is_sent_as_starting_frame() {
        let backend = Arc::new(MockVideoBackend::completing_after(0));
        let job = JobPayload::new(MediaKind::Video, "animate").with_reference("https://cdn/frame.png");

        strategy(backend.clone(), candidates(&["veo-3"]))
            .generate(&job)
            .await
            .unwrap();
        let requests = backend.requests().await;
        assert!(requests[0].1.reference.is_some());
    }
}
