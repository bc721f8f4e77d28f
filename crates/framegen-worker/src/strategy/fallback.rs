// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered model fallback chain.

use std::future::Future;

use framegen_config::ModelCandidate;
use framegen_core::types::{AttemptStatus, GenerationAttempt, GenerationParams};
use framegen_core::FramegenError;
use tracing::{info, warn};

/// Candidate models tried in order until one accepts the request.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    candidates: Vec<ModelCandidate>,
}

/// The first candidate that accepted the request.
#[derive(Debug)]
pub struct Accepted<'a, T> {
    pub value: T,
    pub candidate: &'a ModelCandidate,
    pub attempts: Vec<GenerationAttempt>,
}

impl FallbackChain {
    pub fn new(candidates: Vec<ModelCandidate>) -> Result<Self, FramegenError> {
        if candidates.is_empty() {
            return Err(FramegenError::Config(
                "model fallback chain needs at least one candidate".into(),
            ));
        }
        Ok(Self { candidates })
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    /// Calls `submit` for each candidate in order and returns the first success.
    ///
    /// Any error, rate limit or otherwise, moves on to the next candidate.
    /// Candidates after the accepting one are never tried.
    pub async fn submit<'a, T, F, Fut>(&'a self, mut submit: F) -> Result<Accepted<'a, T>, FramegenError>
    where
        F: FnMut(&'a ModelCandidate) -> Fut,
        Fut: Future<Output = Result<T, FramegenError>>,
    {
        let mut attempts = Vec::with_capacity(self.candidates.len());
        let mut failures = Vec::new();

        for candidate in &self.candidates {
            let mut attempt = GenerationAttempt::submitted(&candidate.id);
            match submit(candidate).await {
                Ok(value) => {
                    info!(model = %candidate.id, tried = attempts.len() + 1, "candidate accepted request");
                    attempts.push(attempt);
                    return Ok(Accepted {
                        value,
                        candidate,
                        attempts,
                    });
                }
                Err(e) => {
                    if e.is_rate_limited() {
                        warn!(model = %candidate.id, error = %e, "candidate rate limited, trying next");
                    } else {
                        warn!(model = %candidate.id, error = %e, "candidate failed, trying next");
                    }
                    attempt.status = AttemptStatus::Failed;
                    attempts.push(attempt);
                    failures.push(format!("{}: {e}", candidate.id));
                }
            }
        }

        Err(FramegenError::Backend {
            model: self
                .candidates
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
                .join(","),
            message: format!(
                "all {} candidate models failed: {}",
                self.candidates.len(),
                failures.join("; ")
            ),
            source: None,
        })
    }
}

/// Applies per-model request quirks to the job's params.
pub fn params_for(candidate: &ModelCandidate, params: &GenerationParams) -> GenerationParams {
    let mut params = params.clone();
    if !candidate.supports_resolution {
        params.resolution = None;
        params.extra.remove("resolution");
    }
    params
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn chain(ids: &[&str]) -> FallbackChain {
        FallbackChain::new(ids.iter().map(|id| ModelCandidate::new(*id)).collect()).unwrap()
    }

    fn rate_limited(model: &str) -> FramegenError {
        FramegenError::RateLimited {
            model: model.into(),
            message: "quota".into(),
        }
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(FallbackChain::new(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn first_success_wins_and_later_candidates_are_skipped() {
        let chain = chain(&["a", "b", "c", "d"]);
        let tried = Mutex::new(Vec::new());

        let accepted = chain
            .submit(|candidate| {
                tried.lock().unwrap().push(candidate.id.clone());
                let id = candidate.id.clone();
                async move {
                    match id.as_str() {
                        "a" => Err(rate_limited("a")),
                        "b" => Err(FramegenError::backend("b", "500")),
                        other => Ok(other.to_string()),
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(accepted.value, "c");
        assert_eq!(accepted.candidate.id, "c");
        assert_eq!(*tried.lock().unwrap(), vec!["a", "b", "c"]);
        let statuses: Vec<_> = accepted.attempts.iter().map(|a| a.status).collect();
        assert_eq!(
            statuses,
            vec![
                AttemptStatus::Failed,
                AttemptStatus::Failed,
                AttemptStatus::Submitted
            ]
        );
    }

    #[tokio::test]
    async fn exhausted_chain_reports_every_failure() {
        let chain = chain(&["a", "b"]);
        let err = chain
            .submit(|c| {
                let id = c.id.clone();
                async move { Err::<(), _>(rate_limited(&id)) }
            })
            .await
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("all 2 candidate models failed"), "got: {text}");
        assert!(text.contains("a: rate limited") && text.contains("b: rate limited"));
        assert!(!err.is_timed_out());
    }

    #[test]
    fn resolution_is_stripped_for_models_without_support() {
        let params = GenerationParams {
            resolution: Some("1080p".into()),
            aspect_ratio: Some("16:9".into()),
            ..Default::default()
        };
        let legacy = ModelCandidate {
            id: "veo-2".into(),
            supports_resolution: false,
        };

        let stripped = params_for(&legacy, &params);
        assert_eq!(stripped.resolution, None);
        assert_eq!(stripped.aspect_ratio.as_deref(), Some("16:9"));

        let kept = params_for(&ModelCandidate::new("veo-3"), &params);
        assert_eq!(kept.resolution.as_deref(), Some("1080p"));
    }
}
