// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Framegen pipeline.

use thiserror::Error;

/// The primary error type used across all Framegen collaborator traits and
/// pipeline stages.
#[derive(Debug, Error)]
pub enum FramegenError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Queue store errors (send/read/delete/archive failed).
    #[error("queue error: {message}")]
    Queue {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The job payload is structurally valid JSON but semantically unusable.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A generation backend rejected or failed a request.
    #[error("backend error ({model}): {message}")]
    Backend {
        model: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A generation backend signalled quota exhaustion or rate limiting.
    #[error("rate limited ({model}): {message}")]
    RateLimited { model: String, message: String },

    /// A long-running operation did not report completion within the poll budget.
    #[error("operation for {model} not done after {attempts} poll attempts")]
    PollTimeout { model: String, attempts: u32 },

    /// A completed operation carried no recognizable result reference.
    #[error("no result reference found in {model} response")]
    ExtractionFailed { model: String },

    /// Uploading a generated asset to object storage failed.
    #[error("publish failed for {path}: {source}")]
    Publish {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Patching the owning entity record failed.
    #[error("link failed for {key}: {source}")]
    Link {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FramegenError {
    /// Returns true when the error is a quota / rate-limit signal from a backend.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FramegenError::RateLimited { .. })
    }

    /// Returns true when a long-running operation exhausted its poll budget.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, FramegenError::PollTimeout { .. })
    }

    /// Shorthand for a backend error without an underlying source.
    pub fn backend(model: impl Into<String>, message: impl Into<String>) -> Self {
        FramegenError::Backend {
            model: model.into(),
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifiers_match_only_their_variant() {
        let limited = FramegenError::RateLimited {
            model: "veo-3".into(),
            message: "quota".into(),
        };
        let timed_out = FramegenError::PollTimeout {
            model: "veo-3".into(),
            attempts: 36,
        };
        let backend = FramegenError::backend("veo-3", "bad request");

        assert!(limited.is_rate_limited());
        assert!(!limited.is_timed_out());
        assert!(timed_out.is_timed_out());
        assert!(!timed_out.is_rate_limited());
        assert!(!backend.is_rate_limited());
        assert!(!backend.is_timed_out());
    }

    #[test]
    fn display_includes_model_and_attempts() {
        let err = FramegenError::PollTimeout {
            model: "veo-2".into(),
            attempts: 36,
        };
        assert_eq!(
            err.to_string(),
            "operation for veo-2 not done after 36 poll attempts"
        );
    }
}
