// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express, most importantly that the
//! video visibility timeout outlasts the poller's whole attempt budget.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{FramegenConfig, ModelCandidate, ObjectBackend};

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &FramegenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    for (section, models) in [("image", &config.image.models), ("video", &config.video.models)] {
        check_models(section, models, &mut fail);
    }

    for (name, value) in [
        ("image.batch_size", config.image.batch_size),
        ("image.concurrency", config.image.concurrency),
        ("video.batch_size", config.video.batch_size),
        ("video.concurrency", config.video.concurrency),
    ] {
        if value < 1 {
            fail(format!("{name} must be at least 1, got {value}"));
        }
    }

    if config.image.visibility_timeout_secs == 0 {
        fail("image.visibility_timeout_secs must be greater than 0".to_string());
    }

    if config.video.max_poll_attempts == 0 {
        fail("video.max_poll_attempts must be at least 1".to_string());
    }

    // A visibility timeout shorter than the poll budget lets a second worker
    // claim a job that is still being polled.
    let budget = config.video.poll_budget().as_secs();
    if config.video.visibility_timeout_secs <= budget {
        fail(format!(
            "video.visibility_timeout_secs ({}) must exceed poll_interval_secs * max_poll_attempts ({budget})",
            config.video.visibility_timeout_secs
        ));
    }

    if let Some(max) = config.worker.max_read_count
        && max < 1
    {
        fail(format!("worker.max_read_count must be at least 1, got {max}"));
    }

    if config.worker.schedule_interval_secs == 0 {
        fail("worker.schedule_interval_secs must be greater than 0".to_string());
    }

    if config.objects.backend == ObjectBackend::Http && config.objects.endpoint.is_none() {
        fail("objects.endpoint is required when objects.backend = \"http\"".to_string());
    }

    if config.dispatch.enabled && config.dispatch.worker_url.trim().is_empty() {
        fail("dispatch.worker_url must not be empty when dispatch is enabled".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_models(section: &str, models: &[ModelCandidate], fail: &mut impl FnMut(String)) {
    if models.is_empty() {
        fail(format!("{section}.models must list at least one model"));
        return;
    }
    let mut seen = HashSet::new();
    for (i, model) in models.iter().enumerate() {
        if model.id.trim().is_empty() {
            fail(format!("{section}.models[{i}].id must not be empty"));
        } else if !seen.insert(model.id.as_str()) {
            fail(format!("duplicate model `{}` in {section}.models", model.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &FramegenConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&FramegenConfig::default()).is_ok());
    }

    #[test]
    fn visibility_timeout_must_exceed_poll_budget() {
        let mut config = FramegenConfig::default();
        config.video.visibility_timeout_secs = 300;
        let errors = messages(&config);
        assert!(errors.iter().any(|m| m.contains("video.visibility_timeout_secs")));
    }

    #[test]
    fn empty_and_duplicate_models_rejected() {
        let mut config = FramegenConfig::default();
        config.image.models.clear();
        config.video.models.push(config.video.models[0].clone());
        let errors = messages(&config);
        assert!(errors.iter().any(|m| m.contains("image.models")));
        assert!(errors.iter().any(|m| m.contains("duplicate model")));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = FramegenConfig::default();
        config.storage.database_path = " ".to_string();
        config.image.batch_size = 0;
        config.worker.max_read_count = Some(0);
        assert_eq!(messages(&config).len(), 3);
    }

    #[test]
    fn http_objects_require_endpoint() {
        let mut config = FramegenConfig::default();
        config.objects.backend = ObjectBackend::Http;
        assert!(messages(&config).iter().any(|m| m.contains("objects.endpoint")));
    }
}
