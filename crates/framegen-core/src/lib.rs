// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Framegen media generation pipeline.
//!
//! This crate provides the job envelope and payload types, the error type, and
//! the collaborator traits (queue store, generative backends, object storage,
//! entity records) that the worker is written against. Concrete adapters live
//! in their own crates and implement the traits defined here.

pub mod error;
pub mod patch;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FramegenError;
pub use patch::merge_patch;
pub use types::{
    AdapterType, AssetPatch, BatchSummary, EntityKey, Envelope, HealthStatus, JobOutcome,
    JobPayload, JobResult, MediaKind, MessageId, QueueName,
};

pub use traits::{
    AssetFetcher, AssetNotifier, EntityStore, ImageBackend, ObjectStore, PluginAdapter,
    QueueStore, VideoBackend,
};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use serde_json::json;

    #[test]
    fn queue_names_round_trip_through_strings() {
        for queue in QueueName::ALL {
            let s = queue.to_string();
            assert_eq!(QueueName::from_str(&s).unwrap(), queue);
        }
        assert_eq!(QueueName::ImageGeneration.to_string(), "image_generation");
        assert_eq!(QueueName::VideoGeneration.to_string(), "video_generation");
        assert!(QueueName::from_str("audio_generation").is_err());
    }

    #[test]
    fn media_kind_maps_to_queue() {
        assert_eq!(MediaKind::Image.queue(), QueueName::ImageGeneration);
        assert_eq!(MediaKind::Video.queue(), QueueName::VideoGeneration);
        assert_eq!(QueueName::VideoGeneration.media_kind(), MediaKind::Video);
    }

    #[test]
    fn minimal_payload_decodes_with_defaults() {
        let payload: JobPayload = serde_json::from_value(json!({
            "media_kind": "image",
            "prompt": "red fox in snow",
            "owner_entity_key": "scene:1"
        }))
        .unwrap();

        assert_eq!(payload.version, 1);
        assert!(!payload.edit_mode);
        assert!(payload.reference_asset_url.is_none());
        assert_eq!(payload.generation_params, types::GenerationParams::default());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn generation_params_keep_unknown_keys() {
        let payload: JobPayload = serde_json::from_value(json!({
            "media_kind": "video",
            "prompt": "waves",
            "generation_params": {"resolution": "1080p", "seed": 7}
        }))
        .unwrap();

        assert_eq!(
            payload.generation_params.resolution.as_deref(),
            Some("1080p")
        );
        assert_eq!(payload.generation_params.extra["seed"], json!(7));
    }

    #[test]
    fn validate_rejects_semantic_problems() {
        let empty = JobPayload::new(MediaKind::Image, "   ");
        assert!(matches!(
            empty.validate(),
            Err(FramegenError::InvalidPayload(_))
        ));

        let mut edit = JobPayload::new(MediaKind::Image, "make it blue");
        edit.edit_mode = true;
        assert!(edit.validate().is_err());

        let bad_owner = JobPayload::new(MediaKind::Image, "x").with_owner("scene");
        assert!(bad_owner.validate().is_err());

        let mut future = JobPayload::new(MediaKind::Image, "x");
        future.version = 2;
        assert!(future.validate().is_err());
    }

    #[test]
    fn entity_key_splits_on_first_colon() {
        let key = EntityKey::parse("character:abc:v2").unwrap();
        assert_eq!(key.kind, "character");
        assert_eq!(key.id, "abc:v2");
        assert_eq!(key.to_string(), "character:abc:v2");

        assert!(EntityKey::parse(":1").is_err());
        assert!(EntityKey::parse("scene:").is_err());
        assert!(EntityKey::parse("scene").is_err());
    }

    #[test]
    fn batch_summary_counts_outcomes() {
        let ok = JobResult {
            message_id: MessageId(1),
            success: true,
            outcome: JobOutcome::Succeeded,
            owner_entity_key: None,
            asset_url: Some("u".into()),
            model_used: Some("m".into()),
            linked: None,
            error: None,
        };
        let timed_out = JobResult::failure(MessageId(2), JobOutcome::TimedOut, None, "slow");
        let failed = JobResult::failure(MessageId(3), JobOutcome::Failed, None, "bad");

        let summary =
            BatchSummary::from_results(QueueName::VideoGeneration, vec![ok, timed_out, failed]);
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.timed_out, 1);
    }

    #[test]
    fn asset_patch_serializes_expected_fields() {
        let patch = AssetPatch {
            asset_url: "https://cdn/x.png".into(),
            asset_kind: MediaKind::Image,
            generated_at: chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
            model_used: "imagen".into(),
        };
        let value = patch.to_value();
        assert_eq!(value["asset_url"], "https://cdn/x.png");
        assert_eq!(value["asset_kind"], "image");
        assert_eq!(value["model_used"], "imagen");
        assert_eq!(value["generated_at"], "2026-01-01T00:00:00+00:00");
    }
}
