// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result extraction from completed long-running operations.
//!
//! Backend versions nest the video reference at different paths. Each known
//! shape is one extractor; they are tried in order and the first hit wins.

use serde_json::Value;

/// Pulls a video URI out of a completed operation body.
pub type Extractor = fn(&Value) -> Option<&str>;

fn generate_video_response(body: &Value) -> Option<&str> {
    body.pointer("/response/generateVideoResponse/generatedSamples/0/video/uri")?
        .as_str()
}

fn generated_videos(body: &Value) -> Option<&str> {
    body.pointer("/response/generatedVideos/0/video/uri")?.as_str()
}

fn generated_samples(body: &Value) -> Option<&str> {
    body.pointer("/response/generatedSamples/0/video/uri")?.as_str()
}

fn videos_uri(body: &Value) -> Option<&str> {
    body.pointer("/response/videos/0/uri")?.as_str()
}

fn videos_gcs_uri(body: &Value) -> Option<&str> {
    body.pointer("/response/videos/0/gcsUri")?.as_str()
}

/// Known response shapes, most recent API version first.
pub const VIDEO_URI_EXTRACTORS: &[Extractor] = &[
    generate_video_response,
    generated_videos,
    generated_samples,
    videos_uri,
    videos_gcs_uri,
];

/// Returns the first non-empty video URI any extractor finds.
pub fn extract_video_uri(body: &Value) -> Option<&str> {
    VIDEO_URI_EXTRACTORS
        .iter()
        .filter_map(|extract| extract(body))
        .find(|uri| !uri.is_empty())
}

/// Returns the error message of an operation that completed with an error.
pub fn operation_error(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    if error.is_null() {
        return None;
    }
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("operation failed without a message");
    Some(match error.get("code").and_then(Value::as_i64) {
        Some(code) => format!("{message} (code {code})"),
        None => message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_known_shape_is_recognized() {
        let shapes = [
            json!({"response": {"generateVideoResponse": {"generatedSamples": [{"video": {"uri": "u1"}}]}}}),
            json!({"response": {"generatedVideos": [{"video": {"uri": "u2"}}]}}),
            json!({"response": {"generatedSamples": [{"video": {"uri": "u3"}}]}}),
            json!({"response": {"videos": [{"uri": "u4"}]}}),
            json!({"response": {"videos": [{"gcsUri": "gs://b/u5.mp4"}]}}),
        ];
        let found: Vec<_> = shapes.iter().map(|s| extract_video_uri(s)).collect();
        assert_eq!(
            found,
            vec![Some("u1"), Some("u2"), Some("u3"), Some("u4"), Some("gs://b/u5.mp4")]
        );
    }

    #[test]
    fn earlier_extractor_wins() {
        let body = json!({"response": {
            "videos": [{"uri": "older"}],
            "generateVideoResponse": {"generatedSamples": [{"video": {"uri": "newest"}}]}
        }});
        assert_eq!(extract_video_uri(&body), Some("newest"));
    }

    #[test]
    fn empty_or_unknown_shapes_yield_none() {
        assert_eq!(extract_video_uri(&json!({"response": {}})), None);
        assert_eq!(
            extract_video_uri(&json!({"response": {"videos": [{"uri": ""}]}})),
            None
        );
        assert_eq!(extract_video_uri(&json!({"done": true})), None);
    }

    #[test]
    fn operation_error_formats_code() {
        let body = json!({"done": true, "error": {"code": 3, "message": "unsafe prompt"}});
        assert_eq!(operation_error(&body).as_deref(), Some("unsafe prompt (code 3)"));
        assert_eq!(operation_error(&json!({"done": true, "error": null})), None);
        assert_eq!(operation_error(&json!({"done": true})), None);
    }
}
