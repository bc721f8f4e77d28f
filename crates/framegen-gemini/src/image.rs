// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous image generation through `generateContent`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use framegen_core::types::{AdapterType, GeneratedMedia, GenerationParams, ImageRequest};
use framegen_core::{FramegenError, ImageBackend, PluginAdapter};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, Part};

/// Image backend calling `models/{model}:generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiImageClient {
    client: GeminiClient,
}

impl GeminiImageClient {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    fn build_request(request: &ImageRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::text(&request.prompt)];
        if let Some(reference) = &request.reference {
            parts.push(Part::inline(
                &reference.mime_type,
                STANDARD.encode(&reference.bytes),
            ));
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts,
            }],
            generation_config: Some(generation_config(&request.params)),
        }
    }
}

/// Maps job params onto `generationConfig`; unknown keys pass through untouched.
fn generation_config(params: &GenerationParams) -> Map<String, Value> {
    let mut config = Map::new();
    config.insert("responseModalities".into(), serde_json::json!(["IMAGE"]));

    let mut image_config = Map::new();
    if let Some(ratio) = &params.aspect_ratio {
        image_config.insert("aspectRatio".into(), Value::String(ratio.clone()));
    }
    if let Some(resolution) = &params.resolution {
        image_config.insert("imageSize".into(), Value::String(resolution.clone()));
    }
    if !image_config.is_empty() {
        config.insert("imageConfig".into(), Value::Object(image_config));
    }
    if let Some(count) = params.sample_count {
        config.insert("candidateCount".into(), Value::from(count));
    }
    for (key, value) in &params.extra {
        config.insert(key.clone(), value.clone());
    }
    config
}

#[async_trait]
impl PluginAdapter for GeminiImageClient {
    fn name(&self) -> &str {
        "gemini-image"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ImageBackend
    }
}

#[async_trait]
impl ImageBackend for GeminiImageClient {
    async fn generate(
        &self,
        model: &str,
        request: &ImageRequest,
    ) -> Result<GeneratedMedia, FramegenError> {
        let body = Self::build_request(request);
        let response: GenerateContentResponse = self
            .client
            .post_model(model, "generateContent", &body)
            .await?;

        let inline = response
            .first_inline_data()
            .ok_or_else(|| FramegenError::backend(model, response.empty_reason()))?;
        let bytes = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| FramegenError::Backend {
                model: model.to_string(),
                message: format!("invalid base64 image data: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(model, size = bytes.len(), mime = %inline.mime_type, "image generated");
        Ok(GeneratedMedia {
            bytes,
            content_type: inline.mime_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use framegen_core::types::InlineAsset;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn image_client(base_url: &str) -> GeminiImageClient {
        GeminiImageClient::new(
            GeminiClient::new("test-key", Duration::from_secs(5))
                .unwrap()
                .with_base_url(base_url),
        )
    }

    fn request(prompt: &str) -> ImageRequest {
        ImageRequest {
            prompt: prompt.into(),
            reference: None,
            params: GenerationParams::default(),
        }
    }

    #[tokio::test]
    async fn generate_decodes_first_inline_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-image:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "red fox in snow"}]}],
                "generationConfig": {"responseModalities": ["IMAGE"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [
                    {"text": "here"},
                    {"inlineData": {"mimeType": "image/png", "data": STANDARD.encode(b"png-bytes")}}
                ]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let media = image_client(&server.uri())
            .generate("gemini-image", &request("red fox in snow"))
            .await
            .unwrap();
        assert_eq!(media.bytes, b"png-bytes");
        assert_eq!(media.content_type, "image/png");
    }

    #[tokio::test]
    async fn reference_is_sent_inline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [
                    {"text": "make it blue"},
                    {"inlineData": {"mimeType": "image/jpeg", "data": STANDARD.encode(b"ref")}}
                ]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": STANDARD.encode(b"out")}}
                ]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request("make it blue");
        req.reference = Some(InlineAsset {
            bytes: b"ref".to_vec(),
            mime_type: "image/jpeg".into(),
        });
        let media = image_client(&server.uri())
            .generate("m", &req)
            .await
            .unwrap();
        assert_eq!(media.bytes, b"out");
    }

    #[tokio::test]
    async fn quota_error_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let err = image_client(&server.uri())
            .generate("m", &request("x"))
            .await
            .unwrap_err();
        assert!(err.is_rate_limited(), "got: {err}");
    }

    #[tokio::test]
    async fn response_without_image_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "I can't draw that"}]}, "finishReason": "STOP"}]
            })))
            .mount(&server)
            .await;

        let err = image_client(&server.uri())
            .generate("m", &request("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, FramegenError::Backend { .. }));
        assert!(err.to_string().contains("I can't draw that"), "got: {err}");
    }

    #[test]
    fn params_map_to_generation_config() {
        let mut params = GenerationParams {
            aspect_ratio: Some("16:9".into()),
            ..Default::default()
        };
        params.extra.insert("temperature".into(), json!(0.4));
        let config = generation_config(&params);
        assert_eq!(config["imageConfig"]["aspectRatio"], "16:9");
        assert_eq!(config["temperature"], 0.4);
        assert!(config.get("candidateCount").is_none());
    }
}
