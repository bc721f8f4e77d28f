// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-running video generation through `predictLongRunning`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use framegen_core::types::{
    AdapterType, GeneratedMedia, GenerationParams, OperationHandle, OperationStatus, VideoRequest,
};
use framegen_core::{FramegenError, PluginAdapter, VideoBackend};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{Operation, PredictLongRunningRequest, VideoImage, VideoInstance};

/// Content type assumed when a download response does not declare one.
const DEFAULT_VIDEO_TYPE: &str = "video/mp4";

/// Video backend for Veo models.
#[derive(Debug, Clone)]
pub struct VeoVideoClient {
    client: GeminiClient,
}

impl VeoVideoClient {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    fn build_request(request: &VideoRequest) -> PredictLongRunningRequest {
        let image = request.reference.as_ref().map(|r| VideoImage {
            bytes_base64_encoded: STANDARD.encode(&r.bytes),
            mime_type: r.mime_type.clone(),
        });
        PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image,
            }],
            parameters: parameters(&request.params),
        }
    }
}

fn parameters(params: &GenerationParams) -> Map<String, Value> {
    let mut out = Map::new();
    if let Some(v) = &params.aspect_ratio {
        out.insert("aspectRatio".into(), Value::String(v.clone()));
    }
    if let Some(v) = &params.resolution {
        out.insert("resolution".into(), Value::String(v.clone()));
    }
    if let Some(v) = params.duration_seconds {
        out.insert("durationSeconds".into(), Value::from(v));
    }
    if let Some(v) = &params.negative_prompt {
        out.insert("negativePrompt".into(), Value::String(v.clone()));
    }
    if let Some(v) = params.sample_count {
        out.insert("sampleCount".into(), Value::from(v));
    }
    for (key, value) in &params.extra {
        out.insert(key.clone(), value.clone());
    }
    out
}

#[async_trait]
impl PluginAdapter for VeoVideoClient {
    fn name(&self) -> &str {
        "veo-video"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VideoBackend
    }
}

#[async_trait]
impl VideoBackend for VeoVideoClient {
    async fn submit(
        &self,
        model: &str,
        request: &VideoRequest,
    ) -> Result<OperationHandle, FramegenError> {
        let body = Self::build_request(request);
        let operation: Operation = self
            .client
            .post_model(model, "predictLongRunning", &body)
            .await?;
        info!(model, operation = %operation.name, "video operation submitted");
        Ok(OperationHandle(operation.name))
    }

    async fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, FramegenError> {
        let url = self.client.resolve(&handle.0);
        let body = self.client.get_json(&handle.0, &url).await?;
        let done = body.get("done").and_then(Value::as_bool).unwrap_or(false);
        debug!(operation = %handle.0, done, "operation polled");
        Ok(OperationStatus { done, body })
    }

    async fn download(&self, uri: &str) -> Result<GeneratedMedia, FramegenError> {
        // The default headers carry the API key, which file downloads require.
        let url = self.client.resolve(uri);
        let (bytes, content_type) = self.client.get_bytes("download", &url).await?;
        let content_type = match content_type {
            Some(ct) if ct.starts_with("video/") => ct,
            _ => DEFAULT_VIDEO_TYPE.to_string(),
        };
        debug!(size = bytes.len(), %content_type, "video downloaded");
        Ok(GeneratedMedia {
            bytes,
            content_type,
        })
    }
}
