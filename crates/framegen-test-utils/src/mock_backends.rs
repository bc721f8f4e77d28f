// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scriptable generation backends, fetcher and notifier.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use framegen_core::types::{
    AdapterType, AssetReady, GeneratedMedia, ImageRequest, InlineAsset, OperationHandle,
    OperationStatus, VideoRequest,
};
use framegen_core::{
    AssetFetcher, AssetNotifier, FramegenError, ImageBackend, PluginAdapter, VideoBackend,
};

/// URI the default completed operation points at.
pub const MOCK_VIDEO_URI: &str = "https://files.mock/video.mp4";

fn rate_limited(model: &str) -> FramegenError {
    FramegenError::RateLimited {
        model: model.to_string(),
        message: "RESOURCE_EXHAUSTED: quota exceeded".into(),
    }
}

/// Image backend returning a fixed PNG unless a model is marked as failing.
#[derive(Default)]
pub struct MockImageBackend {
    rate_limited: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<(String, ImageRequest)>>,
}

impl MockImageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call to `model` returns a quota error.
    pub async fn rate_limit(&self, model: &str) {
        self.rate_limited.lock().await.insert(model.to_string());
    }

    /// Every call to `model` returns a plain backend error.
    pub async fn fail(&self, model: &str) {
        self.failing.lock().await.insert(model.to_string());
    }

    /// `(model, request)` for every call, in order.
    pub async fn requests(&self) -> Vec<(String, ImageRequest)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockImageBackend {
    fn name(&self) -> &str {
        "mock-image"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ImageBackend
    }
}

#[async_trait]
impl ImageBackend for MockImageBackend {
    async fn generate(
        &self,
        model: &str,
        request: &ImageRequest,
    ) -> Result<GeneratedMedia, FramegenError> {
        self.requests
            .lock()
            .await
            .push((model.to_string(), request.clone()));
        if self.rate_limited.lock().await.contains(model) {
            return Err(rate_limited(model));
        }
        if self.failing.lock().await.contains(model) {
            return Err(FramegenError::backend(model, "mock failure"));
        }
        Ok(GeneratedMedia {
            bytes: format!("png:{}", request.prompt).into_bytes(),
            content_type: "image/png".into(),
        })
    }
}

/// Video backend with a scripted poll sequence.
///
/// Polls pop from the script; an empty script reports "pending" forever.
#[derive(Default)]
pub struct MockVideoBackend {
    rate_limited: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<(String, VideoRequest)>>,
    polls: Mutex<VecDeque<Result<OperationStatus, FramegenError>>>,
    poll_count: Mutex<u32>,
    downloads: Mutex<Vec<String>>,
}

impl MockVideoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports pending `pending` times, then done with [`MOCK_VIDEO_URI`].
    pub fn completing_after(pending: usize) -> Self {
        let mut script: VecDeque<_> = (0..pending).map(|_| Ok(Self::pending())).collect();
        script.push_back(Ok(Self::done(MOCK_VIDEO_URI)));
        Self {
            polls: Mutex::new(script),
            ..Self::default()
        }
    }

    pub fn pending() -> OperationStatus {
        OperationStatus {
            done: false,
            body: serde_json::json!({"done": false}),
        }
    }

    /// A finished operation in the current response shape.
    pub fn done(uri: &str) -> OperationStatus {
        OperationStatus {
            done: true,
            body: serde_json::json!({
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [{"video": {"uri": uri}}]}}
            }),
        }
    }

    pub async fn rate_limit(&self, model: &str) {
        self.rate_limited.lock().await.insert(model.to_string());
    }

    pub async fn fail(&self, model: &str) {
        self.failing.lock().await.insert(model.to_string());
    }

    pub async fn push_polls(&self, polls: Vec<Result<OperationStatus, FramegenError>>) {
        self.polls.lock().await.extend(polls);
    }

    pub async fn requests(&self) -> Vec<(String, VideoRequest)> {
        self.requests.lock().await.clone()
    }

    /// Models submitted to, in order, including rejected submissions.
    pub async fn submitted_models(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub async fn poll_count(&self) -> u32 {
        *self.poll_count.lock().await
    }

    pub async fn downloads(&self) -> Vec<String> {
        self.downloads.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockVideoBackend {
    fn name(&self) -> &str {
        "mock-video"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VideoBackend
    }
}

#[async_trait]
impl VideoBackend for MockVideoBackend {
    async fn submit(
        &self,
        model: &str,
        request: &VideoRequest,
    ) -> Result<OperationHandle, FramegenError> {
        let mut requests = self.requests.lock().await;
        requests.push((model.to_string(), request.clone()));
        if self.rate_limited.lock().await.contains(model) {
            return Err(rate_limited(model));
        }
        if self.failing.lock().await.contains(model) {
            return Err(FramegenError::backend(model, "mock submission failure"));
        }
        Ok(OperationHandle(format!(
            "models/{model}/operations/{}",
            requests.len()
        )))
    }

    async fn poll(&self, _handle: &OperationHandle) -> Result<OperationStatus, FramegenError> {
        *self.poll_count.lock().await += 1;
        self.polls
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Self::pending()))
    }

    async fn download(&self, uri: &str) -> Result<GeneratedMedia, FramegenError> {
        self.downloads.lock().await.push(uri.to_string());
        Ok(GeneratedMedia {
            bytes: b"mp4-bytes".to_vec(),
            content_type: "video/mp4".into(),
        })
    }
}

/// Fetcher returning the URL's own bytes as the asset.
#[derive(Default)]
pub struct MockFetcher {
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes returned for `url`.
    pub fn bytes_for(url: &str) -> Vec<u8> {
        url.as_bytes().to_vec()
    }

    pub async fn fetched(&self) -> Vec<String> {
        self.fetched.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockFetcher {
    fn name(&self) -> &str {
        "mock-fetcher"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Fetcher
    }
}

#[async_trait]
impl AssetFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<InlineAsset, FramegenError> {
        self.fetched.lock().await.push(url.to_string());
        Ok(InlineAsset {
            bytes: Self::bytes_for(url),
            mime_type: "image/png".into(),
        })
    }
}

/// Notifier recording every event it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<AssetReady>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<AssetReady> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for RecordingNotifier {
    fn name(&self) -> &str {
        "recording-notifier"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }
}

#[async_trait]
impl AssetNotifier for RecordingNotifier {
    async fn asset_ready(&self, event: &AssetReady) -> Result<(), FramegenError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
