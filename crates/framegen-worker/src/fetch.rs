// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetches reference assets so they can be embedded inline in backend requests.

use std::time::Duration;

use async_trait::async_trait;
use framegen_core::types::{AdapterType, InlineAsset};
use framegen_core::{AssetFetcher, FramegenError, PluginAdapter};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// Upper bound on reference asset size.
const MAX_REFERENCE_BYTES: usize = 20 * 1024 * 1024;

/// [`AssetFetcher`] over plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FramegenError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FramegenError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

fn fetch_err(message: String, source: Option<reqwest::Error>) -> FramegenError {
    FramegenError::Backend {
        model: "reference-fetch".into(),
        message,
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

/// Guesses a MIME type from the URL path when the server does not send one.
fn mime_from_url(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        "image/jpeg"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".mp4") {
        "video/mp4"
    } else {
        "image/png"
    }
}

#[async_trait]
impl PluginAdapter for HttpAssetFetcher {
    fn name(&self) -> &str {
        "http-fetcher"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Fetcher
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<InlineAsset, FramegenError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(format!("failed to fetch {url}: {e}"), Some(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("fetching {url} returned {status}"), None));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| v.starts_with("image/") || v.starts_with("video/"))
            .unwrap_or_else(|| mime_from_url(url).to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_err(format!("failed to read {url}: {e}"), Some(e)))?;
        if bytes.len() > MAX_REFERENCE_BYTES {
            return Err(fetch_err(
                format!("reference asset {url} is {} bytes, limit is {MAX_REFERENCE_BYTES}", bytes.len()),
                None,
            ));
        }

        debug!(url, size = bytes.len(), %mime_type, "reference asset fetched");
        Ok(InlineAsset {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}
