// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client shared by the Gemini image and Veo video adapters.
//!
//! Handles authentication, URL construction, error classification (quota
//! exhaustion becomes [`FramegenError::RateLimited`]) and retry of idempotent
//! reads on transient server errors.

use std::time::Duration;

use framegen_core::FramegenError;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::ApiErrorResponse;

/// Default base URL of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Public HTTP endpoint for `gs://bucket/object` result URIs.
pub const DEFAULT_GCS_BASE_URL: &str = "https://storage.googleapis.com";

/// Header carrying the API key on every request, downloads included.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Low-level Gemini HTTP client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    gcs_base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl GeminiClient {
    /// Creates a client that authenticates every request with `api_key`.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, FramegenError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| FramegenError::Config(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FramegenError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            gcs_base_url: DEFAULT_GCS_BASE_URL.to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Overrides the base URL (proxies, regional endpoints, wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the endpoint `gs://` URIs are rewritten to.
    pub fn with_gcs_base_url(mut self, url: impl Into<String>) -> Self {
        self.gcs_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the retry policy for idempotent reads.
    pub fn with_retries(mut self, max_retries: u32, delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a model method, e.g. `models/veo-3:predictLongRunning`.
    pub fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url)
    }

    /// Resolves an operation name or absolute URI against the base URL.
    ///
    /// `gs://bucket/object` becomes `{gcs_base_url}/bucket/object`.
    pub fn resolve(&self, name_or_uri: &str) -> String {
        if name_or_uri.starts_with("http://") || name_or_uri.starts_with("https://") {
            name_or_uri.to_string()
        } else if let Some(object) = name_or_uri.strip_prefix("gs://") {
            format!("{}/{}", self.gcs_base_url, object)
        } else {
            format!("{}/{}", self.base_url, name_or_uri.trim_start_matches('/'))
        }
    }

    /// POSTs a JSON body to a model method. Not retried: submissions are not idempotent.
    pub async fn post_model<B, R>(&self, model: &str, method: &str, body: &B) -> Result<R, FramegenError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.model_url(model, method);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(model, e))?;

        let status = response.status();
        debug!(%status, model, method, "model response received");
        let text = response.text().await.map_err(|e| request_failed(model, e))?;
        if !status.is_success() {
            return Err(classify_error(model, status, &text));
        }
        serde_json::from_str(&text).map_err(|e| FramegenError::Backend {
            model: model.to_string(),
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// GETs a JSON document, retrying transient server errors.
    pub async fn get_json(&self, label: &str, url: &str) -> Result<serde_json::Value, FramegenError> {
        let response = self.get_with_retry(label, url).await?;
        response.json().await.map_err(|e| FramegenError::Backend {
            model: label.to_string(),
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// GETs raw bytes and the response content type, retrying transient server errors.
    pub async fn get_bytes(
        &self,
        label: &str,
        url: &str,
    ) -> Result<(Vec<u8>, Option<String>), FramegenError> {
        let response = self.get_with_retry(label, url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_failed(label, e))?;
        Ok((bytes.to_vec(), content_type))
    }

    async fn get_with_retry(
        &self,
        label: &str,
        url: &str,
    ) -> Result<reqwest::Response, FramegenError> {
        let mut attempt = 0;
        loop {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| request_failed(label, e))?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                attempt += 1;
                warn!(%status, attempt, label, "transient error, will retry");
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }
            return Err(classify_error(label, status, &body));
        }
    }
}

fn request_failed(model: &str, e: reqwest::Error) -> FramegenError {
    FramegenError::Backend {
        model: model.to_string(),
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Returns true for server-side status codes worth retrying on reads.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503)
}

/// Maps a non-success response to a [`FramegenError`].
///
/// HTTP 429 and a `RESOURCE_EXHAUSTED` status are quota signals.
pub fn classify_error(model: &str, status: StatusCode, body: &str) -> FramegenError {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).ok();
    let message = match &parsed {
        Some(err) => format!(
            "Gemini API error ({}): {}",
            err.error.status.as_deref().unwrap_or(status.as_str()),
            err.error.message
        ),
        None => format!("API returned {status}: {body}"),
    };

    let exhausted = parsed
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .is_some_and(|s| s == "RESOURCE_EXHAUSTED");
    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        return FramegenError::RateLimited {
            model: model.to_string(),
            message,
        };
    }
    FramegenError::backend(model, message)
}
