// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage adapters for generated assets.
//!
//! [`LocalObjectStore`] writes files under a root directory that some static
//! server exposes at `public_base_url`; [`HttpObjectStore`] uploads to a
//! bucket-style HTTP endpoint.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use framegen_config::model::ObjectsConfig;
use framegen_core::types::AdapterType;
use framegen_core::{FramegenError, ObjectStore, PluginAdapter};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

fn publish_err(path: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> FramegenError {
    FramegenError::Publish {
        path: path.to_string(),
        source: source.into(),
    }
}

/// Rejects absolute paths and `..` so an object can never escape the root.
fn relative_object_path(path: &str) -> Result<PathBuf, FramegenError> {
    let candidate = Path::new(path);
    let clean = !path.is_empty()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if clean {
        Ok(candidate.to_path_buf())
    } else {
        Err(publish_err(path, "object path must be relative and normalized"))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Filesystem-backed object store.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Root directory objects are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PluginAdapter for LocalObjectStore {
    fn name(&self) -> &str {
        "local-objects"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ObjectStore
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, FramegenError> {
        let target = self.root.join(relative_object_path(path)?);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| publish_err(path, e))?;
        }

        // Write-then-rename so a crashed upload never leaves a truncated object.
        let partial = target.with_extension("partial");
        tokio::fs::write(&partial, &bytes)
            .await
            .map_err(|e| publish_err(path, e))?;
        tokio::fs::rename(&partial, &target)
            .await
            .map_err(|e| publish_err(path, e))?;

        debug!(path, content_type, size = bytes.len(), "object written");
        Ok(join_url(&self.public_base_url, path))
    }
}

/// Object store that uploads with `PUT {endpoint}/{bucket}/{path}`.
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    api_key: Option<String>,
    public_base_url: String,
}

impl HttpObjectStore {
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        api_key: Option<String>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, FramegenError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| FramegenError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            api_key,
            public_base_url: public_base_url.into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for HttpObjectStore {
    fn name(&self) -> &str {
        "http-objects"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ObjectStore
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, FramegenError> {
        relative_object_path(path)?;
        let url = join_url(&join_url(&self.endpoint, &self.bucket), path);

        let mut request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = request.send().await.map_err(|e| publish_err(path, e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(publish_err(path, format!("upload returned {status}: {body}")));
        }

        debug!(path, content_type, "object uploaded");
        Ok(join_url(&self.public_base_url, path))
    }
}

/// Builds the object store selected by configuration.
pub fn object_store_from_config(
    config: &ObjectsConfig,
) -> Result<Box<dyn ObjectStore>, FramegenError> {
    use framegen_config::model::ObjectBackend;

    match config.backend {
        ObjectBackend::Local => Ok(Box::new(LocalObjectStore::new(
            &config.root_dir,
            &config.public_base_url,
        ))),
        ObjectBackend::Http => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                FramegenError::Config("objects.endpoint is required for the http backend".into())
            })?;
            Ok(Box::new(HttpObjectStore::new(
                endpoint,
                &config.bucket,
                config.api_key.clone(),
                &config.public_base_url,
            )?))
        }
    }
}
