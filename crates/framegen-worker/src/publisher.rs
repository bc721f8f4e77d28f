// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uploads generated media to object storage under deterministic paths.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use framegen_core::types::{EntityKey, MediaKind, MessageId};
use framegen_core::{FramegenError, ObjectStore};
use tracing::info;

/// A published asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAsset {
    pub path: String,
    pub url: String,
}

pub struct AssetPublisher {
    store: Arc<dyn ObjectStore>,
}

impl AssetPublisher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Uploads `bytes` and returns where they landed. Upload failure fails the job.
    pub async fn publish(
        &self,
        owner: Option<&EntityKey>,
        message_id: MessageId,
        media_kind: MediaKind,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<PublishedAsset, FramegenError> {
        let path = object_path(owner, message_id, media_kind, content_type, Utc::now());
        let url = self.store.put(&path, bytes, content_type).await?;
        info!(%path, %url, "asset published");
        Ok(PublishedAsset { path, url })
    }
}

/// `{owner}/{id}_{epoch_ms}.{ext}`, or `standalone/{message_id}_{epoch_ms}.{ext}`
/// when the job has no owner. The timestamp makes every attempt unique.
pub fn object_path(
    owner: Option<&EntityKey>,
    message_id: MessageId,
    media_kind: MediaKind,
    content_type: &str,
    now: DateTime<Utc>,
) -> String {
    let ext = extension_for(content_type, media_kind);
    let ts = now.timestamp_millis();
    match owner {
        Some(key) => format!("{key}/{}_{ts}.{ext}", key.id),
        None => format!("standalone/{message_id}_{ts}.{ext}"),
    }
}

/// File extension for a backend content type.
pub fn extension_for(content_type: &str, media_kind: MediaKind) -> &'static str {
    match content_type.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        _ => media_kind.default_extension(),
    }
}
