// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory entity record and object stores.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use framegen_core::types::{AdapterType, EntityKey};
use framegen_core::{merge_patch, EntityStore, FramegenError, ObjectStore, PluginAdapter};

/// Entity records keyed by `kind:id`, patched with JSON merge-patch.
#[derive(Default)]
pub struct MemoryEntityStore {
    records: Mutex<HashMap<String, serde_json::Value>>,
    updates: Mutex<Vec<String>>,
    failing: Mutex<bool>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or replaces a record.
    pub async fn insert(&self, key: &EntityKey, record: serde_json::Value) {
        self.records.lock().await.insert(key.to_string(), record);
    }

    pub async fn get_record(&self, key: &EntityKey) -> Option<serde_json::Value> {
        self.records.lock().await.get(&key.to_string()).cloned()
    }

    /// Keys of every successful patch, in order.
    pub async fn updates(&self) -> Vec<String> {
        self.updates.lock().await.clone()
    }

    /// Makes every subsequent update fail with a storage error.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }
}

#[async_trait]
impl PluginAdapter for MemoryEntityStore {
    fn name(&self) -> &str {
        "memory-entities"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::EntityStore
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn get(&self, key: &EntityKey) -> Result<Option<serde_json::Value>, FramegenError> {
        Ok(self.get_record(key).await)
    }

    async fn update(
        &self,
        key: &EntityKey,
        patch: &serde_json::Value,
    ) -> Result<bool, FramegenError> {
        if *self.failing.lock().await {
            return Err(FramegenError::Storage {
                source: "entity store unavailable".into(),
            });
        }
        let mut records = self.records.lock().await;
        match records.get_mut(&key.to_string()) {
            Some(record) => {
                merge_patch(record, patch);
                self.updates.lock().await.push(key.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Objects kept in memory, served under `public_base_url`.
pub struct MemoryObjectStore {
    public_base_url: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failing: Mutex<bool>,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            objects: Mutex::new(BTreeMap::new()),
            failing: Mutex::new(false),
        }
    }

    /// Stored paths in lexical order.
    pub async fn paths(&self) -> Vec<String> {
        self.objects.lock().await.keys().cloned().collect()
    }

    pub async fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects.lock().await.get(path).cloned()
    }

    /// Makes every subsequent upload fail.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }
}

#[async_trait]
impl PluginAdapter for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory-objects"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ObjectStore
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, FramegenError> {
        if *self.failing.lock().await {
            return Err(FramegenError::Publish {
                path: path.to_string(),
                source: "object store unavailable".into(),
            });
        }
        self.objects.lock().await.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("{}/{path}", self.public_base_url.trim_end_matches('/')))
    }
}
