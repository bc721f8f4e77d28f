// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementations of the queue store and entity store traits.

use std::time::Duration;

use async_trait::async_trait;
use framegen_config::model::StorageConfig;
use framegen_core::types::{AdapterType, HealthStatus};
use framegen_core::{
    EntityKey, EntityStore, Envelope, FramegenError, MessageId, PluginAdapter, QueueName,
    QueueStore,
};
use tracing::debug;

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed queue store.
///
/// Cheap to clone; every clone shares the same background connection.
#[derive(Clone)]
pub struct SqliteQueueStore {
    db: Database,
}

impl SqliteQueueStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Number of archived messages, for operator tooling.
    pub async fn archived_count(&self, queue: QueueName) -> Result<u64, FramegenError> {
        queries::queue::archived_count(&self.db, queue).await
    }
}

async fn ping(db: &Database) -> Result<HealthStatus, FramegenError> {
    db.connection()
        .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
        .await
        .map_err(map_tr_err)?;
    Ok(HealthStatus::Healthy)
}

#[async_trait]
impl PluginAdapter for SqliteQueueStore {
    fn name(&self) -> &str {
        "sqlite-queue"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Queue
    }

    async fn health_check(&self) -> Result<HealthStatus, FramegenError> {
        ping(&self.db).await
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn send(
        &self,
        queue: QueueName,
        payload: &serde_json::Value,
    ) -> Result<MessageId, FramegenError> {
        let id = queries::queue::send(&self.db, queue, payload).await?;
        debug!(%queue, message_id = %id, "message sent");
        Ok(id)
    }

    async fn read(
        &self,
        queue: QueueName,
        visibility_timeout: Duration,
        max_count: usize,
    ) -> Result<Vec<Envelope>, FramegenError> {
        queries::queue::read(&self.db, queue, visibility_timeout, max_count).await
    }

    async fn delete(&self, queue: QueueName, id: MessageId) -> Result<bool, FramegenError> {
        queries::queue::delete(&self.db, queue, id).await
    }

    async fn archive(&self, queue: QueueName, id: MessageId) -> Result<bool, FramegenError> {
        queries::queue::archive(&self.db, queue, id).await
    }

    async fn count(&self, queue: QueueName) -> Result<u64, FramegenError> {
        queries::queue::count(&self.db, queue).await
    }
}

/// SQLite-backed entity record store.
#[derive(Clone)]
pub struct SqliteEntityStore {
    db: Database,
}

impl SqliteEntityStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace a whole record. Not part of the pipeline contract.
    pub async fn put(
        &self,
        key: &EntityKey,
        record: &serde_json::Value,
    ) -> Result<(), FramegenError> {
        queries::entities::put(&self.db, key, record).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteEntityStore {
    fn name(&self) -> &str {
        "sqlite-entities"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::EntityStore
    }

    async fn health_check(&self) -> Result<HealthStatus, FramegenError> {
        ping(&self.db).await
    }
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    async fn get(&self, key: &EntityKey) -> Result<Option<serde_json::Value>, FramegenError> {
        queries::entities::get(&self.db, key).await
    }

    async fn update(
        &self,
        key: &EntityKey,
        patch: &serde_json::Value,
    ) -> Result<bool, FramegenError> {
        queries::entities::merge(&self.db, key, patch).await
    }
}

/// Opens the configured database and returns both stores over it.
pub async fn open_stores(
    config: &StorageConfig,
) -> Result<(Database, SqliteQueueStore, SqliteEntityStore), FramegenError> {
    let db = Database::open_with(&config.database_path, config.wal_mode).await?;
    debug!(path = %config.database_path, "SQLite stores initialized");
    Ok((
        db.clone(),
        SqliteQueueStore::new(db.clone()),
        SqliteEntityStore::new(db),
    ))
}
