// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configured adapters into a queue client and a job processor.

use std::sync::Arc;
use std::time::Duration;

use framegen_config::FramegenConfig;
use framegen_core::FramegenError;
use framegen_storage::{open_stores, Database, SqliteEntityStore, SqliteQueueStore};
use framegen_worker::{
    Adapters, DispatchTrigger, EnqueueService, HttpAssetFetcher, JobProcessor, QueueClient,
};
use tracing::debug;

/// The SQLite-backed stores every command shares.
pub struct Stores {
    pub db: Database,
    pub queue: Arc<SqliteQueueStore>,
    pub entities: Arc<SqliteEntityStore>,
}

impl Stores {
    pub async fn open(config: &FramegenConfig) -> Result<Self, FramegenError> {
        let (db, queue, entities) = open_stores(&config.storage).await?;
        Ok(Self {
            db,
            queue: Arc::new(queue),
            entities: Arc::new(entities),
        })
    }

    pub fn queue_client(&self) -> QueueClient {
        QueueClient::new(self.queue.clone())
    }

    /// Enqueue path with the dispatch trigger from config.
    pub fn enqueue_service(&self, config: &FramegenConfig) -> Result<EnqueueService, FramegenError> {
        let trigger = DispatchTrigger::from_config(&config.dispatch, &config.gateway)?;
        Ok(EnqueueService::new(self.queue_client(), trigger))
    }

    /// Builds the processor with the Gemini backends and the configured object store.
    pub fn processor(&self, config: &FramegenConfig) -> Result<JobProcessor, FramegenError> {
        let (image, video) = framegen_gemini::backends_from_config(&config.gemini)?;
        let objects = framegen_storage::object_store_from_config(&config.objects)?;
        let fetcher =
            HttpAssetFetcher::new(Duration::from_secs(config.gemini.request_timeout_secs))?;
        debug!(backend = ?config.objects.backend, "object store initialized");

        JobProcessor::from_config(
            config,
            Adapters {
                queue: self.queue.clone(),
                entities: self.entities.clone(),
                objects: Arc::from(objects),
                image: Arc::new(image),
                video: Arc::new(video),
                fetcher: Arc::new(fetcher),
                notifier: None,
            },
        )
    }

    pub async fn close(self) -> Result<(), FramegenError> {
        self.db.close().await
    }
}
