// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Baseline pull schedule: one batch per queue per interval.

use std::sync::Arc;
use std::time::Duration;

use framegen_core::types::QueueName;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::processor::JobProcessor;

/// Spawns one drain task per queue.
///
/// A batch in flight is never interrupted; cancellation takes effect between
/// batches.
pub fn spawn_schedule(
    processor: Arc<JobProcessor>,
    interval: Duration,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    QueueName::ALL
        .into_iter()
        .map(|queue| {
            let processor = processor.clone();
            let cancel = cancel.clone();
            tokio::spawn(drain_loop(processor, queue, interval, cancel))
        })
        .collect()
}

async fn drain_loop(
    processor: Arc<JobProcessor>,
    queue: QueueName,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(%queue, interval_secs = interval.as_secs(), "scheduled worker started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match processor.run(queue).await {
                    Ok(summary) if summary.processed > 0 => {
                        debug!(%queue, processed = summary.processed, "scheduled batch finished");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(%queue, error = %e, "scheduled batch failed (non-fatal)");
                    }
                }
            }
            _ = cancel.cancelled() => {
                info!(%queue, "scheduled worker shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::EntityLinker;
    use crate::processor::ProcessorSettings;
    use crate::publisher::AssetPublisher;
    use crate::queue::QueueClient;
    use crate::strategy::{FallbackChain, ImageStrategy, OperationPoller, VideoStrategy};
    use framegen_config::{ModelCandidate, QueueSettings};
    use framegen_test_utils::{
        MemoryEntityStore, MemoryObjectStore, MemoryQueue, MockFetcher, MockImageBackend,
        MockVideoBackend,
    };
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn drains_queue_and_stops_on_cancel() {
        let queue = Arc::new(MemoryQueue::new());
        let objects = Arc::new(MemoryObjectStore::new("https://cdn.test"));
        let fetcher = Arc::new(MockFetcher::new());
        let settings = QueueSettings {
            visibility_timeout: Duration::from_secs(60),
            batch_size: 5,
            concurrency: 1,
        };
        let processor = Arc::new(JobProcessor::new(
            QueueClient::new(queue.clone()),
            Arc::new(ImageStrategy::new(
                Arc::new(MockImageBackend::new()),
                fetcher.clone(),
                FallbackChain::new(vec![ModelCandidate::new("imagen")]).unwrap(),
            )),
            Arc::new(VideoStrategy::new(
                Arc::new(MockVideoBackend::new()),
                fetcher,
                FallbackChain::new(vec![ModelCandidate::new("veo")]).unwrap(),
                OperationPoller::new(Duration::from_secs(1), 1),
            )),
            AssetPublisher::new(objects.clone()),
            EntityLinker::new(Arc::new(MemoryEntityStore::new())),
            ProcessorSettings {
                image: settings,
                video: settings,
                max_read_count: None,
            },
        )
        .unwrap());

        queue
            .send_raw(QueueName::ImageGeneration, json!({"media_kind": "image", "prompt": "fox"}))
            .await;

        let cancel = CancellationToken::new();
        let handles = spawn_schedule(processor, Duration::from_secs(30), cancel.clone());
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert_eq!(queue.len(QueueName::ImageGeneration).await, 0);
        assert_eq!(objects.paths().await.len(), 1);

        cancel.cancel();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
