// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `framegen serve` command implementation.
//!
//! Runs the HTTP gateway and the baseline pull schedule side by side until
//! SIGINT or SIGTERM. Batches already running finish before the process exits.

use std::sync::Arc;
use std::time::Duration;

use framegen_config::FramegenConfig;
use framegen_core::FramegenError;
use framegen_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use framegen_worker::spawn_schedule;
use tracing::{info, warn};

use crate::pipeline::Stores;
use crate::shutdown;

pub async fn run_serve(config: FramegenConfig) -> Result<(), FramegenError> {
    info!(name = %config.service.name, "starting framegen");

    let stores = Stores::open(&config).await?;
    let processor = Arc::new(stores.processor(&config)?);
    let enqueue = Arc::new(stores.enqueue_service(&config)?);

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set; /v1 routes are unauthenticated");
    }

    let cancel = shutdown::install_signal_handler();

    let schedule = spawn_schedule(
        processor.clone(),
        Duration::from_secs(config.worker.schedule_interval_secs),
        cancel.clone(),
    );

    let state = GatewayState {
        processor,
        enqueue,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState::default(),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let served = framegen_gateway::start_server(&server_config, state, cancel.clone()).await;
    // A bind failure returns before any signal; stop the schedule too.
    cancel.cancel();

    for result in futures::future::join_all(schedule).await {
        if let Err(e) = result {
            warn!(error = %e, "drain task ended abnormally");
        }
    }

    stores.close().await?;
    served?;
    info!("framegen stopped");
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("framegen={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
