// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini backend adapters for the Framegen pipeline.
//!
//! [`GeminiImageClient`] implements [`ImageBackend`](framegen_core::ImageBackend)
//! over `generateContent`; [`VeoVideoClient`] implements
//! [`VideoBackend`](framegen_core::VideoBackend) over `predictLongRunning` and
//! operation polling. Both share one authenticated [`GeminiClient`].

pub mod client;
pub mod image;
pub mod types;
pub mod video;

use std::time::Duration;

use framegen_config::model::GeminiConfig;
use framegen_core::FramegenError;
use tracing::info;

pub use client::GeminiClient;
pub use image::GeminiImageClient;
pub use video::VeoVideoClient;

/// Builds the shared client from configuration.
///
/// API key resolution order: `gemini.api_key` -> `GEMINI_API_KEY` env var -> error.
pub fn client_from_config(config: &GeminiConfig) -> Result<GeminiClient, FramegenError> {
    let api_key = resolve_api_key(&config.api_key)?;
    let client = GeminiClient::new(
        &api_key,
        Duration::from_secs(config.request_timeout_secs),
    )?
    .with_base_url(&config.base_url);
    info!(base_url = %config.base_url, "gemini client initialized");
    Ok(client)
}

/// Builds both backends from configuration.
pub fn backends_from_config(
    config: &GeminiConfig,
) -> Result<(GeminiImageClient, VeoVideoClient), FramegenError> {
    let client = client_from_config(config)?;
    Ok((
        GeminiImageClient::new(client.clone()),
        VeoVideoClient::new(client),
    ))
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, FramegenError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("GEMINI_API_KEY").map_err(|_| {
        FramegenError::Config(
            "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
        )
    })
}
