// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./framegen.toml` > `~/.config/framegen/framegen.toml`
//! > `/etc/framegen/framegen.toml`, with environment variable overrides via the
//! `FRAMEGEN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FramegenConfig;

/// Sections that may be targeted by `FRAMEGEN_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "service", "storage", "objects", "gemini", "image", "video", "worker", "dispatch", "gateway",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/framegen/framegen.toml`
/// 3. `~/.config/framegen/framegen.toml`
/// 4. `./framegen.toml`
/// 5. `FRAMEGEN_*` environment variables
pub fn load_config() -> Result<FramegenConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<FramegenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FramegenConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FramegenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FramegenConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FramegenConfig::default()))
        .merge(Toml::file("/etc/framegen/framegen.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("framegen/framegen.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("framegen.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")`: keys such as
/// `visibility_timeout_secs` contain underscores, so only the first segment
/// naming a known section becomes a dot. `FRAMEGEN_VIDEO_MAX_POLL_ATTEMPTS`
/// maps to `video.max_poll_attempts`.
fn env_provider() -> Env {
    Env::prefixed("FRAMEGEN_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
