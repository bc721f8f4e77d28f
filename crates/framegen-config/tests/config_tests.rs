// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Framegen configuration system.

use framegen_config::diagnostic::ConfigError;
use framegen_config::model::{FramegenConfig, ObjectBackend};
use framegen_config::{load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[service]
name = "storyboard-worker"
log_level = "debug"

[storage]
database_path = "/tmp/framegen-test.db"
wal_mode = false

[objects]
backend = "http"
endpoint = "https://storage.example.com/object"
bucket = "scenes"
public_base_url = "https://cdn.example.com/scenes"

[gemini]
api_key = "key-123"

[image]
batch_size = 8
models = [{ id = "imagen-a" }, { id = "imagen-b" }]

[video]
visibility_timeout_secs = 900
poll_interval_secs = 5
max_poll_attempts = 60
models = [
  { id = "veo-fast" },
  { id = "veo-legacy", supports_resolution = false },
]

[worker]
max_read_count = 5

[dispatch]
enabled = false

[gateway]
port = 9000
bearer_token = "secret"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "storyboard-worker");
    assert_eq!(config.storage.database_path, "/tmp/framegen-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.objects.backend, ObjectBackend::Http);
    assert_eq!(config.objects.bucket, "scenes");
    assert_eq!(config.gemini.api_key.as_deref(), Some("key-123"));
    assert_eq!(config.image.batch_size, 8);
    assert_eq!(config.image.models.len(), 2);
    assert_eq!(config.image.models[1].id, "imagen-b");
    assert_eq!(config.video.models.len(), 2);
    assert!(!config.video.models[1].supports_resolution);
    assert_eq!(config.video.max_poll_attempts, 60);
    assert_eq!(config.worker.max_read_count, Some(5));
    assert!(!config.dispatch.enabled);
    assert_eq!(config.gateway.port, 9000);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.service.name, "framegen");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.storage.database_path, "framegen.db");
    assert_eq!(config.image.visibility_timeout_secs, 60);
    assert_eq!(config.video.visibility_timeout_secs, 600);
    assert_eq!(config.video.poll_interval_secs, 10);
    assert_eq!(config.video.max_poll_attempts, 36);
    assert_eq!(config.video.models.len(), 3);
    assert!(config.worker.max_read_count.is_none());
    assert!(config.dispatch.enabled);
    assert_eq!(config.dispatch.timeout_ms, 2000);
    assert!(config.gateway.bearer_token.is_none());
}

#[test]
fn unknown_key_is_rejected() {
    let err = load_config_from_str("[video]\nmax_pol_attempts = 3\n")
        .expect_err("should reject unknown field");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_pol_attempts"),
        "got: {err_str}"
    );
}

#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let errors = load_and_validate_str("[video]\nmax_pol_attempts = 3\n")
        .expect_err("should fail");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("max_poll_attempts"));
}

#[test]
fn wrong_type_is_reported() {
    let errors =
        load_and_validate_str("[image]\nbatch_size = \"five\"\n").expect_err("should fail");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str(
        "[video]\nvisibility_timeout_secs = 60\npoll_interval_secs = 10\nmax_poll_attempts = 36\n",
    )
    .expect_err("visibility timeout below poll budget must fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("visibility_timeout_secs")
    )));
}

#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: FramegenConfig = Figment::new()
        .merge(Serialized::defaults(FramegenConfig::default()))
        .merge(Toml::string("[video]\nmax_poll_attempts = 10\n"))
        .merge(("video.max_poll_attempts", 12))
        .extract()
        .expect("should merge override");

    assert_eq!(config.video.max_poll_attempts, 12);
}

#[test]
fn missing_config_files_are_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: FramegenConfig = Figment::new()
        .merge(Serialized::defaults(FramegenConfig::default()))
        .merge(Toml::file("/nonexistent/framegen.toml"))
        .extract()
        .expect("missing file should be skipped");
    assert_eq!(config.service.name, "framegen");
}
