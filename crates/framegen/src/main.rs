// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Framegen - asynchronous image and video generation worker.
//!
//! This is the binary entry point: the long-running `serve` process plus
//! one-shot operator commands against the same queue database.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod pipeline;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use framegen_core::types::{MessageId, QueueName};

/// Framegen - asynchronous image and video generation worker.
#[derive(Parser, Debug)]
#[command(name = "framegen", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the gateway and the baseline pull schedule until interrupted.
    Serve,
    /// Process one batch from a queue and print the summary as JSON.
    Work {
        queue: QueueName,
    },
    /// Enqueue a job on a queue.
    Enqueue {
        queue: QueueName,
        #[arg(long)]
        prompt: String,
        /// `kind:id` of the record to patch with the result.
        #[arg(long)]
        owner: Option<String>,
        /// URL of a reference image (edit source or starting frame).
        #[arg(long)]
        reference: Option<String>,
        /// Treat the reference as the image to edit.
        #[arg(long)]
        edit: bool,
        /// Generation parameters as a JSON object.
        #[arg(long)]
        params: Option<String>,
    },
    /// Inspect or operate on a queue.
    Queue {
        #[command(subcommand)]
        action: QueueCommand,
    },
    /// Manage Framegen configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum QueueCommand {
    /// Number of live messages.
    Count { queue: QueueName },
    /// Read messages without claiming them (read counts still increment).
    Peek {
        queue: QueueName,
        #[arg(long, default_value_t = 10)]
        qty: usize,
        /// Visibility timeout in seconds.
        #[arg(long, default_value_t = 0)]
        vt: u64,
    },
    /// Move a message to the archive table.
    Archive { queue: QueueName, id: i64 },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration, then print the effective values.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => framegen_config::load_and_validate_path(path),
        None => framegen_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            framegen_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.service.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Work { queue } => commands::run_work(&config, queue).await,
        Commands::Enqueue {
            queue,
            prompt,
            owner,
            reference,
            edit,
            params,
        } => {
            let request = commands::EnqueueArgs {
                queue,
                prompt,
                owner,
                reference,
                edit,
                params,
            };
            commands::run_enqueue(&config, request).await
        }
        Commands::Queue { action } => match action {
            QueueCommand::Count { queue } => commands::run_count(&config, queue).await,
            QueueCommand::Peek { queue, qty, vt } => {
                commands::run_peek(&config, queue, qty, vt).await
            }
            QueueCommand::Archive { queue, id } => {
                commands::run_archive(&config, queue, MessageId(id)).await
            }
        },
        Commands::Config {
            action: ConfigCommand::Check,
        } => commands::run_config_check(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_enqueue_arguments() {
        let cli = Cli::parse_from([
            "framegen",
            "enqueue",
            "video_generation",
            "--prompt",
            "waves at dusk",
            "--owner",
            "scene:4",
            "--params",
            r#"{"resolution":"720p"}"#,
        ]);
        match cli.command {
            Commands::Enqueue {
                queue,
                prompt,
                owner,
                edit,
                ..
            } => {
                assert_eq!(queue, QueueName::VideoGeneration);
                assert_eq!(prompt, "waves at dusk");
                assert_eq!(owner.as_deref(), Some("scene:4"));
                assert!(!edit);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_queue() {
        assert!(Cli::try_parse_from(["framegen", "work", "audio_generation"]).is_err());
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["framegen", "queue", "count", "image_generation", "--config", "/tmp/f.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/f.toml")));
    }
}
