// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for the Framegen pipeline.
//!
//! Provides a WAL-mode SQLite database with embedded migrations, a
//! visibility-timeout queue store, a merge-patch entity record store, and
//! object storage adapters for generated assets.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod objects;
pub mod queries;

pub use adapter::{open_stores, SqliteEntityStore, SqliteQueueStore};
pub use database::Database;
pub use objects::{object_store_from_config, HttpObjectStore, LocalObjectStore};
