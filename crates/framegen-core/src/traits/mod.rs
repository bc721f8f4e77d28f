// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod backend;
pub mod notify;
pub mod queue;
pub mod storage;

pub use adapter::PluginAdapter;
pub use backend::{AssetFetcher, ImageBackend, VideoBackend};
pub use notify::AssetNotifier;
pub use queue::QueueStore;
pub use storage::{EntityStore, ObjectStore};
