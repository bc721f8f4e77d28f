// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Framegen integration tests.
//!
//! Provides in-memory collaborators and a test harness for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MemoryQueue`] - queue store with visibility timeouts
//! - [`MemoryEntityStore`], [`MemoryObjectStore`] - record and object stores
//! - [`MockImageBackend`], [`MockVideoBackend`] - scriptable generation backends
//! - [`TestHarness`] - a fully wired job processor

pub mod harness;
pub mod memory_queue;
pub mod memory_stores;
pub mod mock_backends;

pub use harness::{TestHarness, HARNESS_CDN};
pub use memory_queue::MemoryQueue;
pub use memory_stores::{MemoryEntityStore, MemoryObjectStore, StoredObject};
pub use mock_backends::{
    MockFetcher, MockImageBackend, MockVideoBackend, RecordingNotifier, MOCK_VIDEO_URI,
};
