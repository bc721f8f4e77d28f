// SPDX-FileCopyrightText: 2026 Framegen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the queue and entity tables.

pub mod entities;
pub mod queue;
