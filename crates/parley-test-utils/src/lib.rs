// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! # Components
//!
//! - [`MockBackend`] - Completion backend with scripted replies and captured requests
//! - [`MemoryStore`] - In-memory message store with failure injection
//! - [`TestHarness`] - A wired dispatcher over a mock backend and a temp store

pub mod harness;
pub mod memory_store;
pub mod mock_backend;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_store::MemoryStore;
pub use mock_backend::{CapturedRequest, MockBackend};
