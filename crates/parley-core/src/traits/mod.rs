// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits for the collaborators the dispatcher drives.
//!
//! Both traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn ...>` and swapped for in-memory fakes in tests.

pub mod backend;
pub mod store;

pub use backend::CompletionBackend;
pub use store::MessageStore;
