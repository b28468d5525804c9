// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user sequential dispatching and the tool-calling conversation loop.
//!
//! [`UserDispatcher`] guarantees at most one drain session per user at a time
//! and folds messages that arrive mid-session into the same session.
//! [`Orchestrator`] runs one conversation against a completion backend until
//! the backend answers without requesting tools.

pub mod claims;
pub mod dispatcher;
pub mod orchestrator;
pub mod shutdown;

pub use claims::{ClaimGuard, ClaimSet};
pub use dispatcher::UserDispatcher;
pub use orchestrator::{InstructionFn, Orchestrator, OrchestratorBuilder};
