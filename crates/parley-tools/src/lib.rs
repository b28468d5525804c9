// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait, registry, and built-in tools for the Parley dispatcher.
//!
//! The orchestrator resolves every tool call the backend requests through a
//! [`ToolRegistry`] and advertises the registry's catalog on each backend call.
//!
//! Built-in tools:
//! - [`builtin::CurrentTimeTool`] -- Report the current UTC time

pub mod builtin;
pub mod tool;

pub use tool::{FnTool, Tool, ToolRegistry};
