// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley dispatcher.

use thiserror::Error;

/// The primary error type shared by the store, backend, tools, and dispatcher.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (invalid values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Message store errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Completion backend errors (transport failure, malformed or empty reply).
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend asked for a tool that is not in the registry.
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    /// A tool call carried an argument payload that is not valid JSON.
    #[error("malformed arguments for tool {tool}: {source}")]
    ToolArguments {
        tool: String,
        source: serde_json::Error,
    },

    /// A tool ran and reported a failure.
    #[error("tool {name} failed: {message}")]
    Tool { name: String, message: String },

    /// The orchestrator hit its backend-call bound without a tool-free turn.
    #[error("conversation exceeded {limit} backend turns without a final answer")]
    MaxTurnsExceeded { limit: usize },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Wraps any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ParleyError::Storage {
            source: Box::new(err),
        }
    }

    /// Builds a backend failure without an underlying cause.
    pub fn backend(message: impl Into<String>) -> Self {
        ParleyError::Backend {
            message: message.into(),
            source: None,
        }
    }
}
