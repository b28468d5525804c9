// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley dispatcher.
//!
//! This crate provides the conversation types, the error type, and the
//! capability traits for the two collaborators the dispatcher consumes:
//! the [`MessageStore`] and the [`CompletionBackend`].

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use traits::{CompletionBackend, MessageStore};
pub use types::{Message, Role, ToolCall, ToolDefinition};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parley_error_messages() {
        let err = ParleyError::UnknownTool {
            name: "nope".into(),
        };
        assert_eq!(err.to_string(), "unknown tool: nope");

        let err = ParleyError::MaxTurnsExceeded { limit: 3 };
        assert!(err.to_string().contains("3 backend turns"));

        let err = ParleyError::backend("no message");
        assert_eq!(err.to_string(), "backend error: no message");

        let err = ParleyError::storage(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn tool_arguments_error_wraps_serde() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ParleyError::ToolArguments {
            tool: "sum".into(),
            source,
        };
        assert!(err.to_string().starts_with("malformed arguments for tool sum"));
    }

    #[test]
    fn traits_are_object_safe() {
        fn _store(_: &dyn MessageStore) {}
        fn _backend(_: &dyn CompletionBackend) {}
    }
}
