// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion backend trait for language-model integrations.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{Message, ToolDefinition};

/// A language-model backend that produces one assistant turn per call.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Completes `conversation` with `tools` advertised to the model.
    ///
    /// Returns `Ok(None)` when the backend answered but produced no message
    /// (for example an empty choice list). The caller decides how to treat it.
    async fn complete(
        &self,
        conversation: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Option<Message>, ParleyError>;
}
