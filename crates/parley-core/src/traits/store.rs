// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store trait for per-user conversation persistence.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::Message;

/// Durable per-user conversation history with a pending flag per message.
///
/// Implementations must make every insert and unqueue for a user visible to
/// any later read for that user; the dispatcher's drain loop relies on it to
/// pick up messages queued while a pass was running.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Stores `messages` in order for `user_id` and returns them as stored.
    async fn insert(
        &self,
        user_id: &str,
        pending: bool,
        messages: &[Message],
    ) -> Result<Vec<Message>, ParleyError>;

    /// Marks every pending message of `user_id` as no longer pending and
    /// returns those messages.
    async fn unqueue(&self, user_id: &str) -> Result<Vec<Message>, ParleyError>;

    /// Returns the conversation of `user_id` in store order.
    ///
    /// Only messages folded in by [`unqueue`](MessageStore::unqueue) belong to
    /// it; still-pending messages are left out.
    async fn read_history(&self, user_id: &str) -> Result<Vec<Message>, ParleyError>;

    /// Returns the messages of `user_id` that are still pending.
    async fn pending(&self, user_id: &str) -> Result<Vec<Message>, ParleyError>;
}
