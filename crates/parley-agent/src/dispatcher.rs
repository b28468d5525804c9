// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user sequential dispatcher.
//!
//! Inbound messages are stored as pending. Whoever claims the user first runs
//! a drain session: it keeps folding pending messages into the conversation
//! and running the orchestrator until nothing is pending. Callers that find
//! the user claimed return immediately; their message is picked up by the
//! session already running.

use std::sync::Arc;
use std::time::Duration;

use parley_core::{Message, MessageStore, ParleyError};
use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::claims::ClaimSet;
use crate::orchestrator::Orchestrator;

/// Routes user messages through the orchestrator, one drain session per user.
pub struct UserDispatcher {
    store: Arc<dyn MessageStore>,
    orchestrator: Arc<Orchestrator>,
    claims: ClaimSet,
    drain_timeout: Option<Duration>,
}

impl UserDispatcher {
    pub fn new(
        store: Arc<dyn MessageStore>,
        orchestrator: Arc<Orchestrator>,
        claims: ClaimSet,
    ) -> Self {
        Self {
            store,
            orchestrator,
            claims,
            drain_timeout: None,
        }
    }

    /// Bounds each drain session. `None` leaves sessions unbounded.
    pub fn with_drain_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Stores `text` as a pending user message.
    pub async fn submit(&self, user_id: &str, text: &str) -> Result<(), ParleyError> {
        self.store
            .insert(user_id, true, &[Message::user(text)])
            .await?;
        debug!(user_id, "queued user message");
        Ok(())
    }

    pub fn is_claimed(&self, user_id: &str) -> bool {
        self.claims.is_claimed(user_id)
    }

    /// Drains `user_id` unless another session already holds it.
    ///
    /// Returns every turn produced during the session in production order, or
    /// an empty list when the user was already claimed. The claim is released
    /// on every exit path, including errors and timeouts. Turns persisted
    /// before a failure stay persisted.
    pub async fn drain_if_free(
        &self,
        user_id: &str,
        tool_args: &Value,
        instruction_args: &Value,
    ) -> Result<Vec<Message>, ParleyError> {
        let Some(_claim) = self.claims.try_claim(user_id) else {
            debug!(user_id, "user already claimed, leaving message queued");
            return Ok(Vec::new());
        };

        let span = info_span!("drain", user_id, session = %Uuid::new_v4());
        let drain = self
            .drain(user_id, tool_args, instruction_args)
            .instrument(span);
        let result = match self.drain_timeout {
            Some(duration) => tokio::time::timeout(duration, drain)
                .await
                .unwrap_or(Err(ParleyError::Timeout { duration })),
            None => drain.await,
        };

        if let Err(e) = &result {
            warn!(user_id, error = %e, "drain session failed");
        }
        result
    }

    /// Submits `text` then drains the user if free.
    pub async fn process(
        &self,
        user_id: &str,
        text: &str,
        tool_args: &Value,
        instruction_args: &Value,
    ) -> Result<Vec<Message>, ParleyError> {
        self.submit(user_id, text).await?;
        self.drain_if_free(user_id, tool_args, instruction_args)
            .await
    }

    async fn drain(
        &self,
        user_id: &str,
        tool_args: &Value,
        instruction_args: &Value,
    ) -> Result<Vec<Message>, ParleyError> {
        let mut output = Vec::new();
        let mut passes = 0usize;

        loop {
            if self.store.pending(user_id).await?.is_empty() {
                break;
            }
            passes += 1;

            let folded = self.store.unqueue(user_id).await?;
            let history = self.store.read_history(user_id).await?;
            debug!(
                user_id,
                pass = passes,
                folded = folded.len(),
                history = history.len(),
                "running drain pass"
            );

            let produced = self
                .orchestrator
                .run(history, tool_args, instruction_args)
                .await?;
            self.store.insert(user_id, false, &produced).await?;
            output.extend(produced);
        }

        info!(user_id, passes, produced = output.len(), "drain session finished");
        Ok(output)
    }
}

impl std::fmt::Debug for UserDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDispatcher")
            .field("claims", &self.claims)
            .field("drain_timeout", &self.drain_timeout)
            .finish_non_exhaustive()
    }
}
