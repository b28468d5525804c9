// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted completion backend for deterministic tests.
//!
//! Replies are popped from a FIFO queue. When the queue is empty the backend
//! answers `assistant("mock response")`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parley_core::{CompletionBackend, Message, ParleyError, ToolDefinition};
use tokio::sync::Mutex;

enum Scripted {
    Reply(Message),
    Empty,
    Fail(String),
}

/// One recorded `complete` call.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub conversation: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

pub struct MockBackend {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CapturedRequest>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// A backend pre-loaded with `replies`, returned in order.
    pub fn with_replies(replies: Vec<Message>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().map(Scripted::Reply).collect()),
            ..Self::new()
        }
    }

    /// Sleeps for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_reply(&self, reply: Message) {
        self.script.lock().await.push_back(Scripted::Reply(reply));
    }

    /// Queues a call that answers with no message.
    pub async fn push_empty(&self) {
        self.script.lock().await.push_back(Scripted::Empty);
    }

    /// Queues a call that fails with a backend error.
    pub async fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Fail(message.into()));
    }

    /// Number of `complete` calls so far, counted on entry.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in call order.
    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(
        &self,
        conversation: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Option<Message>, ParleyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(CapturedRequest {
            conversation: conversation.to_vec(),
            tools: tools.to_vec(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.script.lock().await.pop_front() {
            Some(Scripted::Reply(message)) => Ok(Some(message)),
            Some(Scripted::Empty) => Ok(None),
            Some(Scripted::Fail(message)) => Err(ParleyError::backend(message)),
            None => Ok(Some(Message::assistant("mock response"))),
        }
    }
}
