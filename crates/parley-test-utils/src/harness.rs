// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end harness: a dispatcher wired to a [`MockBackend`] and either a
//! temp-file SQLite store or a [`MemoryStore`].

use std::sync::Arc;
use std::time::Duration;

use parley_agent::{ClaimSet, Orchestrator, UserDispatcher};
use parley_config::model::StorageConfig;
use parley_core::{Message, MessageStore, ParleyError};
use parley_storage::SqliteStore;
use parley_tools::ToolRegistry;
use serde_json::Value;

use crate::memory_store::MemoryStore;
use crate::mock_backend::MockBackend;

type InstructionFn = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    replies: Vec<Message>,
    tools: ToolRegistry,
    instructions: String,
    additional_instructions: Option<InstructionFn>,
    max_turns: Option<usize>,
    drain_timeout: Option<Duration>,
    backend_delay: Option<Duration>,
    memory_store: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            tools: ToolRegistry::new(),
            instructions: "You are a test assistant.".to_string(),
            additional_instructions: None,
            max_turns: None,
            drain_timeout: None,
            backend_delay: None,
            memory_store: false,
        }
    }

    pub fn with_replies(mut self, replies: Vec<Message>) -> Self {
        self.replies = replies;
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_additional_instructions<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.additional_instructions = Some(Box::new(f));
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = Some(timeout);
        self
    }

    /// Makes every backend call take at least `delay`.
    pub fn with_backend_delay(mut self, delay: Duration) -> Self {
        self.backend_delay = Some(delay);
        self
    }

    /// Uses a [`MemoryStore`] instead of a temp SQLite file.
    pub fn with_memory_store(mut self) -> Self {
        self.memory_store = true;
        self
    }

    pub async fn build(self) -> Result<TestHarness, ParleyError> {
        let mut backend = MockBackend::with_replies(self.replies);
        if let Some(delay) = self.backend_delay {
            backend = backend.with_delay(delay);
        }
        let backend = Arc::new(backend);

        let mut memory = None;
        let mut temp_dir = None;
        let store: Arc<dyn MessageStore> = if self.memory_store {
            let store = Arc::new(MemoryStore::new());
            memory = Some(Arc::clone(&store));
            store
        } else {
            let dir = tempfile::TempDir::new().map_err(ParleyError::storage)?;
            let config = StorageConfig {
                database_path: dir.path().join("test.db").display().to_string(),
                wal_mode: true,
            };
            temp_dir = Some(dir);
            Arc::new(SqliteStore::open(config).await?)
        };

        let mut orchestrator = Orchestrator::builder(backend.clone())
            .instructions(self.instructions)
            .tools(self.tools);
        if let Some(f) = self.additional_instructions {
            orchestrator = orchestrator.additional_instructions(f);
        }
        if let Some(max_turns) = self.max_turns {
            orchestrator = orchestrator.max_turns(max_turns);
        }

        let claims = ClaimSet::new();
        let dispatcher = UserDispatcher::new(
            store.clone(),
            Arc::new(orchestrator.build()),
            claims.clone(),
        )
        .with_drain_timeout(self.drain_timeout);

        Ok(TestHarness {
            backend,
            store,
            memory,
            claims,
            dispatcher: Arc::new(dispatcher),
            _temp_dir: temp_dir,
        })
    }
}

/// A wired dispatcher with handles to every collaborator for assertions.
pub struct TestHarness {
    pub backend: Arc<MockBackend>,
    pub store: Arc<dyn MessageStore>,
    /// Set when built with [`TestHarnessBuilder::with_memory_store`].
    pub memory: Option<Arc<MemoryStore>>,
    pub claims: ClaimSet,
    pub dispatcher: Arc<UserDispatcher>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Submits `text` for `user_id` and drains if free, with null payloads.
    pub async fn send(&self, user_id: &str, text: &str) -> Result<Vec<Message>, ParleyError> {
        self.dispatcher
            .process(user_id, text, &Value::Null, &Value::Null)
            .await
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<Message>, ParleyError> {
        self.store.read_history(user_id).await
    }
}
