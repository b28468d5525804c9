// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime wiring shared by every subcommand, plus `send` and `history`.

use std::sync::Arc;
use std::time::Duration;

use parley_agent::shutdown::{install_signal_handler, run_until_cancelled};
use parley_agent::{ClaimSet, Orchestrator, UserDispatcher};
use parley_config::ParleyConfig;
use parley_core::{CompletionBackend, Message, MessageStore, ParleyError};
use parley_openai::OpenAiBackend;
use parley_storage::SqliteStore;
use parley_tools::ToolRegistry;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::output;

/// The dispatcher every interactive subcommand talks to.
pub struct App {
    dispatcher: UserDispatcher,
}

impl App {
    /// Opens the SQLite store and the OpenAI backend named by `config`.
    pub async fn open(config: &ParleyConfig) -> Result<Self, ParleyError> {
        let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
        let backend = Arc::new(OpenAiBackend::new(&config.backend).inspect_err(|_| {
            eprintln!(
                "error: API key required. Set via: backend.api_key in config, \
                 PARLEY_BACKEND_API_KEY, or OPENAI_API_KEY"
            );
        })?);
        Ok(Self::from_parts(config, backend, store))
    }

    pub fn from_parts(
        config: &ParleyConfig,
        backend: Arc<dyn CompletionBackend>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        parley_tools::builtin::register_builtins(&mut tools);
        info!("tool registry initialized with {} built-in tools", tools.len());

        let orchestrator = Orchestrator::builder(backend)
            .instructions(parley_config::resolve_system_prompt(config))
            .tools(tools)
            .max_turns(config.orchestrator.max_turns)
            .build();

        let dispatcher = UserDispatcher::new(store, Arc::new(orchestrator), ClaimSet::new())
            .with_drain_timeout(config.dispatcher.drain_timeout_secs.map(Duration::from_secs));

        Self { dispatcher }
    }

    /// Submits `text` for `user_id` and drains the user.
    pub async fn process(&self, user_id: &str, text: &str) -> Result<Vec<Message>, ParleyError> {
        let context = json!({ "user_id": user_id });
        self.dispatcher
            .process(user_id, text, &context, &Value::Null)
            .await
    }
}

/// Runs `parley send`: one message, replies on stdout.
///
/// Ctrl+C abandons the drain. The message stays stored and is answered by the
/// next session for the same user.
pub async fn run_send(config: ParleyConfig, user_id: &str, text: &str) -> Result<(), ParleyError> {
    let app = App::open(&config).await?;
    let cancel = install_signal_handler();

    match run_until_cancelled(&cancel, app.process(user_id, text)).await {
        Some(result) => {
            for line in output::visible_replies(&result?) {
                println!("{line}");
            }
            Ok(())
        }
        None => {
            warn!(user_id, "send interrupted, message left for the next session");
            Ok(())
        }
    }
}

/// Runs `parley history`: the stored conversation for `user_id`.
pub async fn run_history(config: ParleyConfig, user_id: &str) -> Result<(), ParleyError> {
    let store = SqliteStore::open(config.storage.clone()).await?;
    let history = store.read_history(user_id).await?;
    let pending = store.pending(user_id).await?;

    for message in &history {
        println!("{}", output::history_line(message));
    }
    if !pending.is_empty() {
        println!("{}", output::pending_note(pending.len()));
    }
    store.close().await
}
