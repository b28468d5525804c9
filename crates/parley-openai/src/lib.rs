// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible completion backend.
//!
//! Implements [`CompletionBackend`] over the Chat Completions API. Any
//! service speaking that protocol works by pointing `backend.base_url` at it.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::BackendConfig;
use parley_core::{CompletionBackend, Message, ParleyError, ToolDefinition};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ApiMessage, ApiTool, ChatRequest};

/// Chat Completions backend.
///
/// API key resolution order: `backend.api_key` -> `OPENAI_API_KEY` -> error.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: OpenAiClient,
    model: String,
}

impl OpenAiBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ParleyError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = OpenAiClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(model = %config.model, endpoint = client.endpoint(), "OpenAI backend initialized");
        Ok(Self::with_client(client, config.model.clone()))
    }

    pub fn with_client(client: OpenAiClient, model: String) -> Self {
        Self { client, model }
    }

    fn to_request(&self, conversation: &[Message], tools: &[ToolDefinition]) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: conversation.iter().map(ApiMessage::from).collect(),
            tools: (!tools.is_empty()).then(|| tools.iter().map(ApiTool::from).collect()),
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        conversation: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Option<Message>, ParleyError> {
        let request = self.to_request(conversation, tools);
        let response = self.client.chat(&request).await?;

        let Some(choice) = response.choices.into_iter().next() else {
            debug!("completion returned no choices");
            return Ok(None);
        };
        debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("none"),
            tool_calls = choice.message.tool_calls.as_ref().map_or(0, Vec::len),
            "completion choice received"
        );
        Message::try_from(choice.message).map(Some)
    }
}

fn resolve_api_key(config_key: Option<&str>) -> Result<String, ParleyError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var("OPENAI_API_KEY").map_err(|_| {
        ParleyError::Config(
            "API key not found. Set backend.api_key in config or the OPENAI_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_key_wins() {
        assert_eq!(resolve_api_key(Some("sk-1")).unwrap(), "sk-1");
    }

    #[test]
    fn empty_config_key_falls_back_to_env() {
        // Passes with or without OPENAI_API_KEY in the environment.
        match resolve_api_key(Some("")) {
            Ok(key) => assert!(!key.is_empty()),
            Err(e) => assert!(e.to_string().contains("API key not found")),
        }
    }

    #[test]
    fn tools_are_omitted_when_catalog_is_empty() {
        let client =
            OpenAiClient::new("k", "http://localhost", Duration::from_secs(1)).unwrap();
        let backend = OpenAiBackend::with_client(client, "m".into());
        let request = backend.to_request(&[Message::user("hi")], &[]);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
        assert_eq!(json["model"], "m");
    }
}
