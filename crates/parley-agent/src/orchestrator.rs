// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool-calling conversation loop.
//!
//! One [`Orchestrator::run`] takes a stored conversation, prepends the system
//! instructions, and alternates between the completion backend and the tool
//! registry until the backend returns a turn without tool calls. Everything
//! the loop produces (assistant turns and tool results) is returned in
//! production order so the caller can persist it.

use std::fmt;
use std::sync::Arc;

use parley_core::{CompletionBackend, Message, ParleyError, Role, ToolCall};
use parley_tools::ToolRegistry;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Produces the per-pass additional system instruction from the caller's
/// instruction arguments. An empty string means "no extra instruction".
pub type InstructionFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Default bound on backend calls within one run.
pub const DEFAULT_MAX_TURNS: usize = 25;

/// Runs conversations against a completion backend with tool resolution.
pub struct Orchestrator {
    backend: Arc<dyn CompletionBackend>,
    instructions: String,
    additional_instructions: InstructionFn,
    tools: ToolRegistry,
    max_turns: usize,
}

impl Orchestrator {
    pub fn builder(backend: Arc<dyn CompletionBackend>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            backend,
            instructions: String::new(),
            additional_instructions: Arc::new(|_| String::new()),
            tools: ToolRegistry::new(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Runs `conversation` to completion and returns the produced turns.
    ///
    /// `tool_args` is forwarded to every tool invocation; `instruction_args`
    /// feeds the additional-instruction function on each pass. Fails without
    /// another backend call on an unknown tool, malformed tool arguments, a
    /// tool error, or once `max_turns` backend calls have been made.
    pub async fn run(
        &self,
        conversation: Vec<Message>,
        tool_args: &Value,
        instruction_args: &Value,
    ) -> Result<Vec<Message>, ParleyError> {
        let catalog = self.tools.definitions();

        let mut working = Vec::with_capacity(conversation.len() + 2);
        working.push(Message::system(self.instructions.clone()));
        working.extend(conversation);

        let mut output = Vec::new();
        let mut extra_at: Option<usize> = None;

        for turn in 1..=self.max_turns {
            if let Some(index) = extra_at.take() {
                working.remove(index);
            }
            let extra = (self.additional_instructions)(instruction_args);
            if !extra.is_empty() {
                let index = extra_instruction_index(&working);
                working.insert(index, Message::system(extra));
                extra_at = Some(index);
            }

            debug!(
                turn,
                messages = working.len(),
                tools = catalog.len(),
                "calling completion backend"
            );
            let reply = self
                .backend
                .complete(&working, &catalog)
                .await?
                .ok_or_else(|| ParleyError::backend("no message"))?;
            if reply.role != Role::Assistant {
                return Err(ParleyError::backend(format!(
                    "expected an assistant turn, got role {}",
                    reply.role
                )));
            }

            let calls = reply.tool_calls.clone();
            working.push(reply.clone());
            output.push(reply);

            if calls.is_empty() {
                info!(turns = turn, produced = output.len(), "conversation complete");
                return Ok(output);
            }

            for call in &calls {
                let result = self.invoke_tool(call, tool_args).await?;
                let message = Message::tool_result(call.id.clone(), result);
                working.push(message.clone());
                output.push(message);
            }
        }

        warn!(limit = self.max_turns, "conversation hit the turn limit");
        Err(ParleyError::MaxTurnsExceeded {
            limit: self.max_turns,
        })
    }

    async fn invoke_tool(&self, call: &ToolCall, tool_args: &Value) -> Result<String, ParleyError> {
        let args = parse_arguments(call)?;
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ParleyError::UnknownTool {
                name: call.name.clone(),
            })?;

        debug!(tool = %call.name, call_id = %call.id, "invoking tool");
        tool.invoke(args, tool_args).await.inspect_err(|e| {
            warn!(tool = %call.name, error = %e, "tool failed");
        })
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("tools", &self.tools)
            .field("max_turns", &self.max_turns)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    backend: Arc<dyn CompletionBackend>,
    instructions: String,
    additional_instructions: InstructionFn,
    tools: ToolRegistry,
    max_turns: usize,
}

impl OrchestratorBuilder {
    /// The system instruction placed first in every backend request.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn additional_instructions<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.additional_instructions = Arc::new(f);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Caps backend calls per run. Values below 1 are raised to 1.
    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            backend: self.backend,
            instructions: self.instructions,
            additional_instructions: self.additional_instructions,
            tools: self.tools,
            max_turns: self.max_turns,
        }
    }
}

/// Index just before the most recent non-tool message, or 0 when every
/// message is a tool result.
fn extra_instruction_index(working: &[Message]) -> usize {
    working
        .iter()
        .rposition(|m| m.role != Role::Tool)
        .unwrap_or(0)
}

/// An empty payload means "no arguments".
fn parse_arguments(call: &ToolCall) -> Result<Value, ParleyError> {
    if call.arguments.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(&call.arguments).map_err(|source| ParleyError::ToolArguments {
        tool: call.name.clone(),
        source,
    })
}
