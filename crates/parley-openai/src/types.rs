// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat Completions wire types and conversions to and from core messages.

use std::str::FromStr;

use parley_core::{Message, ParleyError, Role, ToolCall, ToolDefinition};
use serde::{Deserialize, Serialize};

// --- Request types ---

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ApiTool>>,
}

/// A message in either direction. `content` is always serialized, as `null`
/// on tool-calling assistant turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: ApiFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFunctionCall {
    pub name: String,
    /// JSON-encoded argument object, passed through untouched.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ApiFunction,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

fn function_type() -> String {
    "function".to_string()
}

// --- Response types ---

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ApiMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

// --- Conversions ---

impl From<&Message> for ApiMessage {
    fn from(message: &Message) -> Self {
        let tool_calls = (!message.tool_calls.is_empty()).then(|| {
            message
                .tool_calls
                .iter()
                .map(|call| ApiToolCall {
                    id: call.id.clone(),
                    call_type: function_type(),
                    function: ApiFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect()
        });

        Self {
            role: message.role.to_string(),
            content: message.content.clone(),
            tool_call_id: message.tool_call_id.clone(),
            tool_calls,
        }
    }
}

impl TryFrom<ApiMessage> for Message {
    type Error = ParleyError;

    fn try_from(api: ApiMessage) -> Result<Self, Self::Error> {
        let role = Role::from_str(&api.role)
            .map_err(|_| ParleyError::backend(format!("unrecognized role `{}`", api.role)))?;

        Ok(Message {
            role,
            content: api.content,
            tool_call_id: api.tool_call_id,
            tool_calls: api
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|c| ToolCall::new(c.id, c.function.name, c.function.arguments))
                .collect(),
        })
    }
}

impl From<&ToolDefinition> for ApiTool {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            tool_type: function_type(),
            function: ApiFunction {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.parameters.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tool_calling_turn_serializes_with_null_content() {
        let msg = Message::assistant_tool_calls(
            None,
            vec![ToolCall::new("call_1", "sum", r#"{"a":2,"b":3}"#)],
        );
        let json = serde_json::to_value(ApiMessage::from(&msg)).unwrap();
        assert_eq!(
            json,
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "sum", "arguments": "{\"a\":2,\"b\":3}"}
                }]
            })
        );
    }

    #[test]
    fn tool_result_carries_call_id() {
        let json = serde_json::to_value(ApiMessage::from(&Message::tool_result("call_1", "5")))
            .unwrap();
        assert_eq!(
            json,
            json!({"role": "tool", "content": "5", "tool_call_id": "call_1"})
        );
    }

    #[test]
    fn response_message_maps_back() {
        let api: ApiMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_9",
                "type": "function",
                "function": {"name": "current_time", "arguments": ""}
            }]
        }))
        .unwrap();

        let msg = Message::try_from(api).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.tool_calls, vec![ToolCall::new("call_9", "current_time", "")]);
    }

    #[test]
    fn unknown_role_is_a_backend_error() {
        let api: ApiMessage =
            serde_json::from_value(json!({"role": "developer", "content": "x"})).unwrap();
        assert!(matches!(
            Message::try_from(api),
            Err(ParleyError::Backend { .. })
        ));
    }
}
