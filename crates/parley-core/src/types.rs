// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation types shared by the dispatcher, the store, and the backend.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Author of a conversational turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Backend-assigned id, echoed back on the matching tool result.
    pub id: String,
    /// Name of the tool to resolve in the registry.
    pub name: String,
    /// Raw JSON argument payload, parsed only by the invoked tool.
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// A single conversational turn.
///
/// Messages are immutable once built. `content` is `None` only for assistant
/// turns that carry tool calls instead of text. The serde form is what the
/// message store persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// An assistant turn requesting tool execution, optionally with text.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_call_id: None,
            tool_calls,
        }
    }

    /// The result of one tool invocation, correlated by `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// True for assistant turns with text a person should see.
    pub fn is_user_visible(&self) -> bool {
        self.role == Role::Assistant && self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// A tool descriptor advertised to the completion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's argument object.
    pub parameters: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn role_display_and_parse_are_lowercase() {
        for role in [Role::System, Role::User, Role::Assistant, Role::Tool] {
            let s = role.to_string();
            assert_eq!(s, s.to_lowercase());
            assert_eq!(Role::from_str(&s).unwrap(), role);
        }
        assert!(Role::from_str("function").is_err());
    }

    #[test]
    fn unknown_role_is_rejected_by_serde() {
        let err = serde_json::from_str::<Message>(r#"{"role":"developer","content":"x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn user_message_serializes_without_tool_fields() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn tool_call_turn_keeps_null_content() {
        let msg = Message::assistant_tool_calls(
            None,
            vec![ToolCall::new("call_1", "sum", r#"{"a":2,"b":3}"#)],
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json["content"].is_null());
        assert_eq!(json["tool_calls"][0]["name"], "sum");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
        assert!(back.has_tool_calls());
    }

    #[test]
    fn tool_result_carries_call_id() {
        let msg = Message::tool_result("call_1", "5");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.content.as_deref(), Some("5"));
    }

    #[test]
    fn only_assistant_text_is_user_visible() {
        assert!(Message::assistant("hello").is_user_visible());
        assert!(!Message::assistant("").is_user_visible());
        assert!(!Message::user("hello").is_user_visible());
        assert!(!Message::tool_result("c", "5").is_user_visible());
        assert!(
            !Message::assistant_tool_calls(None, vec![ToolCall::new("c", "t", "{}")])
                .is_user_visible()
        );
    }
}
