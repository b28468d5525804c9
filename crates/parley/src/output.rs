// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of messages.

use colored::Colorize;
use parley_core::{Message, Role};

/// Text of the turns a person should see, in order.
pub fn visible_replies(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.is_user_visible())
        .filter_map(|m| m.content.clone())
        .collect()
}

/// One history row: a colored role tag followed by the turn's text.
///
/// Tool-call turns list the requested tools. Tool results show the call id
/// they answer.
pub fn history_line(message: &Message) -> String {
    let tag = match message.role {
        Role::System => "system".dimmed(),
        Role::User => "user".cyan().bold(),
        Role::Assistant => "assistant".green().bold(),
        Role::Tool => "tool".yellow(),
    };

    let mut body = message.content.clone().unwrap_or_default();
    if message.has_tool_calls() {
        let calls: Vec<String> = message
            .tool_calls
            .iter()
            .map(|c| format!("{}({})", c.name, c.arguments))
            .collect();
        let calls = format!("[calls: {}]", calls.join(", ")).dimmed().to_string();
        body = if body.is_empty() { calls } else { format!("{body} {calls}") };
    }
    if let Some(id) = &message.tool_call_id {
        body = format!("{} {body}", format!("[{id}]").dimmed());
    }

    format!("{tag}: {body}")
}

pub fn pending_note(count: usize) -> String {
    format!("({count} message(s) still pending)").dimmed().to_string()
}

#[cfg(test)]
mod tests {
    use parley_core::ToolCall;

    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn only_assistant_text_is_visible() {
        let messages = vec![
            Message::assistant_tool_calls(None, vec![ToolCall::new("c1", "sum", "{}")]),
            Message::tool_result("c1", "5"),
            Message::assistant("5"),
        ];
        assert_eq!(visible_replies(&messages), vec!["5".to_string()]);
    }

    #[test]
    fn history_lines_tag_roles_and_calls() {
        plain();
        assert_eq!(history_line(&Message::user("hi")), "user: hi");
        assert_eq!(history_line(&Message::tool_result("c1", "5")), "tool: [c1] 5");
        let call = Message::assistant_tool_calls(
            Some("checking".to_string()),
            vec![ToolCall::new("c1", "sum", r#"{"a":1}"#)],
        );
        assert_eq!(
            history_line(&call),
            r#"assistant: checking [calls: sum({"a":1})]"#
        );
    }
}
