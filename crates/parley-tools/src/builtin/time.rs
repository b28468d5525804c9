// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in `current_time` tool.

use std::fmt::Write;

use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use chrono::{SecondsFormat, Utc};
use parley_core::ParleyError;
use serde_json::Value;

use crate::Tool;

const NAME: &str = "current_time";

/// Reports the current UTC time, RFC 3339 unless a strftime `format` is given.
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Returns the current UTC date and time. Pass `format` (strftime syntax) to \
         control the output; defaults to RFC 3339."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "description": "strftime format string, e.g. \"%Y-%m-%d\""
                }
            }
        })
    }

    async fn invoke(&self, args: Value, _context: &Value) -> Result<String, ParleyError> {
        let now = Utc::now();
        let Some(format) = args.get("format").and_then(Value::as_str) else {
            return Ok(now.to_rfc3339_opts(SecondsFormat::Secs, true));
        };

        let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(ParleyError::Tool {
                name: NAME.to_string(),
                message: format!("invalid format string `{format}`"),
            });
        }

        let mut out = String::new();
        write!(out, "{}", now.format_with_items(items.into_iter())).map_err(|e| {
            ParleyError::Tool {
                name: NAME.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(out)
    }
}
