// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait and name-indexed registry.
//!
//! A [`Tool`] receives the JSON arguments the model produced plus the per-run
//! context payload the caller passed to the dispatcher. The [`ToolRegistry`]
//! resolves tools by name and builds the catalog sent to the backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parley_core::{ParleyError, ToolDefinition};
use serde_json::Value;

/// A callable capability the model can request by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used for lookup and advertised to the backend.
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing the argument object.
    fn parameters_schema(&self) -> Value;

    /// Runs the tool. `context` is the caller's per-run payload, forwarded verbatim.
    async fn invoke(&self, args: Value, context: &Value) -> Result<String, ParleyError>;
}

type ToolFn = dyn Fn(Value, &Value) -> Result<String, ParleyError> + Send + Sync;

/// A tool backed by a synchronous closure.
pub struct FnTool {
    name: String,
    description: String,
    schema: Value,
    func: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Value,
        func: F,
    ) -> Self
    where
        F: Fn(Value, &Value) -> Result<String, ParleyError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish()
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn invoke(&self, args: Value, context: &Value) -> Result<String, ParleyError> {
        (self.func)(args, context)
    }
}

/// Registry of available tools, indexed by name.
///
/// Registering a second tool under an existing name replaces the first.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its `name()`.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        tracing::debug!(tool = tool.name(), "registering tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Registers a closure-backed tool.
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: Value,
        func: F,
    ) where
        F: Fn(Value, &Value) -> Result<String, ParleyError> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnTool::new(name, description, schema, func)));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Returns (name, description) pairs sorted by name.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    /// The catalog advertised to the backend, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.list().iter().map(|(name, _)| name))
            .finish()
    }
}
