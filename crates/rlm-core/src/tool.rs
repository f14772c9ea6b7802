//! Tool trait and registry.
//!
//! Tools are the side-effecting operations a session can invoke on behalf
//! of the model. The registry maps directive names to implementations;
//! built-in tools live in the `rlm-tools` crate.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Errors from tool invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// An underlying I/O operation failed (spawn, read, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool rejected its input.
    #[error("{0}")]
    Invalid(String),
}

/// A named operation invocable from a session.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The directive name this tool answers to.
    fn name(&self) -> &str;

    /// One-line description shown to the model.
    fn description(&self) -> &str;

    /// Runs the tool against the directive payload.
    async fn invoke(&self, input: &str) -> Result<String, ToolError>;
}

/// Registry of tools available to a session, keyed by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its own name, replacing any previous entry.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Returns the registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Renders the tool list for inclusion in a system prompt.
    pub fn describe(&self) -> String {
        let mut lines: Vec<String> = self
            .tools
            .values()
            .map(|tool| format!("- {}: {}", tool.name(), tool.description()))
            .collect();
        lines.sort_unstable();
        lines.join("\n")
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
