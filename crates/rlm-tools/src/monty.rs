//! Monty runtime placeholder.

use async_trait::async_trait;
use rlm_core::{Tool, ToolError};

const PLACEHOLDER_REPLY: &str =
    "Monty execution is not wired up in this build; use the shell tool instead.";

/// Placeholder for Monty runtime execution.
///
/// Reports that the runtime is unimplemented rather than executing
/// anything. Registered only when the Monty flag is set.
#[derive(Debug, Default)]
pub struct MontyTool;

impl MontyTool {
    /// Creates the placeholder tool.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for MontyTool {
    fn name(&self) -> &str {
        "run_monty"
    }

    fn description(&self) -> &str {
        "Placeholder for Monty runtime execution."
    }

    async fn invoke(&self, _input: &str) -> Result<String, ToolError> {
        Ok(PLACEHOLDER_REPLY.to_string())
    }
}
