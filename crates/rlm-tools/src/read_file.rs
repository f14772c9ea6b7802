//! File reading tool.

use async_trait::async_trait;
use rlm_core::{Tool, ToolError};

/// Reads UTF-8 files from disk.
#[derive(Debug, Default)]
pub struct ReadFileTool;

impl ReadFileTool {
    /// Creates the read tool.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read UTF-8 files from disk."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let path = input.trim();
        if path.is_empty() {
            return Err(ToolError::Invalid("read_file requires a path".to_string()));
        }

        Ok(tokio::fs::read_to_string(path).await?)
    }
}
