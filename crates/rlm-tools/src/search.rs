//! Ripgrep search tool.
//!
//! Input format: the pattern on the first line, an optional search path on
//! the second (defaults to `.`). Arguments are passed directly to the
//! `rg` process, never through a shell.

use async_trait::async_trait;
use rlm_core::{Tool, ToolError};
use tokio::process::Command;

use crate::shell::run_command;

/// Searches files with ripgrep.
#[derive(Debug, Default)]
pub struct SearchTool;

impl SearchTool {
    /// Creates the search tool.
    pub fn new() -> Self {
        Self
    }
}

/// Splits the directive payload into pattern and path.
fn parse_input(input: &str) -> Result<(&str, &str), ToolError> {
    let mut lines = input.lines();
    let pattern = lines.next().map(str::trim).unwrap_or("");
    if pattern.is_empty() {
        return Err(ToolError::Invalid("search requires a pattern".to_string()));
    }

    let path = lines.next().map(str::trim).filter(|p| !p.is_empty()).unwrap_or(".");
    Ok((pattern, path))
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search files quickly with ripgrep (pattern on the first line, optional path on the second)."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let (pattern, path) = parse_input(input)?;

        let mut command = Command::new("rg");
        command
            .arg("--line-number")
            .arg("--hidden")
            .arg("--glob")
            .arg("!.git")
            .arg(pattern)
            .arg(path);

        let display = format!("rg --line-number --hidden --glob '!.git' {pattern} {path}");
        let outcome = run_command(display, command).await?;
        Ok(outcome.render())
    }
}
