//! Shell command tool.
//!
//! Runs the directive payload as `sh -c <input>`, blocking until exit and
//! capturing stdout/stderr in full. The result is rendered back to the
//! model as a JSON object so exit status and both streams stay visible.

use async_trait::async_trait;
use rlm_core::{Tool, ToolError};
use serde::Serialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a subprocess run.
#[derive(Debug, Serialize)]
pub(crate) struct CommandOutcome {
    pub command: String,
    pub returncode: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    /// Renders the outcome as pretty JSON for the model.
    pub(crate) fn render(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.stdout.clone())
    }
}

/// Spawns a command with piped stdio and waits for it to finish.
pub(crate) async fn run_command(
    display: String,
    mut command: Command,
) -> Result<CommandOutcome, ToolError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(command = %display, "Spawning command");
    let output = command.output().await?;

    Ok(CommandOutcome {
        command: display,
        returncode: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs shell commands on behalf of the model.
#[derive(Debug, Default)]
pub struct ShellTool;

impl ShellTool {
    /// Creates the shell tool.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Run shell commands and inspect stdout/stderr."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let cmdline = input.trim();
        if cmdline.is_empty() {
            return Err(ToolError::Invalid("shell requires a command".to_string()));
        }

        let mut command = Command::new("sh");
        command.arg("-c").arg(cmdline);

        let outcome = run_command(cmdline.to_string(), command).await?;
        Ok(outcome.render())
    }
}
