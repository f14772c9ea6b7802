//! # rlm-tools
//!
//! Built-in tools for RLM harness sessions: shell execution, ripgrep
//! search, file reading, and the Monty runtime placeholder.

mod monty;
mod read_file;
mod search;
mod shell;

pub use monty::MontyTool;
pub use read_file::ReadFileTool;
pub use search::SearchTool;
pub use shell::ShellTool;

use rlm_core::ToolRegistry;

/// Builds the default tool registry.
///
/// Registers `shell`, `search`, and `read_file`; `run_monty` is added only
/// when `use_monty` is set.
pub fn builtin_registry(use_monty: bool) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(ShellTool::new());
    registry.register(SearchTool::new());
    registry.register(ReadFileTool::new());
    if use_monty {
        registry.register(MontyTool::new());
    }
    registry
}
