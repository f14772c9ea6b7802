//! # rlm-core
//!
//! Core functionality for the RLM smoke harness.
//!
//! This crate provides:
//! - Environment-driven configuration and API key resolution
//! - The chat-completion HTTP client
//! - The orchestration session (completion loop with tool directives)
//! - Trajectory logging and reading (JSONL)

mod client;
mod config;
mod directive;
mod session;
mod tool;
mod trajectory;

pub mod testing;

pub use client::{ChatClient, ClientError, CompletionBackend};
pub use config::{
    ConfigError, RlmConfig, DEFAULT_BASE_URL, DEFAULT_LOG_DIR, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
pub use directive::{Directive, DirectiveParser};
pub use session::{
    Completion, Session, SessionError, SessionLimits, SessionState, StopReason, SUBQUERY_TOOL,
};
pub use tool::{Tool, ToolError, ToolRegistry};
pub use trajectory::{TrajectoryLogger, TrajectoryReader};
