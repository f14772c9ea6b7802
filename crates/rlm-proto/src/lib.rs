//! # rlm-proto
//!
//! Shared types for the RLM smoke harness.
//!
//! This crate provides the foundational types used across all harness crates,
//! including:
//! - Chat message types for the completions API
//! - Trajectory record types for the JSONL log format

mod message;
mod trajectory;

pub use message::ChatMessage;
pub use trajectory::{IterationRecord, RunMetadata, TrajectoryRecord};
