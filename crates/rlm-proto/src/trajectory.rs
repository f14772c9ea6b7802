//! Trajectory record types for the JSONL log format.
//!
//! A trajectory log is a newline-delimited JSON file recording one
//! orchestration run: a single metadata record describing the run,
//! followed by one record per loop iteration. Records use internal
//! tagging on `type` to distinguish the two shapes while keeping a
//! flat structure for easy parsing.

use serde::{Deserialize, Serialize};

/// A single line in a trajectory log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TrajectoryRecord {
    /// Run-level metadata, written once at session start.
    Metadata(RunMetadata),
    /// Per-iteration record, written once per loop iteration.
    Iteration(IterationRecord),
}

impl TrajectoryRecord {
    /// Returns the `type` discriminator string for this record.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Metadata(_) => "metadata",
            Self::Iteration(_) => "iteration",
        }
    }
}

/// Metadata describing one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Model name used for root completions.
    pub root_model: String,

    /// Backend identifier (e.g., "openai").
    pub backend: String,

    /// Environment the session executed in (e.g., "local").
    pub environment_type: String,

    /// Depth ceiling for nested subqueries.
    pub max_depth: u32,

    /// Iteration ceiling for the completion loop.
    pub max_iterations: u32,

    /// RFC 3339 timestamp of session start.
    pub started_at: String,
}

/// One iteration of the completion loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Iteration number, 1-indexed.
    pub iteration: u32,

    /// Raw payloads of the directives executed this iteration.
    #[serde(default)]
    pub code_blocks: Vec<String>,

    /// The final answer, when this iteration produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
}

impl IterationRecord {
    /// Creates an iteration record.
    pub fn new(iteration: u32, code_blocks: Vec<String>, final_answer: Option<String>) -> Self {
        Self {
            iteration,
            code_blocks,
            final_answer,
        }
    }

    /// Returns true if this iteration produced a final answer.
    pub fn is_final(&self) -> bool {
        self.final_answer.is_some()
    }
}
