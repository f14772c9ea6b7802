//! Orchestration session loop.
//!
//! The session drives iterative tool-augmented completions: each iteration
//! requests one completion, executes any tool directives it contains, and
//! feeds the results back until the model emits a final answer or a ceiling
//! is hit. Every iteration is recorded to the trajectory log via observers.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use rlm_proto::{ChatMessage, IterationRecord, RunMetadata, TrajectoryRecord};
use tracing::{debug, info, warn};

use crate::client::{ClientError, CompletionBackend};
use crate::directive::{Directive, DirectiveParser};
use crate::tool::ToolRegistry;

/// Name of the built-in directive that runs a nested session.
pub const SUBQUERY_TOOL: &str = "subquery";

const SUBQUERY_ROOT_PROMPT: &str =
    "Answer the delegated question. Use the tools when they help, then emit the final answer tag.";

/// Reason the session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model emitted a `<final>` directive.
    FinalAnswer,
    /// Iteration ceiling reached without a final answer.
    MaxIterations,
    /// The reply contained no directive; its text was taken as the answer.
    NoDirective,
}

impl StopReason {
    /// Returns the reason string used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::FinalAnswer => "final_answer",
            StopReason::MaxIterations => "max_iterations",
            StopReason::NoDirective => "no_directive",
        }
    }
}

/// Errors that abort a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A completion request failed; tool failures are fed back to the
    /// model instead of raising.
    #[error("completion request failed: {0}")]
    Completion(#[from] ClientError),
}

/// Final result of a session run.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The answer produced by the session.
    pub response: String,
    /// Why the session stopped.
    pub stop_reason: StopReason,
    /// Number of iterations executed.
    pub iterations: u32,
}

/// Ceilings for a session, taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    /// Depth ceiling for nested subqueries.
    pub max_depth: u32,
    /// Iteration ceiling for the completion loop.
    pub max_iterations: u32,
    /// Token cap passed with each completion request.
    pub max_tokens: u32,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_depth: crate::config::DEFAULT_MAX_DEPTH,
            max_iterations: crate::config::DEFAULT_MAX_ITERATIONS,
            max_tokens: crate::config::DEFAULT_MAX_TOKENS,
        }
    }
}

/// Current state of the session loop.
#[derive(Debug)]
pub struct SessionState {
    /// Current iteration number (1-indexed; 0 before the first request).
    pub iteration: u32,
    /// When the session started.
    pub started_at: Instant,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            iteration: 0,
            started_at: Instant::now(),
        }
    }
}

impl SessionState {
    /// Returns the elapsed time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

type Observer = Box<dyn Fn(&TrajectoryRecord) + Send + Sync>;

/// The orchestration session.
///
/// Borrows its backend and tool registries so one registry can serve
/// many sessions; observers receive every trajectory record as it is
/// produced.
pub struct Session<'a> {
    backend: &'a dyn CompletionBackend,
    tools: &'a ToolRegistry,
    sub_tools: &'a ToolRegistry,
    limits: SessionLimits,
    depth: u32,
    parser: DirectiveParser,
    state: SessionState,
    observers: Vec<Observer>,
}

impl<'a> Session<'a> {
    /// Creates a session at root depth.
    ///
    /// `sub_tools` is the registry handed to nested subquery sessions.
    pub fn new(
        backend: &'a dyn CompletionBackend,
        tools: &'a ToolRegistry,
        sub_tools: &'a ToolRegistry,
        limits: SessionLimits,
    ) -> Self {
        Self {
            backend,
            tools,
            sub_tools,
            limits,
            depth: 0,
            parser: DirectiveParser::new(),
            state: SessionState::default(),
            observers: Vec::new(),
        }
    }

    /// Adds an observer that receives every trajectory record.
    ///
    /// Multiple observers can be added (e.g., a file logger plus a test
    /// collector).
    pub fn add_observer<F>(&mut self, observer: F)
    where
        F: Fn(&TrajectoryRecord) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Returns the current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Runs the completion loop until a final answer or a ceiling.
    ///
    /// `context` is the user task; `root_prompt` frames how the model
    /// should approach it.
    pub async fn run(
        &mut self,
        context: &str,
        root_prompt: &str,
    ) -> Result<Completion, SessionError> {
        self.emit(&TrajectoryRecord::Metadata(self.metadata()));

        let mut transcript = vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(format!("{root_prompt}\n\nContext:\n{context}")),
        ];
        let mut last_reply = String::new();

        while self.state.iteration < self.limits.max_iterations {
            self.state.iteration += 1;
            let iteration = self.state.iteration;

            debug!(
                iteration,
                max = self.limits.max_iterations,
                depth = self.depth,
                "Requesting completion"
            );
            let reply = self
                .backend
                .complete(&transcript, self.limits.max_tokens)
                .await?;
            transcript.push(ChatMessage::assistant(reply.clone()));

            let directives = self.parser.parse(&reply);
            let had_directives = !directives.is_empty();

            let mut code_blocks = Vec::new();
            let mut final_answer = None;
            let mut feedback = String::new();

            if had_directives {
                for directive in directives {
                    match directive {
                        Directive::Final(answer) => {
                            final_answer = Some(answer);
                            break;
                        }
                        Directive::Tool { name, input } => {
                            code_blocks.push(input.clone());
                            let result = self.invoke_tool(&name, &input).await;
                            feedback.push_str(&format!(
                                "<tool_result name=\"{name}\">\n{result}\n</tool_result>\n"
                            ));
                        }
                    }
                }
            } else {
                // A reply with no directive at all is taken as the answer.
                final_answer = Some(reply.trim().to_string());
            }

            self.emit(&TrajectoryRecord::Iteration(IterationRecord::new(
                iteration,
                code_blocks,
                final_answer.clone(),
            )));

            if let Some(response) = final_answer {
                let stop_reason = if had_directives {
                    StopReason::FinalAnswer
                } else {
                    StopReason::NoDirective
                };
                debug!(iteration, stop = stop_reason.as_str(), "Session finished");
                return Ok(Completion {
                    response,
                    stop_reason,
                    iterations: iteration,
                });
            }

            transcript.push(ChatMessage::user(feedback));
            last_reply = reply;
        }

        warn!(
            iterations = self.state.iteration,
            "Iteration ceiling reached without a final answer"
        );
        Ok(Completion {
            response: last_reply,
            stop_reason: StopReason::MaxIterations,
            iterations: self.state.iteration,
        })
    }

    /// Invokes a directive by name, feeding failures back as text.
    async fn invoke_tool(&self, name: &str, input: &str) -> String {
        if name == SUBQUERY_TOOL {
            return self.run_subquery(input).await;
        }

        match self.tools.get(name) {
            Some(tool) => match tool.invoke(input).await {
                Ok(output) => output,
                Err(err) => {
                    warn!(tool = name, error = %err, "Tool invocation failed");
                    format!("tool '{name}' failed: {err}")
                }
            },
            None => format!(
                "unknown tool '{name}'; available tools: {}",
                self.tools.names().join(", ")
            ),
        }
    }

    /// Runs a nested session one level deeper, up to the depth ceiling.
    ///
    /// Returns a boxed, explicitly-`Send` future so the recursive call to
    /// [`Session::run`] has a concrete type boundary; this breaks the
    /// auto-trait inference cycle that would otherwise make the recursive
    /// future fail to prove `Send`.
    fn run_subquery<'s>(
        &'s self,
        prompt: &'s str,
    ) -> Pin<Box<dyn Future<Output = String> + Send + 's>> {
        Box::pin(async move {
            if !self.subqueries_allowed() {
                return "subquery depth limit reached; answer directly instead".to_string();
            }

            info!(depth = self.depth + 1, "Spawning subquery session");
            let mut child =
                Session::new(self.backend, self.sub_tools, self.sub_tools, self.limits);
            child.depth = self.depth + 1;

            match child.run(prompt, SUBQUERY_ROOT_PROMPT).await {
                Ok(completion) => completion.response,
                Err(err) => format!("subquery failed: {err}"),
            }
        })
    }

    fn subqueries_allowed(&self) -> bool {
        self.depth + 1 < self.limits.max_depth
    }

    fn metadata(&self) -> RunMetadata {
        RunMetadata {
            root_model: self.backend.model().to_string(),
            backend: self.backend.name().to_string(),
            environment_type: "local".to_string(),
            max_depth: self.limits.max_depth,
            max_iterations: self.limits.max_iterations,
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You are a reasoning model with access to tools. Invoke a tool by emitting \
             <tool name=\"NAME\">input</tool> on its own line, then wait for the result \
             before continuing.\n\nAvailable tools:\n",
        );
        prompt.push_str(&self.tools.describe());
        if self.subqueries_allowed() {
            prompt.push_str(
                "\n- subquery: Delegate a self-contained question to a nested session.",
            );
        }
        prompt.push_str("\n\nWhen you know the answer, emit <final>your answer</final>.");
        prompt
    }

    fn emit(&self, record: &TrajectoryRecord) {
        for observer in &self.observers {
            observer(record);
        }
    }
}
