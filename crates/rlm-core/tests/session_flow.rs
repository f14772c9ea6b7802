//! End-to-end session loop tests against the scripted backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rlm_core::testing::ScriptedBackend;
use rlm_core::{Session, SessionLimits, StopReason, Tool, ToolError, ToolRegistry};
use rlm_proto::{ChatMessage, TrajectoryRecord};

struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Repeats its input."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        Ok(input.to_string())
    }
}

struct FailTool;

#[async_trait]
impl Tool for FailTool {
    fn name(&self) -> &str {
        "fail"
    }

    fn description(&self) -> &str {
        "Always fails."
    }

    async fn invoke(&self, _input: &str) -> Result<String, ToolError> {
        Err(ToolError::Invalid("nope".to_string()))
    }
}

fn echo_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool);
    registry
}

fn limits() -> SessionLimits {
    SessionLimits {
        max_depth: 2,
        max_iterations: 8,
        max_tokens: 500,
    }
}

fn collector(
    session: &mut Session<'_>,
) -> Arc<Mutex<Vec<TrajectoryRecord>>> {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&records);
    session.add_observer(move |record| {
        sink.lock().unwrap().push(record.clone());
    });
    records
}

/// Last user message of a recorded conversation.
fn last_user_content(conversation: &[ChatMessage]) -> &str {
    conversation
        .iter()
        .rev()
        .find(|msg| msg.is_user())
        .map(|msg| msg.content())
        .unwrap_or("")
}

#[tokio::test]
async fn test_tool_then_final_answer() {
    let backend = ScriptedBackend::new([
        r#"Checking. <tool name="echo">hi</tool>"#,
        "<final>done</final>",
    ]);
    let tools = echo_registry();
    let mut session = Session::new(&backend, &tools, &tools, limits());
    let records = collector(&mut session);

    let completion = session.run("task", "Use the tools.").await.unwrap();

    assert_eq!(completion.response, "done");
    assert_eq!(completion.stop_reason, StopReason::FinalAnswer);
    assert_eq!(completion.iterations, 2);

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 3); // metadata + 2 iterations
    match &records[0] {
        TrajectoryRecord::Metadata(meta) => {
            assert_eq!(meta.backend, "scripted");
            assert_eq!(meta.root_model, "scripted-model");
            assert_eq!(meta.environment_type, "local");
            assert_eq!(meta.max_iterations, 8);
        }
        TrajectoryRecord::Iteration(_) => panic!("metadata must come first"),
    }
    match &records[1] {
        TrajectoryRecord::Iteration(rec) => {
            assert_eq!(rec.iteration, 1);
            assert_eq!(rec.code_blocks, vec!["hi".to_string()]);
            assert!(!rec.is_final());
        }
        TrajectoryRecord::Metadata(_) => panic!("expected iteration record"),
    }
    match &records[2] {
        TrajectoryRecord::Iteration(rec) => {
            assert_eq!(rec.iteration, 2);
            assert_eq!(rec.final_answer.as_deref(), Some("done"));
        }
        TrajectoryRecord::Metadata(_) => panic!("expected iteration record"),
    }
}

#[tokio::test]
async fn test_tool_result_fed_back() {
    let backend = ScriptedBackend::new([
        r#"<tool name="echo">ping</tool>"#,
        "<final>ok</final>",
    ]);
    let tools = echo_registry();
    let mut session = Session::new(&backend, &tools, &tools, limits());

    session.run("task", "Use the tools.").await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    let feedback = last_user_content(&requests[1]);
    assert!(feedback.contains(r#"<tool_result name="echo">"#));
    assert!(feedback.contains("ping"));
}

#[tokio::test]
async fn test_directive_free_reply_is_answer() {
    let backend = ScriptedBackend::new(["Just three."]);
    let tools = echo_registry();
    let mut session = Session::new(&backend, &tools, &tools, limits());
    let records = collector(&mut session);

    let completion = session.run("task", "Answer.").await.unwrap();

    assert_eq!(completion.response, "Just three.");
    assert_eq!(completion.stop_reason, StopReason::NoDirective);
    assert_eq!(completion.iterations, 1);

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 2);
    match &records[1] {
        TrajectoryRecord::Iteration(rec) => {
            assert_eq!(rec.final_answer.as_deref(), Some("Just three."));
        }
        TrajectoryRecord::Metadata(_) => panic!("expected iteration record"),
    }
}

#[tokio::test]
async fn test_iteration_ceiling() {
    let backend = ScriptedBackend::new([
        r#"<tool name="echo">1</tool>"#,
        r#"<tool name="echo">2</tool>"#,
        r#"<tool name="echo">3</tool>"#,
    ]);
    let tools = echo_registry();
    let capped = SessionLimits {
        max_iterations: 3,
        ..limits()
    };
    let mut session = Session::new(&backend, &tools, &tools, capped);
    let records = collector(&mut session);

    let completion = session.run("task", "Loop forever.").await.unwrap();

    assert_eq!(completion.stop_reason, StopReason::MaxIterations);
    assert_eq!(completion.iterations, 3);
    assert!(completion.response.contains("echo"));

    let records = records.lock().unwrap();
    let iteration_count = records
        .iter()
        .filter(|r| matches!(r, TrajectoryRecord::Iteration(_)))
        .count();
    assert_eq!(iteration_count, 3);
}

#[tokio::test]
async fn test_unknown_tool_fed_back() {
    let backend = ScriptedBackend::new([
        r#"<tool name="bogus">x</tool>"#,
        "<final>ok</final>",
    ]);
    let tools = echo_registry();
    let mut session = Session::new(&backend, &tools, &tools, limits());

    let completion = session.run("task", "Go.").await.unwrap();
    assert_eq!(completion.response, "ok");

    let requests = backend.requests();
    let feedback = last_user_content(&requests[1]);
    assert!(feedback.contains("unknown tool 'bogus'"));
    assert!(feedback.contains("echo"));
}

#[tokio::test]
async fn test_tool_failure_fed_back() {
    let backend = ScriptedBackend::new([
        r#"<tool name="fail">x</tool>"#,
        "<final>ok</final>",
    ]);
    let mut tools = echo_registry();
    tools.register(FailTool);
    let mut session = Session::new(&backend, &tools, &tools, limits());

    session.run("task", "Go.").await.unwrap();

    let requests = backend.requests();
    let feedback = last_user_content(&requests[1]);
    assert!(feedback.contains("tool 'fail' failed: nope"));
}

#[tokio::test]
async fn test_subquery_runs_nested_session() {
    let backend = ScriptedBackend::new([
        // Root iteration 1 delegates; the child consumes the next reply.
        r#"<tool name="subquery">What is the answer?</tool>"#,
        "<final>42</final>",
        "<final>the answer is 42</final>",
    ]);
    let tools = echo_registry();
    let mut session = Session::new(&backend, &tools, &tools, limits());
    let records = collector(&mut session);

    let completion = session.run("task", "Delegate.").await.unwrap();

    assert_eq!(completion.response, "the answer is 42");
    assert_eq!(backend.remaining(), 0);

    let requests = backend.requests();
    assert_eq!(requests.len(), 3);
    let feedback = last_user_content(&requests[2]);
    assert!(feedback.contains(r#"<tool_result name="subquery">"#));
    assert!(feedback.contains("42"));

    // Nested sessions do not write to the root trajectory.
    let records = records.lock().unwrap();
    assert_eq!(records.len(), 3); // metadata + 2 root iterations
}

#[tokio::test]
async fn test_subquery_depth_ceiling() {
    let backend = ScriptedBackend::new([
        r#"<tool name="subquery">go deeper</tool>"#,
        "<final>ok</final>",
    ]);
    let tools = echo_registry();
    let shallow = SessionLimits {
        max_depth: 1,
        ..limits()
    };
    let mut session = Session::new(&backend, &tools, &tools, shallow);

    let completion = session.run("task", "Delegate.").await.unwrap();
    assert_eq!(completion.response, "ok");

    let requests = backend.requests();
    // The subquery was refused, not run: only the two root completions.
    assert_eq!(requests.len(), 2);
    let feedback = last_user_content(&requests[1]);
    assert!(feedback.contains("depth limit reached"));
}

#[tokio::test]
async fn test_system_prompt_lists_tools() {
    let backend = ScriptedBackend::new(["<final>ok</final>"]);
    let tools = echo_registry();
    let mut session = Session::new(&backend, &tools, &tools, limits());

    session.run("task", "Go.").await.unwrap();

    let requests = backend.requests();
    let system = requests[0][0].content();
    assert!(system.contains("- echo: Repeats its input."));
    assert!(system.contains("subquery"));
    assert!(system.contains("<final>"));
}
