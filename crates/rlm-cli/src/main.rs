//! # rlm-cli
//!
//! Binary entry point for the RLM smoke harness.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - The raw chat-completion smoke test
//! - An optional orchestration session with the built-in tool registry
//! - Trajectory log viewing via `rlm trajectory`

mod summary;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rlm_core::{ChatClient, CompletionBackend, RlmConfig, Session, TrajectoryLogger, TrajectoryReader};
use rlm_proto::ChatMessage;
use rlm_tools::builtin_registry;
use std::io::{stdout, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_PROMPT: &str = "How many r's are in strawberry?";

const ROOT_PROMPT: &str =
    "Use the tools when they help, then emit the final answer tag with the answer.";

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// RLM smoke harness - quick setup check and trajectory tooling
#[derive(Parser, Debug)]
#[command(name = "rlm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the API smoke test (default if no subcommand given)
    Smoke(SmokeArgs),

    /// Pretty-print a trajectory log
    Trajectory(TrajectoryArgs),
}

/// Arguments for the smoke subcommand.
#[derive(Parser, Debug)]
struct SmokeArgs {
    /// Prompt sent to the model
    #[arg(long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Run an orchestration session after the raw API smoke test
    #[arg(long)]
    rlm: bool,

    /// Register the Monty placeholder tool in the session
    #[arg(long)]
    use_monty: bool,
}

/// Output format for the trajectory subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON format for programmatic access
    Json,
}

/// Arguments for the trajectory subcommand.
#[derive(Parser, Debug)]
struct TrajectoryArgs {
    /// Path to an .rlm_logs/*.jsonl trajectory file
    log_file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Smoke(args)) => smoke_command(args).await,
        Some(Commands::Trajectory(args)) => trajectory_command(cli.color, args),
        None => {
            // Default to smoke with no overrides
            let args = SmokeArgs {
                prompt: DEFAULT_PROMPT.to_string(),
                rlm: false,
                use_monty: false,
            };
            smoke_command(args).await
        }
    }
}

async fn smoke_command(args: SmokeArgs) -> Result<()> {
    let config =
        RlmConfig::from_env().context("Failed to load configuration from the environment")?;
    debug!(config = ?config, "Configuration loaded");

    let client = ChatClient::new(&config);

    let text = client
        .complete(&[ChatMessage::user(&args.prompt)], config.max_tokens)
        .await
        .context("Raw chat completion failed")?;
    println!("[raw completion] {text}");

    if args.rlm {
        let answer = run_session(&config, &client, &args).await?;
        println!("[rlm completion] {answer}");
        println!(
            "[visualizer] Trajectory logs were written to {}",
            config.log_dir.join("trajectory_*.jsonl").display()
        );
    }

    Ok(())
}

/// Runs one orchestration session, recording its trajectory.
async fn run_session(config: &RlmConfig, client: &ChatClient, args: &SmokeArgs) -> Result<String> {
    let tools = builtin_registry(args.use_monty);
    let sub_tools = builtin_registry(args.use_monty);

    let (logger, log_path) = TrajectoryLogger::create(&config.log_dir, "trajectory")
        .with_context(|| format!("Failed to create trajectory log in {:?}", config.log_dir))?;
    let logger = Arc::new(logger);
    info!(path = %log_path.display(), "Recording trajectory");

    let mut session = Session::new(client, &tools, &sub_tools, config.limits());
    session.add_observer(TrajectoryLogger::make_observer(Arc::clone(&logger)));

    let completion = session
        .run(&args.prompt, ROOT_PROMPT)
        .await
        .context("Orchestration session failed")?;
    debug!(
        stop = completion.stop_reason.as_str(),
        iterations = completion.iterations,
        "Session finished"
    );

    if let Err(e) = logger.flush() {
        warn!("Failed to flush trajectory log: {}", e);
    }

    Ok(completion.response)
}

fn trajectory_command(color_mode: ColorMode, args: TrajectoryArgs) -> Result<()> {
    let reader = TrajectoryReader::from_file(&args.log_file)
        .with_context(|| format!("Failed to read trajectory log {:?}", args.log_file))?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(reader.records())?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let rendered = summary::render(&reader, color_mode.should_use_colors());
            print!("{rendered}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_mode_never() {
        assert!(!ColorMode::Never.should_use_colors());
    }

    #[test]
    fn test_color_mode_always() {
        assert!(ColorMode::Always.should_use_colors());
    }

    #[test]
    fn test_cli_parses_smoke_flags() {
        let cli = Cli::parse_from(["rlm", "smoke", "--prompt", "hi", "--rlm", "--use-monty"]);
        match cli.command {
            Some(Commands::Smoke(args)) => {
                assert_eq!(args.prompt, "hi");
                assert!(args.rlm);
                assert!(args.use_monty);
            }
            _ => panic!("expected smoke subcommand"),
        }
    }

    #[test]
    fn test_cli_default_prompt() {
        let cli = Cli::parse_from(["rlm", "smoke"]);
        match cli.command {
            Some(Commands::Smoke(args)) => {
                assert_eq!(args.prompt, DEFAULT_PROMPT);
                assert!(!args.rlm);
            }
            _ => panic!("expected smoke subcommand"),
        }
    }

    #[test]
    fn test_cli_parses_trajectory_path() {
        let cli = Cli::parse_from(["rlm", "trajectory", ".rlm_logs/trajectory_1.jsonl"]);
        match cli.command {
            Some(Commands::Trajectory(args)) => {
                assert_eq!(
                    args.log_file,
                    PathBuf::from(".rlm_logs/trajectory_1.jsonl")
                );
                assert_eq!(args.format, OutputFormat::Text);
            }
            _ => panic!("expected trajectory subcommand"),
        }
    }

    #[test]
    fn test_cli_parses_trajectory_json_format() {
        let cli = Cli::parse_from(["rlm", "trajectory", "t.jsonl", "--format", "json"]);
        match cli.command {
            Some(Commands::Trajectory(args)) => {
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("expected trajectory subcommand"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_allowed() {
        let cli = Cli::parse_from(["rlm"]);
        assert!(cli.command.is_none());
    }
}
