//! Human-readable rendering of trajectory logs.

use rlm_core::TrajectoryReader;

/// Maximum characters of a final answer shown in the summary.
pub const MAX_ANSWER_CHARS: usize = 200;

/// ANSI color codes for terminal output.
pub(crate) mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Renders the trajectory summary: a run-metadata section when present,
/// then one line per iteration with truncated final answers.
pub fn render(reader: &TrajectoryReader, use_colors: bool) -> String {
    use colors::*;

    let mut out = String::new();

    if let Some(meta) = reader.metadata() {
        if use_colors {
            out.push_str(&format!("{BOLD}{CYAN}=== Run Metadata ==={RESET}\n"));
        } else {
            out.push_str("=== Run Metadata ===\n");
        }
        out.push_str(&format!("root_model: {}\n", meta.root_model));
        out.push_str(&format!("backend: {}\n", meta.backend));
        out.push_str(&format!("environment: {}\n", meta.environment_type));
        out.push('\n');
    }

    let iterations = reader.iterations();
    if use_colors {
        out.push_str(&format!(
            "{BOLD}{CYAN}=== Iterations ({}) ==={RESET}\n",
            iterations.len()
        ));
    } else {
        out.push_str(&format!("=== Iterations ({}) ===\n", iterations.len()));
    }

    for item in iterations {
        out.push_str(&format!(
            "[{}] code_blocks={} final_answer={}\n",
            item.iteration,
            item.code_blocks.len(),
            item.is_final()
        ));
        if let Some(answer) = &item.final_answer {
            let shown = truncate(answer, MAX_ANSWER_CHARS);
            if use_colors {
                out.push_str(&format!("    {DIM}{shown}{RESET}\n"));
            } else {
                out.push_str(&format!("    {shown}\n"));
            }
        }
    }

    out
}

/// Truncates to at most `max_chars` characters, ellipsis included.
///
/// Counts characters, not bytes, so multi-byte answers are never split
/// mid-codepoint.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut shown: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        shown.push('…');
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlm_core::TrajectoryReader;

    fn fixture() -> TrajectoryReader {
        let jsonl = concat!(
            r#"{"type":"metadata","root_model":"zai-org/GLM-5-FP8","backend":"openai","environment_type":"local","max_depth":2,"max_iterations":8,"started_at":"2025-01-01T00:00:00+00:00"}"#,
            "\n",
            r#"{"type":"iteration","iteration":1,"code_blocks":["ls"]}"#,
            "\n",
            r#"{"type":"iteration","iteration":2,"code_blocks":[],"final_answer":"Three."}"#,
            "\n",
        );
        TrajectoryReader::from_bytes(jsonl.as_bytes()).unwrap()
    }

    #[test]
    fn test_render_sections() {
        let rendered = render(&fixture(), false);

        assert!(rendered.contains("=== Run Metadata ==="));
        assert!(rendered.contains("root_model: zai-org/GLM-5-FP8"));
        assert!(rendered.contains("backend: openai"));
        assert!(rendered.contains("environment: local"));
        assert!(rendered.contains("=== Iterations (2) ==="));
        assert!(rendered.contains("[1] code_blocks=1 final_answer=false"));
        assert!(rendered.contains("[2] code_blocks=0 final_answer=true"));
        assert!(rendered.contains("    Three."));
    }

    #[test]
    fn test_render_without_metadata() {
        let jsonl = r#"{"type":"iteration","iteration":1,"code_blocks":[]}"#;
        let reader = TrajectoryReader::from_bytes(jsonl.as_bytes()).unwrap();

        let rendered = render(&reader, false);
        assert!(!rendered.contains("Run Metadata"));
        assert!(rendered.contains("=== Iterations (1) ==="));
    }

    #[test]
    fn test_render_truncates_long_answers() {
        let long_answer = "x".repeat(500);
        let jsonl = format!(
            r#"{{"type":"iteration","iteration":1,"code_blocks":[],"final_answer":"{long_answer}"}}"#
        );
        let reader = TrajectoryReader::from_bytes(jsonl.as_bytes()).unwrap();

        let rendered = render(&reader, false);
        let answer_line = rendered
            .lines()
            .find(|line| line.starts_with("    "))
            .unwrap();
        assert!(answer_line.trim().chars().count() <= MAX_ANSWER_CHARS);
        assert!(answer_line.ends_with('…'));
    }

    #[test]
    fn test_render_colors_wrapped() {
        let rendered = render(&fixture(), true);
        assert!(rendered.contains(colors::BOLD));
        assert!(rendered.contains(colors::RESET));
    }

    #[test]
    fn test_truncate_under_limit() {
        assert_eq!(truncate("short", 200), "short");
    }

    #[test]
    fn test_truncate_at_limit() {
        let exact = "y".repeat(200);
        assert_eq!(truncate(&exact, 200), exact);
    }

    #[test]
    fn test_truncate_over_limit() {
        let long = "z".repeat(201);
        let shown = truncate(&long, 200);
        assert_eq!(shown.chars().count(), 200);
        assert!(shown.ends_with('…'));
    }

    #[test]
    fn test_truncate_multibyte() {
        let long = "é".repeat(300);
        let shown = truncate(&long, 200);
        assert_eq!(shown.chars().count(), 200);
    }
}
