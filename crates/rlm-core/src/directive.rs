//! Directive parsing from model output.
//!
//! Parses XML-style directive tags from a completion:
//! ```text
//! <tool name="shell">ls -la</tool>
//! <final>There are three.</final>
//! ```

/// A directive extracted from model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Invoke a registered tool with the given input.
    Tool { name: String, input: String },
    /// End the session with this answer.
    Final(String),
}

/// Parser for extracting directives from completion text.
#[derive(Debug, Default)]
pub struct DirectiveParser;

const TOOL_OPEN: &str = "<tool ";
const TOOL_CLOSE: &str = "</tool>";
const FINAL_OPEN: &str = "<final>";
const FINAL_CLOSE: &str = "</final>";

impl DirectiveParser {
    /// Creates a new directive parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses directives from completion text, in document order.
    ///
    /// Malformed tags (missing `name` attribute, unterminated tag) are
    /// skipped rather than failing the parse.
    pub fn parse(&self, output: &str) -> Vec<Directive> {
        let mut directives = Vec::new();
        let mut remaining = output;

        loop {
            let tool_idx = remaining.find(TOOL_OPEN);
            let final_idx = remaining.find(FINAL_OPEN);

            let (start_idx, is_tool) = match (tool_idx, final_idx) {
                (Some(t), Some(f)) if t < f => (t, true),
                (Some(t), None) => (t, true),
                (_, Some(f)) => (f, false),
                (None, None) => break,
            };

            if is_tool {
                let after_start = &remaining[start_idx..];

                // Find the end of the opening tag
                let Some(tag_end) = after_start.find('>') else {
                    remaining = &remaining[start_idx + TOOL_OPEN.len()..];
                    continue;
                };

                let opening_tag = &after_start[..tag_end + 1];
                let Some(name) = Self::extract_attr(opening_tag, "name") else {
                    remaining = &remaining[start_idx + tag_end + 1..];
                    continue;
                };

                // Find the closing tag
                let content_start = &after_start[tag_end + 1..];
                let Some(close_idx) = content_start.find(TOOL_CLOSE) else {
                    remaining = &remaining[start_idx + tag_end + 1..];
                    continue;
                };

                directives.push(Directive::Tool {
                    name,
                    input: content_start[..close_idx].trim().to_string(),
                });

                remaining = &content_start[close_idx + TOOL_CLOSE.len()..];
            } else {
                let content_start = &remaining[start_idx + FINAL_OPEN.len()..];
                let Some(close_idx) = content_start.find(FINAL_CLOSE) else {
                    remaining = content_start;
                    continue;
                };

                directives.push(Directive::Final(
                    content_start[..close_idx].trim().to_string(),
                ));

                remaining = &content_start[close_idx + FINAL_CLOSE.len()..];
            }
        }

        directives
    }

    /// Extracts a quoted attribute value from an opening tag.
    fn extract_attr(tag: &str, attr: &str) -> Option<String> {
        let pattern = format!("{attr}=\"");
        let value_start = tag.find(&pattern)? + pattern.len();
        let rest = &tag[value_start..];
        let value_end = rest.find('"')?;
        Some(rest[..value_end].to_string())
    }
}
