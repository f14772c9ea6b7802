//! Chat message types for the completions API.

use serde::{Deserialize, Serialize};

/// A single message in a chat-completion conversation.
///
/// Serializes to the wire format expected by OpenAI-compatible servers,
/// with the role as an internal tag:
///
/// ```json
/// {"role": "user", "content": "Hello"}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System { content: String },
    User { content: String },
    Assistant { content: Option<String> },
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
        }
    }

    /// Returns the text content of this message (empty for null content).
    pub fn content(&self) -> &str {
        match self {
            Self::System { content } | Self::User { content } => content,
            Self::Assistant { content } => content.as_deref().unwrap_or(""),
        }
    }

    /// Returns true if this is a user message.
    pub fn is_user(&self) -> bool {
        matches!(self, Self::User { .. })
    }
}
