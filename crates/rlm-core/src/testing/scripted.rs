//! Scripted completion backend for deterministic testing.
//!
//! `ScriptedBackend` serves a queue of canned replies as mock completions,
//! enabling session tests without live API calls.
//!
//! # Example
//!
//! ```
//! use rlm_core::testing::ScriptedBackend;
//!
//! let backend = ScriptedBackend::new(["<final>done</final>"]);
//! assert_eq!(backend.remaining(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rlm_proto::ChatMessage;

use crate::client::{ClientError, CompletionBackend};

/// A [`CompletionBackend`] that serves canned replies in order.
///
/// Each `complete` call records the request conversation and pops the next
/// reply; an exhausted script yields [`ClientError::EmptyChoices`].
pub struct ScriptedBackend {
    model: String,
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedBackend {
    /// Creates a backend serving the given replies in order.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: "scripted-model".to_string(),
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the model name reported in trajectory metadata.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns the conversations passed to `complete`, in call order.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the number of replies not yet served.
    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _max_tokens: u32,
    ) -> Result<String, ClientError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(messages.to_vec());

        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .ok_or(ClientError::EmptyChoices)
    }
}
