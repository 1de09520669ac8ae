//! Front-end agnostic prompt values and the shared language model interface.

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::Result;
use crate::types::{buffer_string, CallOptions, ChatMessage, LlmResult};

/// A prompt that either front end can consume.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptValue {
    Text(String),
    Messages(Vec<ChatMessage>),
}

impl PromptValue {
    /// Flatten into a single prompt string. Message lists render as
    /// `Speaker: content` lines.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Messages(messages) => buffer_string(messages),
        }
    }

    /// Expand into a message list. Plain text becomes one human message.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        match self {
            Self::Text(text) => vec![ChatMessage::human(text.clone())],
            Self::Messages(messages) => messages.clone(),
        }
    }
}

impl From<String> for PromptValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for PromptValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<ChatMessage>> for PromptValue {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self::Messages(messages)
    }
}

/// Common surface of [`CompletionLlm`](super::CompletionLlm) and
/// [`ChatLlm`](super::ChatLlm).
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run every prompt value through the model, one generation list each.
    async fn generate_prompt(
        &self,
        ctx: &CallContext,
        prompts: &[PromptValue],
        options: &CallOptions,
    ) -> Result<LlmResult>;

    /// Approximate token count of `text`.
    fn num_tokens(&self, text: &str) -> usize {
        estimate_tokens(text)
    }
}

/// Rough token estimate: one token per four characters, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
