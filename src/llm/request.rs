//! Mapping from call options and messages to provider requests.

use strum::Display;

use crate::provider::{ChatCompletionMessage, ChatCompletionRequest, ChatRole, CompletionRequest};
use crate::types::{CallOptions, ChatMessage, ChatMessageType, FunctionCallBehavior};

pub const DEFAULT_COMPLETION_MODEL: &str = "text-davinci-003";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Chat requests send this when the caller does not set `max_tokens`.
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 1024;

/// The three request shapes this crate issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CallKind {
    Completion,
    Chat,
    Embedding,
}

impl CallKind {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Completion => DEFAULT_COMPLETION_MODEL,
            Self::Chat => DEFAULT_CHAT_MODEL,
            Self::Embedding => DEFAULT_EMBEDDING_MODEL,
        }
    }

    /// Pick the model for a call: per-call override, then the instance
    /// default, then this kind's default. Empty strings count as unset.
    pub fn resolve_model<'a>(
        self,
        call_override: Option<&'a str>,
        instance_default: Option<&'a str>,
    ) -> &'a str {
        call_override
            .filter(|m| !m.is_empty())
            .or(instance_default.filter(|m| !m.is_empty()))
            .unwrap_or(self.default_model())
    }
}

/// Base completion request; `prompt` is filled in per item.
pub fn completion_request(options: &CallOptions, model: &str) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        prompt: String::new(),
        max_tokens: options.max_tokens,
        temperature: options.temperature.map(|t| t as f32),
        top_p: options.top_p.map(|p| p as f32),
        n: options.n,
        stream: options.is_streaming(),
        stop: options.stop_words.clone(),
        presence_penalty: options.presence_penalty.map(|p| p as f32),
        frequency_penalty: options.frequency_penalty.map(|p| p as f32),
    }
}

/// Base chat request; `messages` are filled in per item.
pub fn chat_request(options: &CallOptions, model: &str) -> ChatCompletionRequest {
    let function_call = if options.functions.is_empty() {
        options.function_call.clone()
    } else {
        Some(
            options
                .function_call
                .clone()
                .unwrap_or(FunctionCallBehavior::Auto),
        )
    };

    ChatCompletionRequest {
        model: model.to_string(),
        messages: Vec::new(),
        max_tokens: Some(options.max_tokens.unwrap_or(DEFAULT_CHAT_MAX_TOKENS)),
        temperature: options.temperature.map(|t| t as f32),
        top_p: options.top_p.map(|p| p as f32),
        n: options.n,
        stream: options.is_streaming(),
        stop: options.stop_words.clone(),
        presence_penalty: options.presence_penalty.map(|p| p as f32),
        frequency_penalty: options.frequency_penalty.map(|p| p as f32),
        functions: options.functions.clone(),
        function_call,
    }
}

/// Provider role for each message kind.
pub fn provider_role(kind: ChatMessageType) -> ChatRole {
    match kind {
        ChatMessageType::System => ChatRole::System,
        ChatMessageType::Ai => ChatRole::Assistant,
        ChatMessageType::Human | ChatMessageType::Generic => ChatRole::User,
        ChatMessageType::Function => ChatRole::Function,
    }
}

/// Translate one message set into provider messages.
pub fn chat_messages(messages: &[ChatMessage]) -> Vec<ChatCompletionMessage> {
    messages
        .iter()
        .map(|m| {
            let (name, function_call) = match m {
                ChatMessage::Ai(ai) => (None, ai.function_call.clone()),
                ChatMessage::Function { name, .. } => (Some(name.clone()), None),
                _ => (None, None),
            };
            ChatCompletionMessage {
                role: provider_role(m.message_type()),
                content: m.content().to_string(),
                name,
                function_call,
            }
        })
        .collect()
}
