//! Chat message types.

use serde::{Deserialize, Serialize};
use strum::Display;

/// A function invocation requested by the model.
///
/// `arguments` is passed through exactly as the provider produced it; decoding
/// it is the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Assistant output: content plus an optional function call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

/// Kind of a chat message, independent of any provider's role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChatMessageType {
    System,
    Ai,
    Human,
    Generic,
    Function,
}

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatMessage {
    System { content: String },
    Ai(AiMessage),
    Human { content: String },
    /// A message with a free-form role label.
    Generic { role: String, content: String },
    /// The result of a function call, fed back to the model.
    Function { name: String, content: String },
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create a human (user) message.
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn ai(content: impl Into<String>) -> Self {
        Self::Ai(AiMessage {
            content: content.into(),
            function_call: None,
        })
    }

    /// Create an assistant message that requested a function call.
    pub fn ai_function_call(
        content: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self::Ai(AiMessage {
            content: content.into(),
            function_call: Some(FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            }),
        })
    }

    pub fn generic(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Generic {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a function result message.
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Function {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn message_type(&self) -> ChatMessageType {
        match self {
            Self::System { .. } => ChatMessageType::System,
            Self::Ai(_) => ChatMessageType::Ai,
            Self::Human { .. } => ChatMessageType::Human,
            Self::Generic { .. } => ChatMessageType::Generic,
            Self::Function { .. } => ChatMessageType::Function,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::Human { content }
            | Self::Generic { content, .. }
            | Self::Function { content, .. } => content,
            Self::Ai(m) => &m.content,
        }
    }

    /// Speaker label used when a conversation is flattened into plain text.
    pub fn speaker(&self) -> &str {
        match self {
            Self::System { .. } => "System",
            Self::Ai(_) => "AI",
            Self::Human { .. } => "Human",
            Self::Generic { role, .. } => role,
            Self::Function { .. } => "Function",
        }
    }
}

impl From<AiMessage> for ChatMessage {
    fn from(message: AiMessage) -> Self {
        Self::Ai(message)
    }
}

/// Flatten a conversation into `Speaker: content` lines.
pub fn buffer_string(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.speaker(), m.content()))
        .collect::<Vec<_>>()
        .join("\n")
}
