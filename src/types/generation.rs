//! The normalized generation record and finish reasons.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use super::message::{AiMessage, FunctionCall};
use super::usage::Usage;

/// Why generation finished.
///
/// Unknown provider values are kept verbatim in [`FinishReason::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(from = "String", into = "String")]
pub enum FinishReason {
    Stop,
    Length,
    FunctionCall,
    ToolCalls,
    ContentFilter,
    #[strum(default)]
    Other(String),
}

impl FinishReason {
    /// Parse a provider value. Empty strings mean "not finished yet".
    pub fn parse(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        Some(Self::from(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::FunctionCall => "function_call",
            Self::ToolCalls => "tool_calls",
            Self::ContentFilter => "content_filter",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for FinishReason {
    fn from(value: String) -> Self {
        match Self::from_str(&value) {
            Ok(reason) => reason,
            Err(_) => Self::Other(value),
        }
    }
}

impl From<FinishReason> for String {
    fn from(value: FinishReason) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-record metadata: termination reason and, for non-streaming calls,
/// token usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Always present for non-streaming calls, always absent for streaming
    /// calls (the provider does not report usage on deltas).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One generation per input prompt or message set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Generated text. For chat records this mirrors `message.content`.
    pub text: String,
    /// Structured assistant message, chat calls only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<AiMessage>,
    #[serde(default)]
    pub generation_info: GenerationInfo,
}

impl Generation {
    /// The function call carried by the message, if any.
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.message.as_ref().and_then(|m| m.function_call.as_ref())
    }

    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.generation_info.finish_reason.as_ref()
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.generation_info.usage.as_ref()
    }
}

/// Result of [`generate_prompt`](crate::llm::LanguageModel::generate_prompt):
/// one generation list per prompt value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResult {
    pub generations: Vec<Vec<Generation>>,
}

impl LlmResult {
    /// Sum of the usage counters of every record that reports usage.
    pub fn total_usage(&self) -> Option<Usage> {
        self.generations
            .iter()
            .flatten()
            .filter_map(Generation::usage)
            .fold(None, |acc, usage| {
                let mut total = acc.unwrap_or_default();
                total.merge(usage);
                Some(total)
            })
    }
}
