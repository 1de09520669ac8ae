//! Per-call options.

use std::fmt;
use std::sync::Arc;

use bon::Builder;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::stream::StreamingSink;

/// Options for a single `call`/`generate` invocation.
///
/// Unset numeric options are omitted from the provider request, leaving the
/// provider's own default in effect. Supplying a `streaming_sink` switches the
/// call to the streaming path.
///
/// ```
/// use langrig::types::CallOptions;
///
/// let options = CallOptions::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.2)
///     .stop_words(vec!["\n\n".to_string()])
///     .build();
/// assert!(!options.is_streaming());
/// ```
#[derive(Clone, Default, Builder)]
pub struct CallOptions {
    /// Overrides the instance's model for this call.
    #[builder(into)]
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
    #[builder(default)]
    pub stop_words: Vec<String>,
    /// Number of samples to request.
    pub n: Option<u32>,
    /// Functions the model may call (chat only).
    #[builder(default)]
    pub functions: Vec<FunctionDefinition>,
    /// Explicit function-selection behaviour. When unset and `functions` is
    /// non-empty, [`FunctionCallBehavior::Auto`] is sent.
    pub function_call: Option<FunctionCallBehavior>,
    pub streaming_sink: Option<Arc<dyn StreamingSink>>,
}

impl CallOptions {
    pub fn is_streaming(&self) -> bool {
        self.streaming_sink.is_some()
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("presence_penalty", &self.presence_penalty)
            .field("stop_words", &self.stop_words)
            .field("n", &self.n)
            .field("functions", &self.functions)
            .field("function_call", &self.function_call)
            .field("streaming_sink", &self.streaming_sink.as_ref().map(|_| ".."))
            .finish()
    }
}

/// A function the model may ask to call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// JSON Schema for the function's parameters.
    pub parameters: serde_json::Value,
}

impl FunctionDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// How the model should choose among declared functions.
///
/// Serialized the way the chat API expects: `"auto"`, `"none"` or
/// `{"name": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionCallBehavior {
    Auto,
    None,
    Named(String),
}

impl Serialize for FunctionCallBehavior {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::None => serializer.serialize_str("none"),
            Self::Named(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("name", name)?;
                map.end()
            }
        }
    }
}
