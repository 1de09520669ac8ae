//! Error classification.

use serde::{Deserialize, Serialize};

/// Broad error category, one per failure family a caller may branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing credential or invalid client configuration. Raised before
    /// any network activity.
    Configuration,
    /// Connection failure, non-2xx status, cancellation or deadline.
    Transport,
    /// The provider answered with a shape this layer cannot accept.
    Protocol,
    /// The caller's streaming sink stopped the stream.
    Sink,
    /// Structured output failed to decode or validate.
    OutputValidation,
}

/// Error body returned by an OpenAI-compatible API.
///
/// ```json
/// {"error": {"message": "...", "type": "invalid_request_error", "param": null, "code": "model_not_found"}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderErrorDetails {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorDetails,
}

impl ProviderErrorDetails {
    /// Parse an error body, returning `None` when it is not the expected envelope.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<ProviderErrorEnvelope>(body)
            .ok()
            .map(|e| e.error)
    }
}
