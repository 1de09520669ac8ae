//! Error types for langrig.

pub mod category;

pub use category::{ErrorCategory, ProviderErrorDetails};

use std::time::Duration;

use thiserror::Error;

use crate::output_parser::OutputParserError;

/// Boxed error returned by caller-supplied callbacks such as streaming sinks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Primary error type for all langrig operations.
#[derive(Error, Debug)]
pub enum LangrigError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing API key: set it in the {0} environment variable")]
    MissingCredential(&'static str),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<ProviderErrorDetails>,
    },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("no response")]
    EmptyResponse,

    #[error("unexpected length of response: expected {expected}, got {actual}")]
    UnexpectedResponseLength { expected: usize, actual: usize },

    #[error("unexpected embedding model: {0}")]
    UnexpectedEmbeddingModel(String),

    #[error("Stream aborted by sink: {0}")]
    StreamAborted(#[source] BoxError),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Deadline exceeded after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    OutputParser(#[from] OutputParserError),
}

impl LangrigError {
    /// Create an API error from a status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::MissingCredential(_) => ErrorCategory::Configuration,
            Self::Api { .. }
            | Self::Authentication(_)
            | Self::RateLimited { .. }
            | Self::Network(_)
            | Self::Stream(_)
            | Self::Cancelled
            | Self::Timeout(_) => ErrorCategory::Transport,
            Self::Serialization(_)
            | Self::EmptyResponse
            | Self::UnexpectedResponseLength { .. }
            | Self::UnexpectedEmbeddingModel(_) => ErrorCategory::Protocol,
            Self::StreamAborted(_) => ErrorCategory::Sink,
            Self::OutputParser(_) => ErrorCategory::OutputValidation,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LangrigError>;
