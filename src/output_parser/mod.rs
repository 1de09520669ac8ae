//! Output parsers: turn raw model text into checked, structured values.

mod structured_json;

pub use structured_json::{ResponseSchema, StructuredJson};

use thiserror::Error;

use crate::llm::PromptValue;

/// Errors raised while parsing model output.
#[derive(Debug, Error)]
pub enum OutputParserError {
    /// The text is not a JSON object.
    #[error("parse text {text}. {source}")]
    Decode {
        text: String,
        #[source]
        source: serde_json::Error,
    },

    /// The object lacks one or more declared fields.
    #[error("parse text {text}. output is missing the following fields {missing:?}")]
    MissingFields { text: String, missing: Vec<String> },
}

impl OutputParserError {
    /// The text that failed to parse.
    pub fn text(&self) -> &str {
        match self {
            Self::Decode { text, .. } | Self::MissingFields { text, .. } => text,
        }
    }
}

/// Parses model text into `Self::Output` and describes the expected format.
pub trait OutputParser: Send + Sync {
    type Output;

    fn parse(&self, text: &str) -> Result<Self::Output, OutputParserError>;

    /// Parse with the prompt that produced `text` available for context.
    fn parse_with_prompt(
        &self,
        text: &str,
        _prompt: &PromptValue,
    ) -> Result<Self::Output, OutputParserError> {
        self.parse(text)
    }

    /// Instructions to append to a prompt so the model answers parseably.
    fn format_instructions(&self) -> String;

    fn parser_type(&self) -> &'static str;
}
