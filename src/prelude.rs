//! Convenience re-exports for common use.

pub use crate::config::{ApiType, ClientConfig};
pub use crate::context::CallContext;
pub use crate::error::{LangrigError, Result};
pub use crate::llm::{ChatLlm, CompletionLlm, LanguageModel, PromptValue};
pub use crate::logger::{LlmLogger, NoopLogger, TracingLogger};
pub use crate::output_parser::{OutputParser, ResponseSchema, StructuredJson};
pub use crate::provider::{CompletionProvider, OpenAiClient};
pub use crate::types::{
    AiMessage, CallOptions, ChatMessage, FinishReason, FnSink, FunctionCall,
    FunctionCallBehavior, FunctionDefinition, Generation, LlmResult, StreamingSink, Usage,
};
