//! Completion, chat and embedding front ends and the machinery they share.
//!
//! [`CompletionLlm`] and [`ChatLlm`] differ only in their [`CallShape`]:
//! request building, dispatch to the streaming or non-streaming path, logging
//! and collection all run through [`orchestrator::generate`].

pub mod chat;
pub mod collect;
pub mod completion;
pub mod embedding;
pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod stream;

pub use chat::ChatLlm;
pub use collect::Collected;
pub use completion::CompletionLlm;
pub use embedding::{create_embedding, EmbeddingModel};
pub use orchestrator::{CallShape, ChatShape, CompletionShape};
pub use prompt::{estimate_tokens, LanguageModel, PromptValue};
pub use request::{
    CallKind, DEFAULT_CHAT_MAX_TOKENS, DEFAULT_CHAT_MODEL, DEFAULT_COMPLETION_MODEL,
    DEFAULT_EMBEDDING_MODEL,
};
pub use stream::{accumulate, StreamAccumulator};
