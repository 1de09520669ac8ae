//! Completion provider trait and the OpenAI implementation.

pub mod http;
pub mod openai;
pub mod types;

pub use openai::OpenAiClient;
pub use types::*;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::context::CallContext;
use crate::error::LangrigError;

/// An open stream of provider deltas. `None` from the stream is the normal
/// end-of-stream signal; dropping the stream releases the connection.
pub type DeltaStream<T> = BoxStream<'static, Result<T, LangrigError>>;

/// The remote capability the orchestrator depends on.
///
/// Implementations are read-only after construction and shared across
/// concurrent calls. Every operation should honour the [`CallContext`]
/// (cancellation and deadline) and surface it as an error.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "openai", "azure").
    fn provider_name(&self) -> &str;

    async fn create_completion(
        &self,
        ctx: &CallContext,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LangrigError>;

    async fn create_completion_stream(
        &self,
        ctx: &CallContext,
        request: &CompletionRequest,
    ) -> Result<DeltaStream<CompletionStreamResponse>, LangrigError>;

    async fn create_chat_completion(
        &self,
        ctx: &CallContext,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LangrigError>;

    async fn create_chat_completion_stream(
        &self,
        ctx: &CallContext,
        request: &ChatCompletionRequest,
    ) -> Result<DeltaStream<ChatCompletionStreamResponse>, LangrigError>;

    async fn create_embeddings(
        &self,
        ctx: &CallContext,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, LangrigError>;
}
