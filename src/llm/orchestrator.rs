//! The shared generate loop: build, log, dispatch streaming or not, collect.

use async_trait::async_trait;
use tracing::debug;

use crate::context::CallContext;
use crate::error::Result;
use crate::logger::LlmLogger;
use crate::provider::{
    ChatCompletionRequest, CompletionProvider, CompletionRequest,
};
use crate::types::{
    AiMessage, CallOptions, ChatMessage, Generation, GenerationInfo, StreamingSink,
};

use super::collect::{collect_chat, collect_completion, Collected};
use super::request::{chat_messages, chat_request, completion_request, CallKind};
use super::stream::accumulate;

/// Per-kind encode/decode functions plugged into [`generate`].
#[async_trait]
pub trait CallShape: Send + Sync {
    /// One item of the caller's input sequence.
    type Input: Sync;
    type Request: Send + Sync;

    fn kind(&self) -> CallKind;

    fn base_request(&self, options: &CallOptions, model: &str) -> Self::Request;

    /// Put `input` into the request and return the text to log for it.
    fn prepare(&self, request: &mut Self::Request, input: &Self::Input) -> Result<String>;

    async fn issue(
        &self,
        provider: &dyn CompletionProvider,
        ctx: &CallContext,
        request: &Self::Request,
    ) -> Result<Collected>;

    async fn issue_stream(
        &self,
        provider: &dyn CompletionProvider,
        ctx: &CallContext,
        request: &Self::Request,
        sink: &dyn StreamingSink,
    ) -> Result<Collected>;

    fn record(&self, collected: Collected) -> Generation;
}

/// Single-prompt completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionShape;

#[async_trait]
impl CallShape for CompletionShape {
    type Input = String;
    type Request = CompletionRequest;

    fn kind(&self) -> CallKind {
        CallKind::Completion
    }

    fn base_request(&self, options: &CallOptions, model: &str) -> CompletionRequest {
        completion_request(options, model)
    }

    fn prepare(&self, request: &mut CompletionRequest, prompt: &String) -> Result<String> {
        request.prompt.clone_from(prompt);
        Ok(prompt.clone())
    }

    async fn issue(
        &self,
        provider: &dyn CompletionProvider,
        ctx: &CallContext,
        request: &CompletionRequest,
    ) -> Result<Collected> {
        collect_completion(provider.create_completion(ctx, request).await?)
    }

    async fn issue_stream(
        &self,
        provider: &dyn CompletionProvider,
        ctx: &CallContext,
        request: &CompletionRequest,
        sink: &dyn StreamingSink,
    ) -> Result<Collected> {
        let stream = provider.create_completion_stream(ctx, request).await?;
        accumulate(ctx, stream, sink).await
    }

    fn record(&self, collected: Collected) -> Generation {
        Generation {
            text: collected.text,
            message: None,
            generation_info: GenerationInfo {
                finish_reason: collected.finish_reason,
                usage: collected.usage,
            },
        }
    }
}

/// Multi-turn chat.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatShape;

#[async_trait]
impl CallShape for ChatShape {
    type Input = Vec<ChatMessage>;
    type Request = ChatCompletionRequest;

    fn kind(&self) -> CallKind {
        CallKind::Chat
    }

    fn base_request(&self, options: &CallOptions, model: &str) -> ChatCompletionRequest {
        chat_request(options, model)
    }

    fn prepare(
        &self,
        request: &mut ChatCompletionRequest,
        messages: &Vec<ChatMessage>,
    ) -> Result<String> {
        request.messages = chat_messages(messages);
        Ok(serde_json::to_string(&request.messages)?)
    }

    async fn issue(
        &self,
        provider: &dyn CompletionProvider,
        ctx: &CallContext,
        request: &ChatCompletionRequest,
    ) -> Result<Collected> {
        collect_chat(provider.create_chat_completion(ctx, request).await?)
    }

    async fn issue_stream(
        &self,
        provider: &dyn CompletionProvider,
        ctx: &CallContext,
        request: &ChatCompletionRequest,
        sink: &dyn StreamingSink,
    ) -> Result<Collected> {
        let stream = provider.create_chat_completion_stream(ctx, request).await?;
        accumulate(ctx, stream, sink).await
    }

    fn record(&self, collected: Collected) -> Generation {
        Generation {
            text: collected.text.clone(),
            message: Some(AiMessage {
                content: collected.text,
                function_call: collected.function_call,
            }),
            generation_info: GenerationInfo {
                finish_reason: collected.finish_reason,
                usage: collected.usage,
            },
        }
    }
}

/// Everything the loop needs besides the shape and the inputs.
pub struct Dispatch<'a> {
    pub provider: &'a dyn CompletionProvider,
    pub logger: &'a dyn LlmLogger,
    pub ctx: &'a CallContext,
    pub model: &'a str,
}

/// Run `inputs` through the provider one at a time, in order.
///
/// Each item is fully resolved before the next request is issued. The first
/// failure aborts the whole call: earlier records are discarded and only the
/// error is returned.
pub async fn generate<S: CallShape>(
    shape: &S,
    dispatch: Dispatch<'_>,
    inputs: &[S::Input],
    options: &CallOptions,
) -> Result<Vec<Generation>> {
    let Dispatch {
        provider,
        logger,
        ctx,
        model,
    } = dispatch;

    let mut request = shape.base_request(options, model);
    let mut generations = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let outcome = match shape.prepare(&mut request, input) {
            Ok(prompt) => {
                logger.log_request(&prompt);
                debug!(
                    kind = %shape.kind(),
                    model,
                    index,
                    streaming = options.is_streaming(),
                    "issuing request"
                );
                match options.streaming_sink.as_deref() {
                    Some(sink) => shape.issue_stream(provider, ctx, &request, sink).await,
                    None => shape.issue(provider, ctx, &request).await,
                }
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(collected) => {
                let generation = shape.record(collected);
                logger.log_response(&generation.text);
                generations.push(generation);
            }
            Err(e) => {
                logger.log_error(&e);
                return Err(e);
            }
        }
    }

    Ok(generations)
}
