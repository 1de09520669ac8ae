//! Multi-turn chat front end.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::{LangrigError, Result};
use crate::logger::{LlmLogger, TracingLogger};
use crate::provider::{CompletionProvider, OpenAiClient};
use crate::types::{AiMessage, CallOptions, ChatMessage, Generation, LlmResult};

use super::completion::embed_logged;
use super::orchestrator::{self, ChatShape, Dispatch};
use super::prompt::{LanguageModel, PromptValue};
use super::request::CallKind;

/// Chat completion over a [`CompletionProvider`], with function calling.
#[derive(Clone)]
pub struct ChatLlm {
    provider: Arc<dyn CompletionProvider>,
    model: Option<String>,
    embedding_model: Option<String>,
    logger: Arc<dyn LlmLogger>,
}

impl ChatLlm {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            model: None,
            embedding_model: None,
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let model = config.model.clone();
        let client = OpenAiClient::new(config)?;
        Ok(Self {
            model,
            ..Self::new(Arc::new(client))
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn LlmLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn model(&self) -> &str {
        CallKind::Chat.resolve_model(None, self.model.as_deref())
    }

    /// Send one conversation and return the assistant's reply.
    ///
    /// When the model picks a function, the reply carries it in
    /// [`AiMessage::function_call`] and its content is usually empty.
    pub async fn call(
        &self,
        ctx: &CallContext,
        messages: Vec<ChatMessage>,
        options: &CallOptions,
    ) -> Result<AiMessage> {
        let generations = self.generate(ctx, &[messages], options).await?;
        generations
            .into_iter()
            .next()
            .and_then(|g| g.message)
            .ok_or(LangrigError::EmptyResponse)
    }

    /// Run each conversation in order, one record per conversation.
    pub async fn generate(
        &self,
        ctx: &CallContext,
        message_sets: &[Vec<ChatMessage>],
        options: &CallOptions,
    ) -> Result<Vec<Generation>> {
        let model = CallKind::Chat.resolve_model(options.model.as_deref(), self.model.as_deref());
        orchestrator::generate(
            &ChatShape,
            Dispatch {
                provider: self.provider.as_ref(),
                logger: self.logger.as_ref(),
                ctx,
                model,
            },
            message_sets,
            options,
        )
        .await
    }

    /// Embed `texts` with `model`, or the instance's embedding model when
    /// `model` is empty.
    pub async fn create_embedding(
        &self,
        ctx: &CallContext,
        model: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f64>>> {
        let model = CallKind::Embedding.resolve_model(Some(model), self.embedding_model.as_deref());
        embed_logged(
            self.provider.as_ref(),
            self.logger.as_ref(),
            ctx,
            model,
            texts,
        )
        .await
    }
}

#[async_trait]
impl LanguageModel for ChatLlm {
    async fn generate_prompt(
        &self,
        ctx: &CallContext,
        prompts: &[PromptValue],
        options: &CallOptions,
    ) -> Result<LlmResult> {
        let message_sets: Vec<Vec<ChatMessage>> =
            prompts.iter().map(PromptValue::to_messages).collect();
        let generations = self.generate(ctx, &message_sets, options).await?;
        Ok(LlmResult {
            generations: generations.into_iter().map(|g| vec![g]).collect(),
        })
    }
}
