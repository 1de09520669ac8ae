//! Single-prompt completion front end.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::{LangrigError, Result};
use crate::logger::{LlmLogger, TracingLogger};
use crate::provider::{CompletionProvider, OpenAiClient};
use crate::types::{CallOptions, Generation, LlmResult};

use super::embedding;
use super::orchestrator::{self, CompletionShape, Dispatch};
use super::prompt::{LanguageModel, PromptValue};
use super::request::CallKind;

/// Text completion over a [`CompletionProvider`].
///
/// Cheap to clone; clones share the provider and logger.
///
/// ```no_run
/// use langrig::prelude::*;
///
/// # async fn example() -> langrig::error::Result<()> {
/// let llm = CompletionLlm::from_config(ClientConfig::from_env()?)?;
/// let text = llm
///     .call(&CallContext::new(), "Say hi", &CallOptions::default())
///     .await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CompletionLlm {
    provider: Arc<dyn CompletionProvider>,
    model: Option<String>,
    embedding_model: Option<String>,
    logger: Arc<dyn LlmLogger>,
}

impl CompletionLlm {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            model: None,
            embedding_model: None,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Build an OpenAI-backed front end. The config's model becomes the
    /// instance default.
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

    /// Model used when a call does not override it.
    pub fn model(&self) -> &str {
        CallKind::Completion.resolve_model(None, self.model.as_deref())
    }

    /// Complete one prompt and return the generated text.
    pub async fn call(
        &self,
        ctx: &CallContext,
        prompt: impl Into<String>,
        options: &CallOptions,
    ) -> Result<String> {
        let generations = self.generate(ctx, &[prompt.into()], options).await?;
        generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or(LangrigError::EmptyResponse)
    }

    /// Complete each prompt in order, one record per prompt.
    pub async fn generate(
        &self,
        ctx: &CallContext,
        prompts: &[String],
        options: &CallOptions,
    ) -> Result<Vec<Generation>> {
        let model =
            CallKind::Completion.resolve_model(options.model.as_deref(), self.model.as_deref());
        orchestrator::generate(
            &CompletionShape,
            Dispatch {
                provider: self.provider.as_ref(),
                logger: self.logger.as_ref(),
                ctx,
                model,
            },
            prompts,
            options,
        )
        .await
    }

    /// Embed `texts`, one vector per input in input order.
    ///
    /// An empty `model` falls back to the instance's embedding model, then
    /// to the default embedding model.
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
impl LanguageModel for CompletionLlm {
    async fn generate_prompt(
        &self,
        ctx: &CallContext,
        prompts: &[PromptValue],
        options: &CallOptions,
    ) -> Result<LlmResult> {
        let prompts: Vec<String> = prompts.iter().map(PromptValue::to_text).collect();
        let generations = self.generate(ctx, &prompts, options).await?;
        Ok(LlmResult {
            generations: generations.into_iter().map(|g| vec![g]).collect(),
        })
    }
}

/// Embedding call with the front end's logger attached.
pub(super) async fn embed_logged(
    provider: &dyn CompletionProvider,
    logger: &dyn LlmLogger,
    ctx: &CallContext,
    model: &str,
    texts: &[String],
) -> Result<Vec<Vec<f64>>> {
    logger.log_request(&texts.join("\n"));
    match embedding::create_embedding(provider, ctx, model, texts).await {
        Ok(vectors) => {
            logger.log_response(&format!("{} embeddings", vectors.len()));
            Ok(vectors)
        }
        Err(e) => {
            logger.log_error(&e);
            Err(e)
        }
    }
}
