//! OpenAI (and Azure OpenAI) completion provider over reqwest.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::{ApiType, ClientConfig};
use crate::context::CallContext;
use crate::error::LangrigError;

use super::http::{azure_headers, bearer_headers, build_client, ensure_success, sse_json_stream};
use super::types::*;
use super::{CompletionProvider, DeltaStream};

const COMPLETIONS_ENDPOINT: &str = "/completions";
const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";
const EMBEDDINGS_ENDPOINT: &str = "/embeddings";

/// Credentialed client handle for an OpenAI-compatible API.
pub struct OpenAiClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Build a client, failing with a configuration error (e.g. a missing
    /// API key) before any network activity.
    pub fn new(config: ClientConfig) -> Result<Self, LangrigError> {
        config.validate()?;
        Ok(Self {
            config,
            http: build_client()?,
        })
    }

    /// Build from `OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self, LangrigError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str, model: &str) -> String {
        match self.config.api_type {
            ApiType::OpenAi => format!("{}{}", self.config.base_url(), endpoint),
            ApiType::Azure => format!(
                "{}/openai/deployments/{}{}?api-version={}",
                self.config.base_url(),
                azure_deployment(model),
                endpoint,
                self.config.api_version(),
            ),
        }
    }

    fn headers(&self) -> HeaderMap {
        match self.config.api_type {
            ApiType::OpenAi => {
                bearer_headers(&self.config.api_key, self.config.organization.as_deref())
            }
            ApiType::Azure => azure_headers(&self.config.api_key),
        }
    }

    async fn post_json<Req, Res>(
        &self,
        ctx: &CallContext,
        endpoint: &str,
        model: &str,
        body: &Req,
    ) -> Result<Res, LangrigError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let url = self.url(endpoint, model);
        debug!(provider = self.provider_name(), model, endpoint, "sending request");

        ctx.run(async {
            let resp = self
                .http
                .post(&url)
                .headers(self.headers())
                .json(body)
                .send()
                .await?;
            let resp = ensure_success(resp).await?;
            Ok(resp.json::<Res>().await?)
        })
        .await
    }

    async fn post_stream<Req, Delta>(
        &self,
        ctx: &CallContext,
        endpoint: &str,
        model: &str,
        body: &Req,
    ) -> Result<DeltaStream<Delta>, LangrigError>
    where
        Req: Serialize + Sync,
        Delta: DeserializeOwned + Send + 'static,
    {
        let url = self.url(endpoint, model);
        debug!(provider = self.provider_name(), model, endpoint, "opening stream");

        ctx.run(async {
            let resp = self
                .http
                .post(&url)
                .headers(self.headers())
                .json(body)
                .send()
                .await?;
            let resp = ensure_success(resp).await?;
            Ok(sse_json_stream::<Delta>(resp))
        })
        .await
    }
}

/// Azure deployment names cannot contain `.` or `:`; by convention the
/// deployment is named after the model with those characters removed.
fn azure_deployment(model: &str) -> String {
    model.chars().filter(|c| *c != '.' && *c != ':').collect()
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn provider_name(&self) -> &str {
        match self.config.api_type {
            ApiType::OpenAi => "openai",
            ApiType::Azure => "azure",
        }
    }

    async fn create_completion(
        &self,
        ctx: &CallContext,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LangrigError> {
        self.post_json(ctx, COMPLETIONS_ENDPOINT, &request.model, request)
            .await
    }

    async fn create_completion_stream(
        &self,
        ctx: &CallContext,
        request: &CompletionRequest,
    ) -> Result<DeltaStream<CompletionStreamResponse>, LangrigError> {
        self.post_stream(ctx, COMPLETIONS_ENDPOINT, &request.model, request)
            .await
    }

    async fn create_chat_completion(
        &self,
        ctx: &CallContext,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LangrigError> {
        self.post_json(ctx, CHAT_COMPLETIONS_ENDPOINT, &request.model, request)
            .await
    }

    async fn create_chat_completion_stream(
        &self,
        ctx: &CallContext,
        request: &ChatCompletionRequest,
    ) -> Result<DeltaStream<ChatCompletionStreamResponse>, LangrigError> {
        self.post_stream(ctx, CHAT_COMPLETIONS_ENDPOINT, &request.model, request)
            .await
    }

    async fn create_embeddings(
        &self,
        ctx: &CallContext,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, LangrigError> {
        self.post_json(ctx, EMBEDDINGS_ENDPOINT, &request.model, request)
            .await
    }
}
