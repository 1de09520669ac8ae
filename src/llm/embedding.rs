//! Embedding extraction.

use strum::{Display, EnumString, IntoStaticStr};
use tracing::debug;

use crate::context::CallContext;
use crate::error::{LangrigError, Result};
use crate::provider::{CompletionProvider, EmbeddingRequest};

use super::request::CallKind;

/// Embedding models accepted by [`create_embedding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum EmbeddingModel {
    #[strum(serialize = "text-embedding-3-small")]
    TextEmbedding3Small,
    #[strum(serialize = "text-embedding-3-large")]
    TextEmbedding3Large,
    #[strum(serialize = "text-embedding-ada-002")]
    AdaEmbeddingV2,
    #[strum(serialize = "text-similarity-ada-001")]
    AdaSimilarity,
    #[strum(serialize = "text-similarity-babbage-001")]
    BabbageSimilarity,
    #[strum(serialize = "text-similarity-curie-001")]
    CurieSimilarity,
    #[strum(serialize = "text-similarity-davinci-001")]
    DavinciSimilarity,
    #[strum(serialize = "text-search-ada-doc-001")]
    AdaSearchDocument,
    #[strum(serialize = "text-search-ada-query-001")]
    AdaSearchQuery,
    #[strum(serialize = "text-search-babbage-doc-001")]
    BabbageSearchDocument,
    #[strum(serialize = "text-search-babbage-query-001")]
    BabbageSearchQuery,
    #[strum(serialize = "text-search-curie-doc-001")]
    CurieSearchDocument,
    #[strum(serialize = "text-search-curie-query-001")]
    CurieSearchQuery,
    #[strum(serialize = "text-search-davinci-doc-001")]
    DavinciSearchDocument,
    #[strum(serialize = "text-search-davinci-query-001")]
    DavinciSearchQuery,
    #[strum(serialize = "code-search-ada-code-001")]
    AdaCodeSearchCode,
    #[strum(serialize = "code-search-ada-text-001")]
    AdaCodeSearchText,
    #[strum(serialize = "code-search-babbage-code-001")]
    BabbageCodeSearchCode,
    #[strum(serialize = "code-search-babbage-text-001")]
    BabbageCodeSearchText,
}

impl EmbeddingModel {
    /// Resolve a model name. An empty name selects the default embedding model.
    pub fn resolve(name: &str) -> Result<Self> {
        let name = CallKind::Embedding.resolve_model(Some(name), None);
        name.parse()
            .map_err(|_| LangrigError::UnexpectedEmbeddingModel(name.to_string()))
    }

    /// The identifier sent to the provider.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Embed `texts` in one batched request.
///
/// Returns exactly one vector per input, in input order, widened to `f64`.
/// An unrecognized model fails before any request is made; a response whose
/// vector count differs from the input count is rejected outright.
pub async fn create_embedding(
    provider: &dyn CompletionProvider,
    ctx: &CallContext,
    model: &str,
    texts: &[String],
) -> Result<Vec<Vec<f64>>> {
    let model = EmbeddingModel::resolve(model)?;

    debug!(model = model.as_str(), inputs = texts.len(), "creating embeddings");
    let response = provider
        .create_embeddings(
            ctx,
            &EmbeddingRequest {
                model: model.as_str().to_string(),
                input: texts.to_vec(),
            },
        )
        .await?;

    let mut data = response.data;
    if data.is_empty() {
        return Err(LangrigError::EmptyResponse);
    }
    if data.len() != texts.len() {
        return Err(LangrigError::UnexpectedResponseLength {
            expected: texts.len(),
            actual: data.len(),
        });
    }

    data.sort_by_key(|d| d.index);
    Ok(data
        .into_iter()
        .map(|d| d.embedding.into_iter().map(f64::from).collect())
        .collect())
}
