//! Client configuration (layered: code > env > config file).

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::error::{LangrigError, Result};

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_ENV_VAR: &str = "OPENAI_MODEL";
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
pub const ORGANIZATION_ENV_VAR: &str = "OPENAI_ORGANIZATION";
pub const API_TYPE_ENV_VAR: &str = "OPENAI_API_TYPE";
pub const API_VERSION_ENV_VAR: &str = "OPENAI_API_VERSION";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2023-05-15";

/// Which flavour of the API the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    #[default]
    #[strum(to_string = "open_ai", serialize = "openai")]
    #[serde(alias = "openai")]
    OpenAi,
    Azure,
}

/// Connection settings for an OpenAI-compatible endpoint.
///
/// ```
/// use langrig::config::{ApiType, ClientConfig};
///
/// let config = ClientConfig::new("sk-test").with_base_url("http://localhost:8080/v1");
/// assert_eq!(config.api_type, ApiType::OpenAi);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub organization: Option<String>,
    pub api_type: ApiType,
    /// Azure only.
    pub api_version: Option<String>,
    /// Default model for front ends built from this config.
    pub model: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { ".." })
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("api_type", &self.api_type)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Azure OpenAI deployment at `base_url` (e.g. `https://my-resource.openai.azure.com`).
    pub fn azure(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Some(base_url.into()),
            api_type: ApiType::Azure,
            api_version: Some(DEFAULT_AZURE_API_VERSION.to_string()),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Load from environment variables (`OPENAI_API_KEY`, `OPENAI_MODEL`, ...).
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(key) = std::env::var(API_KEY_ENV_VAR) {
            config.api_key = key;
        }
        config.model = non_empty_env(MODEL_ENV_VAR);
        config.base_url = non_empty_env(BASE_URL_ENV_VAR);
        config.organization = non_empty_env(ORGANIZATION_ENV_VAR);
        config.api_version = non_empty_env(API_VERSION_ENV_VAR);
        if let Some(api_type) = non_empty_env(API_TYPE_ENV_VAR) {
            config.api_type = api_type.parse().map_err(|_| {
                LangrigError::Configuration(format!(
                    "{API_TYPE_ENV_VAR} must be one of open_ai, azure (got {api_type})"
                ))
            })?;
        }
        Ok(config)
    }

    /// Parse a TOML document with the same field names as this struct.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| LangrigError::Configuration(format!("invalid config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LangrigError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Fail before any network activity if the config cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(LangrigError::MissingCredential(API_KEY_ENV_VAR));
        }
        if self.api_type == ApiType::Azure && self.base_url.is_none() {
            return Err(LangrigError::Configuration(
                "Azure requires a base URL (the resource endpoint)".into(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .unwrap_or(DEFAULT_AZURE_API_VERSION)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
