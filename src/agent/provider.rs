// ABOUTME: Generative model interface and provider factory.
// ABOUTME: One prompt in, an optional text reply or a GenerationError out; no retries.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::agent::gemini::GeminiClient;
use crate::config::LlmConfig;

/// Result of a single generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    /// Reply text; `None` when the response carried no text payload.
    pub text: Option<String>,
}

impl GenerateResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}

/// Failure of a remote generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
}

impl GenerationError {
    pub fn message(msg: impl Into<String>) -> Self {
        GenerationError::Message(msg.into())
    }

    /// Human-readable message, or `None` if the error carries none.
    pub fn user_message(&self) -> Option<String> {
        let msg = self.to_string();
        if msg.trim().is_empty() { None } else { Some(msg) }
    }
}

/// A remote text-generation backend.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier shown to the user.
    fn model_name(&self) -> &str;

    /// Generate a reply to a single text prompt.
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GenerationError>;
}

/// Create a generative model client based on the provider name in config.
pub fn create_client(config: &LlmConfig) -> anyhow::Result<Arc<dyn GenerativeModel>> {
    match config.provider.as_str() {
        "gemini" => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                anyhow::anyhow!(
                    "Missing API key: set the {} environment variable",
                    config.api_key_env
                )
            })?;
            let client = GeminiClient::new(api_key, &config.model).with_base_url(&config.base_url);
            Ok(Arc::new(client))
        }
        other => anyhow::bail!("Unknown LLM provider: '{}'. Expected: gemini", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_errors() {
        let config = LlmConfig {
            provider: "fakeprovider".to_string(),
            ..Default::default()
        };
        let result = create_client(&config);
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert!(err.to_string().contains("fakeprovider"));
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let config = LlmConfig {
            api_key_env: "POCKETCHAT_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(err.to_string().contains("POCKETCHAT_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            GenerationError::message("timeout").user_message().as_deref(),
            Some("timeout")
        );
        assert_eq!(GenerationError::message("  ").user_message(), None);
        let api = GenerationError::Api {
            status: 429,
            body: "quota".to_string(),
        };
        assert_eq!(api.to_string(), "API error (429): quota");
    }
}
