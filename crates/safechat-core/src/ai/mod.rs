pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Response;
use thiserror::Error;

use crate::config::Config;
use crate::provider::Provider;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

/// Why a provider request did not produce a reply.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("malformed response from {provider}: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("request task ended abnormally: {0}")]
    Aborted(String),
}

impl ServiceError {
    pub(crate) fn malformed(provider: &'static str, detail: impl ToString) -> Self {
        ServiceError::MalformedResponse {
            provider,
            detail: detail.to_string(),
        }
    }
}

/// A remote model that turns a prompt into a reply.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn submit_prompt(&self, prompt: &str) -> Result<String, ServiceError>;

    fn provider(&self) -> Provider;

    fn model(&self) -> &str;
}

/// Turn a non-2xx response into [`ServiceError::Status`], keeping the body for the log.
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: Response,
) -> Result<Response, ServiceError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        provider,
        status,
        body,
    })
}

/// Construct the configured provider client.
pub fn client_from_config(config: &Config) -> Result<Arc<dyn LlmClient>> {
    let provider = config.provider();
    let model = config.model_for(provider);

    let client: Arc<dyn LlmClient> = match provider {
        Provider::Gemini => {
            let key = config.api_key(provider).ok_or_else(|| missing_key(provider))?;
            Arc::new(GeminiClient::new(&key, &model))
        }
        Provider::Claude => {
            let key = config.api_key(provider).ok_or_else(|| missing_key(provider))?;
            Arc::new(ClaudeClient::new(&key, &model))
        }
        Provider::OpenAI => {
            let key = config.api_key(provider).ok_or_else(|| missing_key(provider))?;
            Arc::new(OpenAIClient::new(&key, &model))
        }
        Provider::Ollama => Arc::new(OllamaClient::new(&config.ollama_url(), &model)),
    };

    Ok(client)
}

fn missing_key(provider: Provider) -> anyhow::Error {
    anyhow!(
        "{} API key not configured. Set {} or add it to {}",
        provider.display_name(),
        provider.env_keys().join(" or "),
        Config::config_path_display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_needs_no_key() {
        let config = Config {
            provider: Some("ollama".to_string()),
            ..Config::new()
        };
        let client = client_from_config(&config).unwrap();
        assert_eq!(client.provider(), Provider::Ollama);
        assert_eq!(client.model(), ollama::DEFAULT_MODEL);
    }

    #[test]
    fn test_configured_model_is_used() {
        let config = Config {
            provider: Some("ollama".to_string()),
            model: Some("mistral:latest".to_string()),
            ..Config::new()
        };
        let client = client_from_config(&config).unwrap();
        assert_eq!(client.model(), "mistral:latest");
    }

    #[test]
    fn test_status_error_message() {
        let err = ServiceError::Status {
            provider: "Gemini",
            status: 429,
            body: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "Gemini API error 429: quota exceeded");
    }
}
