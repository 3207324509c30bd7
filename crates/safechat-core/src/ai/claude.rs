use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_success, LlmClient, ServiceError};
use crate::provider::Provider;

const PROVIDER: &str = "Claude";

#[derive(Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "claude-3-5-haiku-20241022".to_string(),
            "claude-3-5-sonnet-20241022".to_string(),
            "claude-sonnet-4-20250514".to_string(),
        ]
    }
}

#[async_trait]
impl LlmClient for ClaudeClient {
    async fn submit_prompt(&self, prompt: &str) -> Result<String, ServiceError> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(PROVIDER, response).await?;

        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed(PROVIDER, e))?;
        extract_text(claude_response)
    }

    fn provider(&self) -> Provider {
        Provider::Claude
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// First non-empty text block of the reply.
fn extract_text(response: ClaudeResponse) -> Result<String, ServiceError> {
    response
        .content
        .into_iter()
        .map(|c| c.text)
        .find(|text| !text.is_empty())
        .ok_or_else(|| ServiceError::malformed(PROVIDER, "response contained no text"))
}
