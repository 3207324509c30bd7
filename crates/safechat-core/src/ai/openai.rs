use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ensure_success, LlmClient, ServiceError};
use crate::provider::Provider;

const PROVIDER: &str = "OpenAI";

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "gpt-4o-mini".to_string(),
            "gpt-4o".to_string(),
            "gpt-4-turbo".to_string(),
        ]
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn submit_prompt(&self, prompt: &str) -> Result<String, ServiceError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(PROVIDER, response).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed(PROVIDER, e))?;
        extract_text(openai_response)
    }

    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Message content of the first choice.
fn extract_text(response: OpenAIResponse) -> Result<String, ServiceError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ServiceError::malformed(PROVIDER, "response contained no choices"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> OpenAIResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_text_takes_first_choice() {
        let response = parse(
            r#"{"id":"chatcmpl-1","object":"chat.completion","choices":[{"index":0,"message":{"role":"assistant","content":"Please stay safe."},"finish_reason":"stop"}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "Please stay safe.");
    }

    #[test]
    fn test_extract_text_rejects_missing_choices() {
        let cases = [
            r#"{"choices":[]}"#,
            "{}",
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        ];
        for json in cases {
            assert!(matches!(
                extract_text(parse(json)),
                Err(ServiceError::MalformedResponse { .. })
            ));
        }
    }
}
