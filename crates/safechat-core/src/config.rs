use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::ai::{ollama, ClaudeClient, GeminiClient, OpenAIClient};
use crate::context::{ContextBudget, ContextWindowBuilder, DEFAULT_TOKEN_BUDGET};
use crate::persona::{FALLBACK_MESSAGE, SYSTEM_INSTRUCTION};
use crate::provider::Provider;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_url: Option<String>,
    pub token_budget: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub system_instruction: Option<String>,
    pub fallback_message: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::Gemini.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", config_path.display(), e))?;
        Ok(config)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("safechat").join("config.json"))
    }

    pub(crate) fn config_path_display() -> String {
        Self::get_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "the config file".to_string())
    }

    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::from_str)
            .unwrap_or(Provider::Gemini)
    }

    pub fn model_for(&self, provider: Provider) -> String {
        if let Some(model) = self.model.as_ref().filter(|m| !m.trim().is_empty()) {
            return model.clone();
        }
        let listed = match provider {
            Provider::Gemini => GeminiClient::list_models(),
            Provider::Claude => ClaudeClient::list_models(),
            Provider::OpenAI => OpenAIClient::list_models(),
            Provider::Ollama => vec![ollama::DEFAULT_MODEL.to_string()],
        };
        listed.into_iter().next().unwrap_or_default()
    }

    /// Credential for a provider. Environment variables win over the config file.
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        self.api_key_with(provider, |name| std::env::var(name).ok())
    }

    pub fn api_key_with<F>(&self, provider: Provider, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = provider
            .env_keys()
            .iter()
            .copied()
            .find_map(|name| env(name).filter(|v| !v.trim().is_empty()));

        let from_file = match provider {
            Provider::Gemini => self.gemini_api_key.clone(),
            Provider::Claude => self.claude_api_key.clone(),
            Provider::OpenAI => self.openai_api_key.clone(),
            Provider::Ollama => None,
        };

        from_env.or(from_file.filter(|v| !v.trim().is_empty()))
    }

    pub fn ollama_url(&self) -> String {
        self.ollama_url
            .clone()
            .unwrap_or_else(|| ollama::DEFAULT_BASE_URL.to_string())
    }

    pub fn context_budget(&self) -> ContextBudget {
        ContextBudget::new(self.token_budget.unwrap_or(DEFAULT_TOKEN_BUDGET))
    }

    pub fn context_builder(&self) -> ContextWindowBuilder {
        ContextWindowBuilder::new(self.system_instruction(), self.context_budget())
    }

    pub fn system_instruction(&self) -> &str {
        self.system_instruction
            .as_deref()
            .unwrap_or(SYSTEM_INSTRUCTION)
    }

    pub fn fallback_message(&self) -> &str {
        self.fallback_message.as_deref().unwrap_or(FALLBACK_MESSAGE)
    }

    /// Optional deadline for a single provider request. Zero disables it.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.provider(), Provider::Gemini);
        assert_eq!(config.model_for(Provider::Gemini), "gemini-1.5-flash");
        assert_eq!(config.context_budget().max_units, 2000);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.fallback_message(), FALLBACK_MESSAGE);
        assert_eq!(config.system_instruction(), SYSTEM_INSTRUCTION);
    }

    #[test]
    fn test_written_file_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            provider: Some("ollama".to_string()),
            model: Some("mistral:latest".to_string()),
            token_budget: Some(500),
            request_timeout_secs: Some(30),
            ..Config::new()
        };

        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.context_budget().max_units, 500);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"provider":"claude"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.provider(), Provider::Claude);
        assert_eq!(config.token_budget, None);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_key_overrides_file() {
        let config = Config {
            gemini_api_key: Some("from-file".to_string()),
            ..Config::new()
        };

        let none = |_: &str| -> Option<String> { None };
        assert_eq!(
            config.api_key_with(Provider::Gemini, none).as_deref(),
            Some("from-file")
        );

        let google_only = |name: &str| (name == "GOOGLE_API_KEY").then(|| "from-env".to_string());
        assert_eq!(
            config.api_key_with(Provider::Gemini, google_only).as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = Config {
            openai_api_key: Some("   ".to_string()),
            ..Config::new()
        };
        assert_eq!(config.api_key_with(Provider::OpenAI, |_| None), None);
        assert_eq!(config.api_key_with(Provider::Ollama, |_| None), None);
    }

    #[test]
    fn test_unknown_provider_falls_back_to_gemini() {
        let config = Config {
            provider: Some("bard".to_string()),
            ..Config::new()
        };
        assert_eq!(config.provider(), Provider::Gemini);
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = Config {
            request_timeout_secs: Some(0),
            ..Config::new()
        };
        assert_eq!(config.request_timeout(), None);
    }
}
