// Configuration layer for creating the chat client at startup

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::OpenAIClient;
use crate::traits::ChatClient;

/// Connection and default model settings for the model server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Server root, e.g. "http://127.0.0.1:1234"
    pub base_url: String,
    /// Model used for threads created without an explicit model
    pub model: String,
    /// Temperature used for threads created without an explicit value
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Bearer token, only needed for hosted providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_temperature() -> f32 {
    0.2
}

impl LlmConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            temperature: default_temperature(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>> {
        let client = match &config.api_key {
            Some(key) => OpenAIClient::with_api_key(&config.base_url, key)?,
            None => OpenAIClient::new(&config.base_url)?,
        };
        Ok(Arc::new(client))
    }
}
