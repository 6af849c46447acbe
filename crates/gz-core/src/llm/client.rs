//! Chat-completion HTTP client

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};

use super::types::*;

/// OpenAI-compatible chat-completion client
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl CompletionClient {
    /// Create a new completion client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.clone(),
        })
    }

    /// Create with custom base URL (for testing or custom endpoints)
    pub fn with_base_url(config: &Config, base_url: String) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url;
        Ok(client)
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build a request carrying the client's model
    pub fn request(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
        }
    }

    /// Send a completion request, returning the first choice's text
    pub async fn complete(&self, request: ChatCompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!("Sending request to completion API: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Completion API error: {} - {}", status, body);
            return Err(Error::Api(format!("{}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("Failed to parse response: {} - {}", e, body)))?;

        parsed
            .first_content()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Api("Empty completion response".to_string()))
    }
}
