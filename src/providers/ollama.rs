use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::{debug, error};

use crate::app_config::ModelConfig;
use crate::errors::ProviderError;
use super::{Completion, CompletionRequest, Provider};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Label used for storage keys and results
    name: String,
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model identifier (e.g. "mistral:7b-instruct")
    model: String,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Top-p sampling (default: 0.9)
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    /// Top-k sampling (default: 40)
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: None,
            stream: Some(false),
        }
    }

    /// Build a request from a completion request
    pub fn from_completion(model: &str, request: &CompletionRequest) -> Self {
        let mut generation = Self::new(model, request.prompt.clone());
        generation.options = Some(GenerationOptions {
            temperature: Some(request.temperature),
            top_p: Some(request.top_p),
            top_k: Some(request.top_k),
            num_predict: Some(request.max_tokens),
        });
        generation
    }
}

impl Ollama {
    /// Create a new Ollama client for a full base URL such as `http://localhost:11434`
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(timeout)
                // Ollama uses HTTP/1.1
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            model: model.into(),
        }
    }

    /// Create a client from a model configuration entry
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            config.prefix.clone(),
            config.endpoint.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Generate text and return the raw JSON payload
    pub async fn generate(&self, request: &GenerationRequest) -> Result<serde_json::Value, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self.client.post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to send request to Ollama API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response.json::<serde_json::Value>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama API response: {}", e)))
    }
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        debug!("Calling Ollama model {} at {}", self.model, self.base_url);
        let raw = self.generate(&GenerationRequest::from_completion(&self.model, request)).await?;

        let parsed: GenerationResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        if parsed.response.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(Completion { text: parsed.response, raw })
    }
}
