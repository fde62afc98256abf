/*!
 * Provider implementations for hosted model inference.
 *
 * This module contains client implementations for the model backends
 * the evaluation entry points fan out to:
 * - Anthropic: Anthropic messages API
 * - Ollama: Local or self-hosted LLM server (e.g. Mistral)
 * - Mock: Scripted behaviours for tests and dry runs
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{ModelConfig, ProviderKind};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;

/// Sampling parameters and prompt for a single model call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// Prompt text
    pub prompt: String,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling mass
    pub top_p: f32,
    /// Top-k sampling cutoff
    pub top_k: u32,
}

impl CompletionRequest {
    /// Create a request carrying the sampling parameters of a model configuration
    pub fn for_model(prompt: impl Into<String>, model: &ModelConfig) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            top_p: model.top_p,
            top_k: model.top_k,
        }
    }

    /// Override the generation budget
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A model's answer: the generated text plus the verbatim response payload
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text extracted from the payload
    pub text: String,
    /// Raw payload as returned by the backend
    pub raw: serde_json::Value,
}

/// Common trait for all model providers
///
/// Providers are shared behind `Arc<dyn Provider>` so the orchestration code
/// never depends on a concrete backend.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short label used in storage keys and results (e.g. "claude")
    fn name(&self) -> &str;

    /// Complete a prompt using this provider
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}

/// Build a provider client from its configuration entry
pub fn build_provider(config: &ModelConfig) -> Arc<dyn Provider> {
    match config.provider {
        ProviderKind::Anthropic => Arc::new(anthropic::Anthropic::from_config(config)),
        ProviderKind::Ollama => Arc::new(ollama::Ollama::from_config(config)),
        ProviderKind::Mock => Arc::new(mock::MockProvider::working().named(&config.prefix)),
    }
}
