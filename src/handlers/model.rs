/*!
 * Model invocation entry point.
 *
 * Every request is sent to every configured model in turn. Each raw answer
 * is kept in the response bucket under `{function_name}_{model}.txt`. A
 * failing model is recorded and skipped; the remaining ones still run.
 */

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::envelope::ResponseEnvelope;
use super::stage::{PipelineStage, StageTracker};
use crate::app_config::{Config, ModelConfig};
use crate::errors::PipelineError;
use crate::invocation::EntryPoint;
use crate::pacing::RequestPacer;
use crate::providers::{CompletionRequest, Provider};
use crate::storage::{ObjectStore, CONTENT_TYPE_TEXT};

/// Status reported once every request was processed
pub const PROCESSING_COMPLETE: &str = "processing complete";

/// Marker recorded for a model whose call failed; the cause is only logged
pub const MODEL_CALL_FAILED: &str = "Model call failed";

/// One prompt to run: `{"prompt": ..., "function_name": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInvocationRequest {
    pub prompt: String,
    pub function_name: String,
}

/// A single request or a batch of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModelInvocationBatch {
    One(ModelInvocationRequest),
    Many(Vec<ModelInvocationRequest>),
}

impl ModelInvocationBatch {
    /// Validate an incoming event into a list of requests.
    pub fn from_event(event: &Value) -> Result<Vec<ModelInvocationRequest>, PipelineError> {
        let batch: ModelInvocationBatch = serde_json::from_value(event.clone()).map_err(|_| {
            PipelineError::InvalidInput(
                "Expected {\"prompt\", \"function_name\"} or an array of them".to_string(),
            )
        })?;

        let requests = match batch {
            Self::One(request) => vec![request],
            Self::Many(requests) => requests,
        };

        if let Some(request) = requests.iter().find(|r| r.prompt.trim().is_empty()) {
            return Err(PipelineError::InvalidInput(format!(
                "Empty prompt for function '{}'",
                request.function_name
            )));
        }
        if requests.iter().any(|r| r.function_name.trim().is_empty()) {
            return Err(PipelineError::InvalidInput("Missing 'function_name' in request".to_string()));
        }
        Ok(requests)
    }
}

/// Outcome of one (request, model) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCallResult {
    pub function_name: String,
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,

    /// Raw provider payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,

    /// `MODEL_CALL_FAILED` when the call did not succeed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of a model invocation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInvocationSummary {
    pub status: String,
    pub results: Vec<ModelCallResult>,
}

/// Storage key of a raw model response.
pub fn response_key(function_name: &str, model_prefix: &str) -> String {
    format!("{}_{}.txt", function_name, model_prefix)
}

/// A configured model with its client.
#[derive(Debug, Clone)]
pub struct ModelEndpoint {
    pub config: ModelConfig,
    pub provider: Arc<dyn Provider>,
}

/// Runs prompts against every configured model.
pub struct ModelHandler {
    function_name: String,
    models: Vec<ModelEndpoint>,
    store: Arc<dyn ObjectStore>,
    response_bucket: String,
    pacer: RequestPacer,
}

impl ModelHandler {
    pub fn new(models: Vec<ModelEndpoint>, store: Arc<dyn ObjectStore>, config: &Config) -> Self {
        Self {
            function_name: config.invocation.model_function.clone(),
            models,
            store,
            response_bucket: config.storage.response_bucket.clone(),
            pacer: RequestPacer::new(config.evaluation.min_interval()),
        }
    }

    /// Run every request against every model.
    pub async fn run(
        &self,
        requests: &[ModelInvocationRequest],
        tracker: &mut StageTracker,
    ) -> ModelInvocationSummary {
        let mut results = Vec::with_capacity(requests.len() * self.models.len());

        for (index, request) in requests.iter().enumerate() {
            tracker.advance(PipelineStage::Dispatching { index, total: requests.len() });
            self.pacer.ready().await;
            info!(
                "[{}] Processing prompt for function: {}",
                tracker.request_id(),
                request.function_name
            );

            for endpoint in &self.models {
                results.push(self.call_model(endpoint, request, tracker).await);
            }
        }

        tracker.advance(PipelineStage::Aggregated);
        ModelInvocationSummary {
            status: PROCESSING_COMPLETE.to_string(),
            results,
        }
    }

    async fn call_model(
        &self,
        endpoint: &ModelEndpoint,
        request: &ModelInvocationRequest,
        tracker: &StageTracker,
    ) -> ModelCallResult {
        let prefix = endpoint.config.prefix.as_str();
        info!(
            "[{}] Calling {} model {} ({}) for {}",
            tracker.request_id(),
            endpoint.config.provider.display_name(),
            endpoint.config.model,
            prefix,
            request.function_name
        );

        let completion_request = CompletionRequest::for_model(request.prompt.as_str(), &endpoint.config);
        match endpoint.provider.complete(&completion_request).await {
            Ok(completion) => {
                self.save_response(&request.function_name, prefix, &completion.raw, tracker)
                    .await;
                ModelCallResult {
                    function_name: request.function_name.clone(),
                    model: prefix.to_string(),
                    generation: Some(completion.text),
                    response: Some(completion.raw),
                    error: None,
                }
            }
            Err(e) => {
                error!("[{}] Error calling model {}: {}", tracker.request_id(), prefix, e);
                ModelCallResult {
                    function_name: request.function_name.clone(),
                    model: prefix.to_string(),
                    generation: None,
                    response: None,
                    error: Some(MODEL_CALL_FAILED.to_string()),
                }
            }
        }
    }

    async fn save_response(&self, function_name: &str, prefix: &str, raw: &Value, tracker: &StageTracker) {
        let key = response_key(function_name, prefix);
        let body = match serde_json::to_vec(raw) {
            Ok(body) => body,
            Err(e) => {
                warn!("[{}] Could not serialize response for {}: {}", tracker.request_id(), key, e);
                return;
            }
        };

        match self
            .store
            .put(&self.response_bucket, &key, Bytes::from(body), CONTENT_TYPE_TEXT)
            .await
        {
            Ok(()) => info!("[{}] Response saved to storage: {}", tracker.request_id(), key),
            Err(e) => warn!("[{}] Error saving response to storage: {}", tracker.request_id(), e),
        }
    }
}

#[async_trait]
impl EntryPoint for ModelHandler {
    fn name(&self) -> &str {
        &self.function_name
    }

    async fn handle(&self, event: Value) -> ResponseEnvelope {
        let mut tracker = StageTracker::new(&self.function_name);

        let requests = match ModelInvocationBatch::from_event(&event) {
            Ok(requests) => requests,
            Err(e) => {
                error!("[{}] Invalid model request: {}", tracker.request_id(), e);
                tracker.fail("invalid_input");
                return ResponseEnvelope::from(&e);
            }
        };

        let summary = self.run(&requests, &mut tracker).await;

        // Every call failed; the evaluator records the dimension as failed
        if !summary.results.is_empty() && summary.results.iter().all(|r| r.error.is_some()) {
            let error = PipelineError::Inference {
                dimension: requests
                    .iter()
                    .map(|r| r.function_name.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
                message: format!("all {} model call(s) failed", summary.results.len()),
            };
            error!("[{}] {}", tracker.request_id(), error);
            tracker.fail("inference");
            return ResponseEnvelope::from(&error);
        }

        tracker.advance(PipelineStage::Responded);
        ResponseEnvelope::ok(&summary)
    }
}
