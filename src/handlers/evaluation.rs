/*!
 * Evaluation entry point.
 *
 * Renders one prompt per enabled dimension and sends them, one after the
 * other, to the model entry point. Calls are spaced by the request pacer.
 * What happens when a call fails is decided by the `DispatchPolicy`.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::conversion::error_kind;
use super::envelope::ResponseEnvelope;
use super::events::ObjectLocation;
use super::stage::{PipelineStage, StageTracker};
use crate::app_config::{Config, DispatchPolicy};
use crate::errors::PipelineError;
use crate::evaluation::{EvaluationPromptBuilder, EvaluationRequest, EvaluationResult};
use crate::invocation::{EntryPoint, SharedInvoker};
use crate::pacing::RequestPacer;
use crate::screenplay::FlattenedScript;
use crate::storage::ObjectStore;

/// Message of a completed evaluation run
pub const EVALUATIONS_PASSED: &str = "Evaluations passed!";

/// What started an evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationTrigger {
    /// The flattened script itself, as sent by the converter
    Script(FlattenedScript),
    /// A storage notification pointing at a stored script
    StorageEvent(ObjectLocation),
}

impl EvaluationTrigger {
    /// Classify an incoming event.
    ///
    /// A JSON string event is decoded first. Anything that is neither a
    /// script nor a storage notification is rejected with 400.
    pub fn from_event(event: &Value) -> Result<Self, PipelineError> {
        if let Value::String(raw) = event {
            let decoded: Value = serde_json::from_str(raw)
                .map_err(|e| PipelineError::InvalidInput(format!("Event is not valid JSON: {}", e)))?;
            return Self::from_event(&decoded);
        }

        if event.get("content").is_some() {
            let script: FlattenedScript = serde_json::from_value(event.clone())
                .map_err(|e| PipelineError::InvalidInput(format!("Invalid script content: {}", e)))?;
            return Ok(Self::Script(script));
        }

        ObjectLocation::from_event(event).map(Self::StorageEvent)
    }
}

/// Aggregate returned in the 200 body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub message: String,
    pub results: Vec<EvaluationResult>,
}

impl EvaluationSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Fans a script out to the model entry point, one dimension at a time.
pub struct EvaluationHandler {
    function_name: String,
    store: Arc<dyn ObjectStore>,
    invoker: SharedInvoker,
    builder: EvaluationPromptBuilder,
    policy: DispatchPolicy,
    pacer: RequestPacer,
    model_function: String,
}

impl EvaluationHandler {
    pub fn new(store: Arc<dyn ObjectStore>, invoker: SharedInvoker, config: &Config) -> Self {
        Self {
            function_name: config.invocation.evaluator_function.clone(),
            store,
            invoker,
            builder: EvaluationPromptBuilder::new(&config.evaluation.enabled_dimensions),
            policy: config.evaluation.dispatch_policy,
            pacer: RequestPacer::new(config.evaluation.min_interval()),
            model_function: config.invocation.model_function.clone(),
        }
    }

    /// Script text substituted into the templates.
    async fn script_content(&self, trigger: &EvaluationTrigger) -> Result<String, PipelineError> {
        match trigger {
            EvaluationTrigger::Script(script) => script
                .to_json()
                .map_err(|e| PipelineError::Unexpected(format!("Failed to serialize script: {}", e))),
            EvaluationTrigger::StorageEvent(location) => {
                let bytes = self.store.get(&location.bucket, &location.key).await?;
                String::from_utf8(bytes.to_vec()).map_err(|e| {
                    PipelineError::Unexpected(format!("Stored script {} is not UTF-8: {}", location, e))
                })
            }
        }
    }

    /// Evaluate a script along every enabled dimension.
    pub async fn evaluate(
        &self,
        trigger: &EvaluationTrigger,
        tracker: &mut StageTracker,
    ) -> Result<EvaluationSummary, PipelineError> {
        let script = self.script_content(trigger).await?;
        let requests = self.builder.build(&script);
        info!(
            "[{}] Dispatching {} evaluation prompt(s) to '{}'",
            tracker.request_id(),
            requests.len(),
            self.model_function
        );

        let total = requests.len();
        let mut results = Vec::with_capacity(total);
        for (index, request) in requests.into_iter().enumerate() {
            tracker.advance(PipelineStage::Dispatching { index, total });
            self.pacer.ready().await;

            let result = match self.dispatch(&request).await {
                Ok(response) => EvaluationResult::success(request.dimension, response),
                Err(message) => {
                    warn!(
                        "[{}] Evaluation of {} failed: {}",
                        tracker.request_id(),
                        request.dimension,
                        message
                    );
                    if self.policy == DispatchPolicy::FailFast {
                        return Err(PipelineError::Inference {
                            dimension: request.dimension.to_string(),
                            message,
                        });
                    }
                    EvaluationResult::failure(request.dimension)
                }
            };
            results.push(result);
        }

        tracker.advance(PipelineStage::Aggregated);
        let summary = EvaluationSummary {
            message: EVALUATIONS_PASSED.to_string(),
            results,
        };
        info!(
            "[{}] Evaluation finished: {} succeeded, {} failed",
            tracker.request_id(),
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    /// One call to the model entry point; the error detail is for logs only.
    async fn dispatch(&self, request: &EvaluationRequest) -> Result<Value, String> {
        let payload = json!({
            "prompt": request.prompt,
            "function_name": request.dimension.as_str(),
        });

        match self.invoker.invoke(&self.model_function, payload).await {
            Ok(envelope) if envelope.is_success() => Ok(envelope.body_json()),
            Ok(envelope) => Err(format!(
                "model function answered {}: {}",
                envelope.status_code,
                envelope.error_message().unwrap_or_default()
            )),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[async_trait]
impl EntryPoint for EvaluationHandler {
    fn name(&self) -> &str {
        &self.function_name
    }

    async fn handle(&self, event: Value) -> ResponseEnvelope {
        let mut tracker = StageTracker::new(&self.function_name);

        let result = match EvaluationTrigger::from_event(&event) {
            Ok(trigger) => self.evaluate(&trigger, &mut tracker).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(summary) => {
                tracker.advance(PipelineStage::Responded);
                ResponseEnvelope::ok(&summary)
            }
            Err(e) => {
                error!("[{}] Evaluation failed: {}", tracker.request_id(), e);
                tracker.fail(error_kind(&e));
                ResponseEnvelope::from(&e)
            }
        }
    }
}
