/*!
 * Script annotation entry point.
 *
 * Triggered by a storage notification: reads the script, asks the
 * annotation model to label it (scene headings, characters, lines...) and
 * returns the generated text as the body.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info};
use serde_json::Value;

use super::conversion::error_kind;
use super::envelope::ResponseEnvelope;
use super::events::ObjectLocation;
use super::stage::{PipelineStage, StageTracker};
use crate::app_config::{Config, ModelConfig};
use crate::errors::{PipelineError, ProviderError};
use crate::evaluation::PromptTemplate;
use crate::invocation::EntryPoint;
use crate::providers::{Completion, CompletionRequest, Provider};
use crate::storage::ObjectStore;

/// Body returned when the model produced nothing
pub const NO_GENERATION: &str = "No generation found in response.";

pub struct AnnotationHandler {
    function_name: String,
    store: Arc<dyn ObjectStore>,
    model: ModelConfig,
    provider: Arc<dyn Provider>,
    max_tokens: u32,
}

impl AnnotationHandler {
    pub fn new(store: Arc<dyn ObjectStore>, model: ModelConfig, provider: Arc<dyn Provider>, config: &Config) -> Self {
        Self {
            function_name: config.invocation.annotation_function.clone(),
            store,
            model,
            provider,
            max_tokens: config.annotation.max_tokens,
        }
    }

    /// Label the script stored at `location`; returns the generated text.
    pub async fn annotate(&self, location: &ObjectLocation, tracker: &mut StageTracker) -> Result<String, PipelineError> {
        let bytes = self.store.get(&location.bucket, &location.key).await?;
        let script = String::from_utf8(bytes.to_vec())
            .map_err(|e| PipelineError::Unexpected(format!("Stored script {} is not UTF-8: {}", location, e)))?;
        info!("[{}] File content read from {}", tracker.request_id(), location);

        let prompt = PromptTemplate::script_annotator().render(&script);
        let request = CompletionRequest::for_model(prompt, &self.model).max_tokens(self.max_tokens);

        tracker.advance(PipelineStage::Dispatching { index: 0, total: 1 });
        let generation = match self.provider.complete(&request).await {
            Ok(completion) => generation_text(&completion),
            Err(ProviderError::EmptyResponse) => NO_GENERATION.to_string(),
            Err(e) => {
                return Err(PipelineError::Inference {
                    dimension: self.function_name.clone(),
                    message: e.to_string(),
                });
            }
        };
        tracker.advance(PipelineStage::Aggregated);
        Ok(generation)
    }
}

/// `generation` field of the raw payload, then the extracted text.
fn generation_text(completion: &Completion) -> String {
    completion
        .raw
        .get("generation")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|text| !text.is_empty())
        .or_else(|| Some(completion.text.clone()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| NO_GENERATION.to_string())
}

#[async_trait]
impl EntryPoint for AnnotationHandler {
    fn name(&self) -> &str {
        &self.function_name
    }

    async fn handle(&self, event: Value) -> ResponseEnvelope {
        let mut tracker = StageTracker::new(&self.function_name);

        let result = match ObjectLocation::from_event(&event) {
            Ok(location) => self.annotate(&location, &mut tracker).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(generation) => {
                tracker.advance(PipelineStage::Responded);
                ResponseEnvelope::ok(&generation)
            }
            Err(e) => {
                error!("[{}] Annotation failed: {}", tracker.request_id(), e);
                tracker.fail(error_kind(&e));
                ResponseEnvelope::from(&e)
            }
        }
    }
}
