/*!
 * Conversion entry point.
 *
 * Receives a base64-encoded Final Draft file, keeps the original, turns it
 * into a flattened script, stores that too and hands it to the evaluator.
 * The evaluator's envelope is returned verbatim inside the 200 body.
 */

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::envelope::ResponseEnvelope;
use super::stage::{PipelineStage, StageTracker};
use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::invocation::{EntryPoint, SharedInvoker};
use crate::screenplay::{FlattenedScript, ScriptDocument};
use crate::storage::{ObjectStore, CONTENT_TYPE_JSON, CONTENT_TYPE_XML};

/// Default name of the conversion entry point
pub const CONVERTER_FUNCTION: &str = "storyfy_converter";

/// Conversion trigger: `{"body": "<base64 .fdx>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub body: String,
}

impl ConversionRequest {
    /// Encode raw file bytes into a request.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            body: STANDARD.encode(bytes),
        }
    }

    /// Validate an incoming event.
    pub fn from_event(event: &Value) -> Result<Self, PipelineError> {
        let body = event
            .get("body")
            .ok_or_else(|| PipelineError::InvalidInput("Missing 'body' in event".to_string()))?;
        let body = body
            .as_str()
            .ok_or_else(|| PipelineError::InvalidInput("'body' must be a base64 string".to_string()))?;
        Ok(Self { body: body.to_string() })
    }

    /// Decode the file content.
    pub fn decode(&self) -> Result<Vec<u8>, PipelineError> {
        STANDARD
            .decode(self.body.trim())
            .map_err(|e| PipelineError::InvalidInput(format!("Invalid base64 body: {}", e)))
    }
}

/// Converts uploads and forwards them for evaluation.
pub struct ConversionHandler {
    store: Arc<dyn ObjectStore>,
    invoker: SharedInvoker,
    upload_bucket: String,
    original_key: String,
    flattened_key: String,
    annotation_tag: String,
    evaluator_function: String,
}

impl ConversionHandler {
    pub fn new(store: Arc<dyn ObjectStore>, invoker: SharedInvoker, config: &Config) -> Self {
        Self {
            store,
            invoker,
            upload_bucket: config.storage.upload_bucket.clone(),
            original_key: config.storage.original_key.clone(),
            flattened_key: config.storage.flattened_key.clone(),
            annotation_tag: config.evaluation.annotation_tag.clone(),
            evaluator_function: config.invocation.evaluator_function.clone(),
        }
    }

    /// Run the whole conversion for one request.
    pub async fn convert(
        &self,
        request: &ConversionRequest,
        tracker: &mut StageTracker,
    ) -> Result<ResponseEnvelope, PipelineError> {
        let request_id = tracker.request_id();
        let file_content = request.decode()?;

        self.store
            .put(
                &self.upload_bucket,
                &self.original_key,
                Bytes::from(file_content.clone()),
                CONTENT_TYPE_XML,
            )
            .await?;
        info!("[{}] File uploaded to storage: {}/{}", request_id, self.upload_bucket, self.original_key);
        tracker.advance(PipelineStage::StoredOriginal);

        let mut document = ScriptDocument::parse_bytes(&file_content)?;
        let removed = document.sanitize(&self.annotation_tag);
        info!("[{}] Removed {} '{}' annotation(s)", request_id, removed, self.annotation_tag);
        tracker.advance(PipelineStage::Sanitized);

        let script = FlattenedScript::from_document(&document);
        info!("[{}] Flattened script into {} line(s)", request_id, script.len());
        tracker.advance(PipelineStage::Flattened);

        self.store_flattened(&script, tracker).await;

        let payload = serde_json::to_value(&script)
            .map_err(|e| PipelineError::Unexpected(format!("Failed to serialize script: {}", e)))?;
        tracker.advance(PipelineStage::Dispatching { index: 0, total: 1 });
        let evaluator_response = self.invoker.invoke(&self.evaluator_function, payload).await?;
        info!(
            "[{}] Evaluator '{}' answered with status {}",
            request_id, self.evaluator_function, evaluator_response.status_code
        );
        tracker.advance(PipelineStage::Aggregated);

        Ok(ResponseEnvelope::ok(&evaluator_response.to_value()))
    }

    // Failures here are logged only; the evaluator receives the script directly.
    async fn store_flattened(&self, script: &FlattenedScript, tracker: &mut StageTracker) {
        let request_id = tracker.request_id();
        let json = match script.to_json_pretty() {
            Ok(json) => json,
            Err(e) => {
                warn!("[{}] Could not serialize flattened script: {}", request_id, e);
                return;
            }
        };

        match self
            .store
            .put(&self.upload_bucket, &self.flattened_key, Bytes::from(json), CONTENT_TYPE_JSON)
            .await
        {
            Ok(()) => {
                info!("[{}] File uploaded to storage: {}/{}", request_id, self.upload_bucket, self.flattened_key);
                tracker.advance(PipelineStage::StoredFlattened);
            }
            Err(e) => warn!("[{}] Failed to store flattened script: {}", request_id, e),
        }
    }
}

#[async_trait]
impl EntryPoint for ConversionHandler {
    fn name(&self) -> &str {
        CONVERTER_FUNCTION
    }

    async fn handle(&self, event: Value) -> ResponseEnvelope {
        let mut tracker = StageTracker::new(CONVERTER_FUNCTION);

        let result = match ConversionRequest::from_event(&event) {
            Ok(request) => self.convert(&request, &mut tracker).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(envelope) => {
                tracker.advance(PipelineStage::Responded);
                envelope
            }
            Err(e) => {
                error!("[{}] Conversion failed: {}", tracker.request_id(), e);
                tracker.fail(error_kind(&e));
                ResponseEnvelope::from(&e)
            }
        }
    }
}

/// Short label of an error variant for stage logging.
pub(crate) fn error_kind(error: &PipelineError) -> &'static str {
    match error {
        PipelineError::InvalidInput(_) => "invalid_input",
        PipelineError::Parse(_) => "parse",
        PipelineError::EventMetadata(_) => "event_metadata",
        PipelineError::Storage(_) => "storage",
        PipelineError::Inference { .. } => "inference",
        PipelineError::Invocation(_) => "invocation",
        PipelineError::Unexpected(_) => "unexpected",
    }
}
