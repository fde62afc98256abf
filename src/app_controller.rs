use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::app_config::{Config, InvocationMode};
use crate::handlers::{
    AnnotationHandler, ConversionHandler, ConversionRequest, EvaluationHandler, ModelEndpoint, ModelHandler,
    ResponseEnvelope, CONVERTER_FUNCTION,
};
use crate::invocation::{FunctionInvoker, HttpInvoker, LocalInvoker, SharedInvoker};
use crate::providers::build_provider;
use crate::screenplay::{FlattenedScript, ScriptDocument};
use crate::storage::{build_store, ObjectStore};

// @module: Application controller wiring storage, models and entry points

/// Main application controller for the screenplay pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Shared object store
    store: Arc<dyn ObjectStore>,

    // @field: In-process entry points
    functions: LocalInvoker,
}

impl Controller {
    /// Create a new controller for test purposes: memory storage, mock models, no pacing
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::for_dry_run())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let store = build_store(&config.storage);
        let models = config
            .models
            .iter()
            .map(|model| ModelEndpoint {
                config: model.clone(),
                provider: build_provider(model),
            })
            .collect();

        Self::with_components(config, store, models)
    }

    /// Create a controller around explicit storage and model clients
    pub fn with_components(config: Config, store: Arc<dyn ObjectStore>, models: Vec<ModelEndpoint>) -> Result<Self> {
        let functions = LocalInvoker::new();

        // Downstream calls go through this invoker; the CLI always enters in process
        let downstream: SharedInvoker = match config.invocation.mode {
            InvocationMode::InProcess => Arc::new(functions.downgrade()),
            InvocationMode::Http => Arc::new(
                HttpInvoker::new(&config.invocation.base_url, config.invocation.timeout_secs)
                    .context("Failed to create HTTP invoker")?,
            ),
        };

        let annotation_model = models
            .iter()
            .find(|m| m.config.prefix == config.annotation.model_prefix)
            .cloned()
            .ok_or_else(|| anyhow!("Annotation model '{}' is not configured", config.annotation.model_prefix))?;

        functions.register(Arc::new(ModelHandler::new(models, Arc::clone(&store), &config)));
        functions.register(Arc::new(EvaluationHandler::new(Arc::clone(&store), Arc::clone(&downstream), &config)));
        functions.register(Arc::new(AnnotationHandler::new(
            Arc::clone(&store),
            annotation_model.config,
            annotation_model.provider,
            &config,
        )));
        functions.register(Arc::new(ConversionHandler::new(Arc::clone(&store), downstream, &config)));

        debug!("Registered entry points: {:?}", functions.function_names());

        Ok(Self { config, store, functions })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    /// Names of the entry points available to `invoke`
    pub fn function_names(&self) -> Vec<String> {
        self.functions.function_names()
    }

    /// Run an entry point on a JSON event
    pub async fn invoke(&self, function: &str, event: Value) -> Result<ResponseEnvelope> {
        info!("Invoking entry point '{}'", function);
        self.functions
            .invoke(function, event)
            .await
            .with_context(|| format!("Failed to invoke '{}'", function))
    }

    /// Upload a local screenplay through the conversion entry point
    pub async fn convert_file(&self, path: &Path) -> Result<ResponseEnvelope> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read screenplay: {:?}", path))?;
        info!("Converting {:?} ({} bytes)", path, bytes.len());

        let event = serde_json::to_value(ConversionRequest::from_bytes(&bytes))
            .context("Failed to build conversion event")?;
        self.invoke(CONVERTER_FUNCTION, event).await
    }

    /// Sanitize and flatten a local screenplay without storing or evaluating it
    pub fn flatten_file(&self, path: &Path) -> Result<FlattenedScript> {
        flatten_file(path, &self.config.evaluation.annotation_tag)
    }
}

/// Sanitize and flatten a local screenplay.
///
/// Needs no storage and no models, so it works without a validated configuration.
pub fn flatten_file(path: &Path, annotation_tag: &str) -> Result<FlattenedScript> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read screenplay: {:?}", path))?;
    let mut document =
        ScriptDocument::parse_bytes(&bytes).with_context(|| format!("Failed to parse screenplay: {:?}", path))?;
    let removed = document.sanitize(annotation_tag);
    debug!("Removed {} annotation(s) from {:?}", removed, path);

    Ok(FlattenedScript::from_document(&document))
}
