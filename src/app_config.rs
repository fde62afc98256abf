use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::evaluation::Dimension;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Object storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Evaluation dispatch settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Models every evaluation prompt is sent to
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,

    /// Script annotation settings
    #[serde(default)]
    pub annotation: AnnotationConfig,

    /// How entry points reach each other
    #[serde(default)]
    pub invocation: InvocationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Storage backend type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    // @backend: one directory per bucket under root_dir
    #[default]
    Local,
    // @backend: process memory, lost on exit
    Memory,
}

/// Object storage configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: StorageBackendKind,

    /// Root directory for the local backend (defaults to the user data dir)
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Bucket receiving the uploaded script and its flattened form
    #[serde(default = "default_upload_bucket")]
    pub upload_bucket: String,

    /// Bucket receiving raw model responses
    #[serde(default = "default_response_bucket")]
    pub response_bucket: String,

    /// Key of the original uploaded document
    #[serde(default = "default_original_key")]
    pub original_key: String,

    /// Key of the flattened script JSON
    #[serde(default = "default_flattened_key")]
    pub flattened_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            root_dir: None,
            upload_bucket: default_upload_bucket(),
            response_bucket: default_response_bucket(),
            original_key: default_original_key(),
            flattened_key: default_flattened_key(),
        }
    }
}

impl StorageConfig {
    /// Resolve the local storage root
    pub fn resolved_root_dir(&self) -> PathBuf {
        self.root_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("storyfy")
        })
    }
}

/// What the dispatch loop does when one dimension fails
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Record the failed dimension as absent and continue
    #[default]
    BestEffort,
    /// Abort the whole request on the first failure
    FailFast,
}

/// Evaluation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EvaluationConfig {
    /// Dimensions rendered and dispatched, in order
    #[serde(default = "default_enabled_dimensions")]
    pub enabled_dimensions: Vec<Dimension>,

    /// Failure policy of the dispatch loop
    #[serde(default)]
    pub dispatch_policy: DispatchPolicy,

    /// Minimum interval between consecutive model calls in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Tag of annotation nodes stripped before flattening
    #[serde(default = "default_annotation_tag")]
    pub annotation_tag: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            enabled_dimensions: default_enabled_dimensions(),
            dispatch_policy: DispatchPolicy::default(),
            min_interval_ms: default_min_interval_ms(),
            annotation_tag: default_annotation_tag(),
        }
    }
}

impl EvaluationConfig {
    /// Minimum interval as a duration
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Model provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Anthropic
    #[default]
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: Mock (dry runs)
    Mock,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::Mock => "Mock",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// One model the evaluation prompts are sent to
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    // @field: Label used in response keys, e.g. "claude"
    pub prefix: String,

    // @field: Provider type
    #[serde(default)]
    pub provider: ProviderKind,

    // @field: Model identifier
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Generation budget
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    // @field: HTTP read timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ModelConfig {
    // @param provider: Provider enum
    // @returns: Model config with defaults
    pub fn new(prefix: &str, provider: ProviderKind) -> Self {
        let (model, endpoint) = Self::provider_defaults(&provider);
        Self {
            prefix: prefix.to_string(),
            provider,
            model,
            endpoint,
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            timeout_secs: default_timeout_secs(),
        }
    }

    // @returns: Default (model, endpoint) of a provider
    fn provider_defaults(provider: &ProviderKind) -> (String, String) {
        match provider {
            ProviderKind::Anthropic => (default_anthropic_model(), default_anthropic_endpoint()),
            ProviderKind::Ollama => (default_ollama_model(), default_ollama_endpoint()),
            ProviderKind::Mock => ("mock".to_string(), String::new()),
        }
    }

    /// Fill an empty model name or endpoint with the provider's default
    pub fn fill_provider_defaults(&mut self) {
        let (model, endpoint) = Self::provider_defaults(&self.provider);
        if self.model.trim().is_empty() {
            self.model = model;
        }
        if self.endpoint.trim().is_empty() {
            self.endpoint = endpoint;
        }
    }
}

/// Script annotation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnnotationConfig {
    /// Prefix of the model (from `models`) used for labelling
    #[serde(default = "default_annotation_model")]
    pub model_prefix: String,

    /// Generation budget for annotation
    #[serde(default = "default_annotation_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            model_prefix: default_annotation_model(),
            max_tokens: default_annotation_max_tokens(),
        }
    }
}

/// Invocation transport
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    /// Route calls to handlers in this process
    #[default]
    InProcess,
    /// POST to `{base_url}/{function}`
    Http,
}

/// Names and transport of the entry points
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvocationConfig {
    #[serde(default)]
    pub mode: InvocationMode,

    /// Base URL for HTTP mode
    #[serde(default = "String::new")]
    pub base_url: String,

    #[serde(default = "default_evaluator_function")]
    pub evaluator_function: String,

    #[serde(default = "default_model_function")]
    pub model_function: String,

    #[serde(default = "default_annotation_function")]
    pub annotation_function: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            mode: InvocationMode::default(),
            base_url: String::new(),
            evaluator_function: default_evaluator_function(),
            model_function: default_model_function(),
            annotation_function: default_annotation_function(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Environment variable overriding the upload bucket
pub const BUCKET_ENV: &str = "S3_BUCKET_NAME";

/// Environment variable overriding the evaluator function name
pub const EVALUATOR_ENV: &str = "EVALUATOR_FUNCTION";

fn default_upload_bucket() -> String {
    "storyfyscripts".to_string()
}

fn default_response_bucket() -> String {
    "storifyresponse".to_string()
}

fn default_original_key() -> String {
    "uploaded_script.fdx".to_string()
}

fn default_flattened_key() -> String {
    "converted_file.json".to_string()
}

fn default_enabled_dimensions() -> Vec<Dimension> {
    vec![Dimension::PlotStructure]
}

fn default_min_interval_ms() -> u64 {
    6000 // pause between consecutive model calls
}

fn default_annotation_tag() -> String {
    "ScriptNote".to_string()
}

fn default_max_tokens() -> u32 {
    600
}

fn default_annotation_max_tokens() -> u32 {
    800
}

fn default_temperature() -> f32 {
    0.5
}

fn default_top_p() -> f32 {
    0.9
}

fn default_top_k() -> u32 {
    50
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

fn default_ollama_model() -> String {
    "mistral:7b-instruct".to_string()
}

fn default_annotation_model() -> String {
    "mistral".to_string()
}

fn default_evaluator_function() -> String {
    "script_evaluator".to_string()
}

fn default_model_function() -> String {
    "call_model".to_string()
}

fn default_annotation_function() -> String {
    "annotate_script".to_string()
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig::new("claude", ProviderKind::Anthropic),
        ModelConfig::new("mistral", ProviderKind::Ollama),
    ]
}

impl Config {
    /// Load a configuration file, creating it with defaults when missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let mut config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.models.iter_mut().for_each(ModelConfig::fill_provider_defaults);
            Ok(config)
        } else {
            let config = Config::default();
            let config_json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;
            std::fs::write(path, config_json)
                .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
            Ok(config)
        }
    }

    /// Apply environment overrides for the bucket and evaluator function name
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(BUCKET_ENV).ok(),
            std::env::var(EVALUATOR_ENV).ok(),
        );
    }

    /// Apply explicit overrides; empty values are ignored
    pub fn apply_overrides(&mut self, bucket: Option<String>, evaluator_function: Option<String>) {
        if let Some(bucket) = bucket.filter(|b| !b.trim().is_empty()) {
            self.storage.upload_bucket = bucket;
        }
        if let Some(function) = evaluator_function.filter(|f| !f.trim().is_empty()) {
            self.invocation.evaluator_function = function;
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.storage.upload_bucket.trim().is_empty() || self.storage.response_bucket.trim().is_empty() {
            return Err(anyhow!("Storage buckets must not be empty"));
        }
        if self.storage.original_key.trim().is_empty() || self.storage.flattened_key.trim().is_empty() {
            return Err(anyhow!("Storage keys must not be empty"));
        }
        if self.models.is_empty() {
            return Err(anyhow!("At least one model must be configured"));
        }
        if self.evaluation.annotation_tag.trim().is_empty() {
            return Err(anyhow!("Annotation tag must not be empty"));
        }

        for (index, model) in self.models.iter().enumerate() {
            if model.prefix.trim().is_empty() {
                return Err(anyhow!("Model #{} has an empty prefix", index + 1));
            }
            if self.models.iter().filter(|m| m.prefix == model.prefix).count() > 1 {
                return Err(anyhow!("Duplicate model prefix: {}", model.prefix));
            }
            if model.max_tokens == 0 {
                return Err(anyhow!("max_tokens must be positive for model {}", model.prefix));
            }
            if !(0.0..=1.0).contains(&model.temperature) || !(0.0..=1.0).contains(&model.top_p) {
                return Err(anyhow!("temperature and top_p must be within 0.0..=1.0 for model {}", model.prefix));
            }
            // Validate API key for Anthropic models
            if model.provider == ProviderKind::Anthropic && model.api_key.is_empty() {
                return Err(anyhow!("API key is required for Anthropic model {}", model.prefix));
            }
            if model.provider == ProviderKind::Ollama && url::Url::parse(&model.endpoint).is_err() {
                return Err(anyhow!("Invalid Ollama endpoint for model {}: {}", model.prefix, model.endpoint));
            }
        }

        if self.model(&self.annotation.model_prefix).is_none() {
            return Err(anyhow!("Annotation model '{}' is not among the configured models", self.annotation.model_prefix));
        }

        if self.invocation.mode == InvocationMode::Http {
            url::Url::parse(&self.invocation.base_url)
                .map_err(|e| anyhow!("Invalid invocation base_url '{}': {}", self.invocation.base_url, e))?;
        }

        Ok(())
    }

    /// Look up a model by prefix
    pub fn model(&self, prefix: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.prefix == prefix)
    }

    /// Configuration for offline runs: in-memory storage, mock models, no pacing
    pub fn for_dry_run() -> Self {
        let mut config = Config::default();
        config.storage.backend = StorageBackendKind::Memory;
        config.evaluation.min_interval_ms = 0;
        config.models = vec![
            ModelConfig::new("claude", ProviderKind::Mock),
            ModelConfig::new("mistral", ProviderKind::Mock),
        ];
        config
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            storage: StorageConfig::default(),
            evaluation: EvaluationConfig::default(),
            models: default_models(),
            annotation: AnnotationConfig::default(),
            invocation: InvocationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
