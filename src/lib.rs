/*!
 * # Storyfy - screenplay coverage pipeline
 *
 * A Rust library that turns Final Draft screenplays into structured text and
 * sends it to large language models for automated script coverage.
 *
 * ## Features
 *
 * - Parse Final Draft (`.fdx`) XML screenplays
 * - Strip script notes at any depth
 * - Flatten the document into indented text lines
 * - Render coverage prompts for five dimensions:
 *   plot, character, dialogue, themes and originality
 * - Fan prompts out to several models (Anthropic, Ollama) and keep every answer
 * - Label scripts (scene headings, characters, lines, transitions)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `screenplay`: Document model, annotation removal and flattening
 * - `evaluation`: Coverage dimensions, prompt templates and rating extraction
 * - `handlers`: The entry points (conversion, evaluation, model, annotation)
 * - `invocation`: Calling entry points in process or over HTTP
 * - `storage`: Object storage backends (memory, local filesystem)
 * - `pacing`: Minimum interval between model calls
 * - `providers`: Client implementations for model providers:
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scripted provider for tests and dry runs
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod evaluation;
pub mod handlers;
pub mod invocation;
pub mod pacing;
pub mod providers;
pub mod screenplay;
pub mod storage;

// Re-export main types for easier usage
pub use app_config::{Config, DispatchPolicy};
pub use app_controller::Controller;
pub use errors::{InvocationError, PipelineError, ProviderError, StorageError};
pub use evaluation::{Dimension, EvaluationPromptBuilder, EvaluationRequest, EvaluationResult};
pub use handlers::ResponseEnvelope;
pub use screenplay::{extract_script, FlattenedScript, ScriptDocument, ScriptNode};
