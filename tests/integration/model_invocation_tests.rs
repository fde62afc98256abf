/*!
 * Tests of the model invocation and annotation entry points
 */

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use serde_json::json;

use storyfy::app_config::Config;
use storyfy::handlers::{AnnotationHandler, ModelHandler, ObjectLocation, MODEL_CALL_FAILED};
use storyfy::invocation::EntryPoint;
use storyfy::providers::mock::MockProvider;
use storyfy::storage::{MemoryStore, ObjectStore};

use crate::common;

fn model_handler(store: &MemoryStore, providers: Vec<MockProvider>) -> ModelHandler {
    let config = Config::for_dry_run();
    ModelHandler::new(common::mock_endpoints(&config, providers), Arc::new(store.clone()), &config)
}

/// Every model answers and every answer is kept under {function}_{model}.txt
#[tokio::test]
async fn test_callModel_singleRequest_shouldFanOutAndPersist() -> Result<()> {
    let store = MemoryStore::new();
    let (claude, mistral) = (MockProvider::working(), MockProvider::working());
    let handler = model_handler(&store, vec![claude.clone(), mistral.clone()]);

    let envelope = handler
        .handle(json!({"prompt": "Evaluate this", "function_name": "dialogue_interactions"}))
        .await;

    assert_eq!(envelope.status_code, 200);
    let body = envelope.body_json();
    assert_eq!(body["status"], "processing complete");
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(claude.request_count(), 1);
    assert_eq!(mistral.request_count(), 1);

    let saved = store.get("storifyresponse", "dialogue_interactions_claude.txt").await?;
    let saved: serde_json::Value = serde_json::from_slice(&saved)?;
    assert_eq!(saved["model"], "claude");
    assert!(saved["generation"].as_str().unwrap().contains("8/10"));
    Ok(())
}

/// A batch is processed in order, every request reaching every model
#[tokio::test]
async fn test_callModel_batch_shouldProcessEachRequest() {
    let store = MemoryStore::new();
    let claude = MockProvider::working();
    let handler = model_handler(&store, vec![claude.clone(), MockProvider::working()]);

    let envelope = handler
        .handle(json!([
            {"prompt": "first", "function_name": "plot_structure"},
            {"prompt": "second", "function_name": "subplots_themes"}
        ]))
        .await;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(claude.prompts(), vec!["first".to_string(), "second".to_string()]);
    assert_eq!(store.keys("storifyresponse").len(), 4);
}

/// A failing model is recorded and skipped
#[tokio::test]
async fn test_callModel_oneModelFailing_shouldRecordErrorAndContinue() {
    let store = MemoryStore::new();
    let mistral = MockProvider::working();
    let handler = model_handler(&store, vec![MockProvider::failing(), mistral.clone()]);

    let envelope = handler
        .handle(json!({"prompt": "Evaluate", "function_name": "plot_structure"}))
        .await;

    assert_eq!(envelope.status_code, 200);
    let body = envelope.body_json();
    assert_eq!(body["results"][0]["model"], "claude");
    assert_eq!(body["results"][0]["error"], MODEL_CALL_FAILED);
    assert!(!envelope.body.contains("Simulated provider failure"));
    assert_eq!(mistral.request_count(), 1);
    assert_eq!(store.keys("storifyresponse"), vec!["plot_structure_mistral.txt".to_string()]);
}

/// When no model answers at all the call is a 500
#[tokio::test]
async fn test_callModel_allModelsFailing_shouldReturn500() {
    let store = MemoryStore::new();
    let handler = model_handler(&store, vec![MockProvider::failing(), MockProvider::empty()]);

    let envelope = handler
        .handle(json!({"prompt": "Evaluate", "function_name": "plot_structure"}))
        .await;

    assert_eq!(envelope.status_code, 500);
    assert_eq!(envelope.error_message().as_deref(), Some("Internal server error"));
    assert!(!envelope.body.contains("Simulated provider failure"));
    assert!(!envelope.body.contains("results"));
    assert!(store.is_empty());
}

/// Requests without a prompt are rejected before any model call
#[tokio::test]
async fn test_callModel_missingPrompt_shouldReturn400() {
    let claude = MockProvider::working();
    let handler = model_handler(&MemoryStore::new(), vec![claude.clone(), MockProvider::working()]);

    let envelope = handler.handle(json!({"function_name": "plot_structure"})).await;

    assert_eq!(envelope.status_code, 400);
    assert_eq!(claude.request_count(), 0);
}

fn annotation_handler(store: &MemoryStore, provider: MockProvider) -> AnnotationHandler {
    let config = Config::for_dry_run();
    let model = config.model("mistral").cloned().unwrap();
    AnnotationHandler::new(Arc::new(store.clone()), model, Arc::new(provider.named("mistral")), &config)
}

/// The stored script is labelled and the generation returned as the body
#[tokio::test]
async fn test_annotate_storedScript_shouldReturnGeneration() -> Result<()> {
    let store = MemoryStore::new();
    store
        .put("storyfyscripts", "uploaded_script.fdx", Bytes::from(common::SAMPLE_FDX), "application/xml")
        .await?;
    let provider = MockProvider::working().with_custom_response(|_| "[SCENE HEADING: INT. KITCHEN - NIGHT]".to_string());
    let handler = annotation_handler(&store, provider.clone());

    let envelope = handler
        .handle(ObjectLocation::new("storyfyscripts", "uploaded_script.fdx").to_event())
        .await;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(envelope.body_json(), json!("[SCENE HEADING: INT. KITCHEN - NIGHT]"));
    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("**[SCENE HEADING: ...]**"));
    assert!(prompt.contains("INT. KITCHEN - NIGHT"));
    Ok(())
}

/// An empty generation falls back to the fixed message
#[tokio::test]
async fn test_annotate_emptyGeneration_shouldReturnFallbackMessage() -> Result<()> {
    let store = MemoryStore::new();
    store.put("scripts", "s.fdx", Bytes::from("FADE IN:"), "text/plain").await?;
    let handler = annotation_handler(&store, MockProvider::empty());

    let envelope = handler.handle(ObjectLocation::new("scripts", "s.fdx").to_event()).await;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(envelope.body_json(), json!("No generation found in response."));
    Ok(())
}

/// Annotation needs a storage notification
#[tokio::test]
async fn test_annotate_withoutRecords_shouldReturn400() {
    let handler = annotation_handler(&MemoryStore::new(), MockProvider::working());

    let envelope = handler.handle(json!({"body": "..."})).await;

    assert_eq!(envelope.status_code, 400);
}
