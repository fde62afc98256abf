/*!
 * Tests of the evaluation entry point's dispatch loop
 */

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use serde_json::json;

use storyfy::app_config::{Config, DispatchPolicy};
use storyfy::evaluation::{Dimension, EVALUATION_FAILED};
use storyfy::handlers::{EvaluationHandler, EvaluationSummary, ObjectLocation};
use storyfy::invocation::EntryPoint;
use storyfy::storage::{MemoryStore, ObjectStore};

use crate::common::mock_invoker::{FailureMode, ScriptedInvoker};

fn all_dimensions_config(policy: DispatchPolicy) -> Config {
    let mut config = Config::for_dry_run();
    config.evaluation.enabled_dimensions = Dimension::ALL.to_vec();
    config.evaluation.dispatch_policy = policy;
    config
}

fn handler(config: &Config, store: &MemoryStore, invoker: &ScriptedInvoker) -> EvaluationHandler {
    EvaluationHandler::new(Arc::new(store.clone()), Arc::new(invoker.clone()), config)
}

/// One failing dimension does not stop the others
#[tokio::test]
async fn test_evaluate_oneDimensionFailing_shouldStillDispatchTheRest() -> Result<()> {
    let config = all_dimensions_config(DispatchPolicy::BestEffort);
    let invoker = ScriptedInvoker::failing_for(&["character_development"], FailureMode::Transport);
    let handler = handler(&config, &MemoryStore::new(), &invoker);

    let envelope = handler.handle(json!({"content": ["  INT. HOUSE - DAY"]})).await;

    assert_eq!(envelope.status_code, 200);
    assert_eq!(
        invoker.dispatched_dimensions(),
        Dimension::ALL.iter().map(|d| d.as_str().to_string()).collect::<Vec<_>>()
    );

    let summary: EvaluationSummary = serde_json::from_str(&envelope.body)?;
    assert_eq!(summary.message, "Evaluations passed!");
    assert_eq!(summary.results.len(), 5);
    assert_eq!(summary.succeeded(), 4);
    let failed = &summary.results[1];
    assert_eq!(failed.dimension, Dimension::CharacterDevelopment);
    assert!(failed.response.is_none());
    assert_eq!(failed.error.as_deref(), Some(EVALUATION_FAILED));
    assert_eq!(summary.results[4].rating, Some(7));
    assert_eq!(summary.results[4].ratings.get("scripted"), Some(&7));
    Ok(())
}

/// A 500 envelope from the model function counts as a failure too
#[tokio::test]
async fn test_evaluate_errorEnvelope_shouldBeRecordedAsFailure() -> Result<()> {
    let config = all_dimensions_config(DispatchPolicy::BestEffort);
    let invoker = ScriptedInvoker::failing_for(&["plot_structure", "subplots_themes"], FailureMode::ErrorEnvelope);
    let handler = handler(&config, &MemoryStore::new(), &invoker);

    let envelope = handler.handle(json!({"content": ["FADE IN:"]})).await;

    let summary: EvaluationSummary = serde_json::from_str(&envelope.body)?;
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.results[0].error.as_deref(), Some(EVALUATION_FAILED));
    Ok(())
}

/// Transport and downstream error text stays in the logs
#[tokio::test]
async fn test_evaluate_failures_shouldNotExposeDetailsInBody() {
    let config = all_dimensions_config(DispatchPolicy::BestEffort);
    let transport = ScriptedInvoker::failing_for(&["plot_structure"], FailureMode::Transport);
    let downstream = ScriptedInvoker::failing_for(&["plot_structure"], FailureMode::ErrorEnvelope);

    for invoker in [transport, downstream] {
        let handler = handler(&config, &MemoryStore::new(), &invoker);
        let envelope = handler.handle(json!({"content": ["FADE IN:"]})).await;

        assert_eq!(envelope.status_code, 200);
        assert!(!envelope.body.contains("simulated failure"));
        assert!(!envelope.body.contains("model down"));
        assert!(envelope.body.contains(EVALUATION_FAILED));
    }
}

/// Fail-fast aborts at the first failure with an opaque 500
#[tokio::test]
async fn test_evaluate_failFast_shouldStopAtFirstFailure() {
    let config = all_dimensions_config(DispatchPolicy::FailFast);
    let invoker = ScriptedInvoker::failing_for(&["character_development"], FailureMode::Transport);
    let handler = handler(&config, &MemoryStore::new(), &invoker);

    let envelope = handler.handle(json!({"content": ["FADE IN:"]})).await;

    assert_eq!(envelope.status_code, 500);
    assert_eq!(envelope.error_message().as_deref(), Some("Internal server error"));
    assert_eq!(invoker.calls().len(), 2);
}

/// Calls go to the configured model function with the dimension as function_name
#[tokio::test]
async fn test_evaluate_shouldCallModelFunctionWithPromptAndDimension() {
    let mut config = Config::for_dry_run();
    config.invocation.model_function = "call_bedrock".to_string();
    let invoker = ScriptedInvoker::working();
    let handler = handler(&config, &MemoryStore::new(), &invoker);

    handler.handle(json!({"content": ["  EXT. PIER - DAWN"]})).await;

    let calls = invoker.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "call_bedrock");
    assert_eq!(calls[0].1["function_name"], "plot_structure");
    assert!(calls[0].1["prompt"].as_str().unwrap().contains("EXT. PIER - DAWN"));
}

/// A storage notification makes the evaluator read the stored script
#[tokio::test]
async fn test_evaluate_storageEvent_shouldReadStoredScript() -> Result<()> {
    let config = Config::for_dry_run();
    let store = MemoryStore::new();
    store
        .put("storyfyscripts", "converted_file.json", Bytes::from(r#"{"content": ["  STORED LINE"]}"#), "application/json")
        .await?;
    let invoker = ScriptedInvoker::working();
    let handler = handler(&config, &store, &invoker);

    let event = ObjectLocation::new("storyfyscripts", "converted_file.json").to_event();
    let envelope = handler.handle(event).await;

    assert_eq!(envelope.status_code, 200);
    assert!(invoker.calls()[0].1["prompt"].as_str().unwrap().contains("STORED LINE"));
    Ok(())
}

/// A record without an object key is a 500 naming the field
#[tokio::test]
async fn test_evaluate_recordMissingKey_shouldReturn500NamingField() {
    let config = Config::for_dry_run();
    let invoker = ScriptedInvoker::working();
    let handler = handler(&config, &MemoryStore::new(), &invoker);

    let event = json!({"Records": [{"s3": {"bucket": {"name": "storyfyscripts"}, "object": {}}}]});
    let envelope = handler.handle(event).await;

    assert_eq!(envelope.status_code, 500);
    assert!(envelope.error_message().unwrap().contains("'key'"));
    assert!(invoker.calls().is_empty());
}

/// An event that is neither a script nor a notification is a 400
#[tokio::test]
async fn test_evaluate_missingRecords_shouldReturn400() {
    let config = Config::for_dry_run();
    let invoker = ScriptedInvoker::working();
    let handler = handler(&config, &MemoryStore::new(), &invoker);

    let envelope = handler.handle(json!({"detail": "nothing here"})).await;

    assert_eq!(envelope.status_code, 400);
    assert_eq!(
        envelope.error_message().as_deref(),
        Some("Invalid event format: No records found.")
    );
}

/// A notification for an absent object is a 500 mentioning it
#[tokio::test]
async fn test_evaluate_missingStoredObject_shouldReturn500() {
    let config = Config::for_dry_run();
    let invoker = ScriptedInvoker::working();
    let handler = handler(&config, &MemoryStore::new(), &invoker);

    let envelope = handler
        .handle(ObjectLocation::new("storyfyscripts", "gone.json").to_event())
        .await;

    assert_eq!(envelope.status_code, 500);
    assert!(envelope.error_message().unwrap().contains("storyfyscripts/gone.json"));
}

/// Consecutive model calls are spaced by the configured interval
#[tokio::test(start_paused = true)]
async fn test_evaluate_shouldPaceConsecutiveCalls() {
    let mut config = all_dimensions_config(DispatchPolicy::BestEffort);
    config.evaluation.min_interval_ms = 6000;
    let invoker = ScriptedInvoker::working();
    let handler = handler(&config, &MemoryStore::new(), &invoker);
    let start = tokio::time::Instant::now();

    handler.handle(json!({"content": ["FADE IN:"]})).await;

    assert_eq!(invoker.calls().len(), 5);
    assert!(start.elapsed() >= std::time::Duration::from_millis(4 * 6000));
}
