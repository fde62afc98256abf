/*!
 * End-to-end tests of the conversion entry point
 */

use anyhow::Result;
use serde_json::{json, Value};

use storyfy::app_config::Config;
use storyfy::handlers::{ConversionRequest, CONVERTER_FUNCTION};
use storyfy::providers::mock::MockProvider;
use storyfy::screenplay::FlattenedScript;
use storyfy::storage::{ObjectStore, CONTENT_TYPE_JSON, CONTENT_TYPE_XML};
use storyfy::storage::MemoryStore;

use crate::common;

fn conversion_event(xml: &str) -> Value {
    serde_json::to_value(ConversionRequest::from_bytes(xml.as_bytes())).unwrap()
}

/// Decode the evaluator envelope nested in the converter's body
fn evaluator_body(body: &Value) -> Value {
    serde_json::from_str(body["body"].as_str().unwrap()).unwrap()
}

/// A valid upload is stored, flattened, evaluated and answered with 200
#[tokio::test]
async fn test_convert_validScreenplay_shouldStoreAndEvaluate() -> Result<()> {
    common::init_logging();
    let store = MemoryStore::new();
    let controller = common::controller_with(
        Config::for_dry_run(),
        &store,
        vec![MockProvider::working(), MockProvider::working()],
    )?;

    let envelope = controller.invoke(CONVERTER_FUNCTION, conversion_event(common::SAMPLE_FDX)).await?;

    assert_eq!(envelope.status_code, 200);
    let body = envelope.body_json();
    assert_eq!(body["statusCode"], 200);
    let evaluation = evaluator_body(&body);
    assert_eq!(evaluation["message"], "Evaluations passed!");
    assert_eq!(evaluation["results"][0]["function_name"], "plot_structure");
    assert_eq!(evaluation["results"][0]["rating"], 8);
    assert_eq!(evaluation["results"][0]["ratings"], json!({"claude": 8, "mistral": 8}));

    // Original upload, byte for byte
    let original = store.get("storyfyscripts", "uploaded_script.fdx").await?;
    assert_eq!(&original[..], common::SAMPLE_FDX.as_bytes());
    assert_eq!(store.content_type("storyfyscripts", "uploaded_script.fdx").as_deref(), Some(CONTENT_TYPE_XML));

    // Flattened script without the note
    let flattened = store.get("storyfyscripts", "converted_file.json").await?;
    let script = FlattenedScript::from_json(std::str::from_utf8(&flattened)?)?;
    assert_eq!(script.content, common::sample_lines());
    assert_eq!(store.content_type("storyfyscripts", "converted_file.json").as_deref(), Some(CONTENT_TYPE_JSON));

    // One raw response per model
    assert_eq!(
        store.keys("storifyresponse"),
        vec!["plot_structure_claude.txt".to_string(), "plot_structure_mistral.txt".to_string()]
    );
    Ok(())
}

/// The evaluation prompt carries the flattened script as JSON
#[tokio::test]
async fn test_convert_shouldSendFlattenedJsonInPrompt() -> Result<()> {
    let store = MemoryStore::new();
    let claude = MockProvider::working();
    let controller = common::controller_with(
        Config::for_dry_run(),
        &store,
        vec![claude.clone(), MockProvider::working()],
    )?;

    controller.invoke(CONVERTER_FUNCTION, conversion_event(common::SAMPLE_FDX)).await?;

    let prompts = claude.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(r#"{"content":["      INT. KITCHEN - NIGHT","#));
    assert!(!prompts[0].contains("Too moody?"));
    Ok(())
}

/// A missing body is a 400 before anything is stored
#[tokio::test]
async fn test_convert_missingBody_shouldReturn400() -> Result<()> {
    let store = MemoryStore::new();
    let controller = common::controller_with(
        Config::for_dry_run(),
        &store,
        vec![MockProvider::working(), MockProvider::working()],
    )?;

    let envelope = controller.invoke(CONVERTER_FUNCTION, json!({"file": "script.fdx"})).await?;

    assert_eq!(envelope.status_code, 400);
    assert_eq!(envelope.error_message().as_deref(), Some("Missing 'body' in event"));
    assert!(store.is_empty());
    Ok(())
}

/// Malformed XML is a 400 after the original was kept
#[tokio::test]
async fn test_convert_malformedXml_shouldReturn400AndKeepOriginal() -> Result<()> {
    let store = MemoryStore::new();
    let controller = common::controller_with(
        Config::for_dry_run(),
        &store,
        vec![MockProvider::working(), MockProvider::working()],
    )?;

    let envelope = controller
        .invoke(CONVERTER_FUNCTION, conversion_event("<FinalDraft><Content></FinalDraft>"))
        .await?;

    assert_eq!(envelope.status_code, 400);
    assert_eq!(envelope.error_message().as_deref(), Some("Invalid XML content"));
    assert_eq!(store.keys("storyfyscripts"), vec!["uploaded_script.fdx".to_string()]);
    assert!(store.keys("storifyresponse").is_empty());
    Ok(())
}

/// Body that is not base64 is rejected with 400
#[tokio::test]
async fn test_convert_invalidBase64_shouldReturn400() -> Result<()> {
    let controller = storyfy::Controller::new_for_test()?;

    let envelope = controller.invoke(CONVERTER_FUNCTION, json!({"body": "%%% not base64 %%%"})).await?;

    assert_eq!(envelope.status_code, 400);
    assert!(envelope.error_message().unwrap().starts_with("Invalid base64 body"));
    Ok(())
}

/// A failing model still yields a 200 conversion; the failure is inside the results
#[tokio::test]
async fn test_convert_oneModelFailing_shouldStillSucceed() -> Result<()> {
    let store = MemoryStore::new();
    let controller = common::controller_with(
        Config::for_dry_run(),
        &store,
        vec![MockProvider::failing(), MockProvider::working()],
    )?;

    let envelope = controller.invoke(CONVERTER_FUNCTION, conversion_event(common::SAMPLE_FDX)).await?;

    assert_eq!(envelope.status_code, 200);
    let evaluation = evaluator_body(&envelope.body_json());
    let model_results = &evaluation["results"][0]["response"]["results"];
    assert_eq!(model_results[0]["error"], storyfy::handlers::MODEL_CALL_FAILED);
    assert!(!envelope.body.contains("Simulated provider failure"));
    assert_eq!(model_results[1]["model"], "mistral");
    assert_eq!(store.keys("storifyresponse"), vec!["plot_structure_mistral.txt".to_string()]);
    Ok(())
}
