use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::PipelineError;

/// Response of every entry point: `{"statusCode": <int>, "body": "<json>"}`.
///
/// `body` is a JSON document serialized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl ResponseEnvelope {
    /// Build an envelope around any serializable body.
    pub fn new(status_code: u16, body: &impl Serialize) -> Self {
        let body = serde_json::to_string(body)
            .unwrap_or_else(|e| json!({ "error": format!("Unserializable body: {}", e) }).to_string());
        Self { status_code, body }
    }

    /// 200 with the given body.
    pub fn ok(body: &impl Serialize) -> Self {
        Self::new(200, body)
    }

    /// Error envelope with `{"error": message}`.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(status_code, &json!({ "error": message.into() }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Parse the body string back into JSON.
    ///
    /// Bodies that are not JSON are returned as a JSON string.
    pub fn body_json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }

    /// The error message of an error envelope, if any.
    pub fn error_message(&self) -> Option<String> {
        self.body_json()
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn to_value(&self) -> Value {
        json!({ "statusCode": self.status_code, "body": self.body })
    }
}

impl From<&PipelineError> for ResponseEnvelope {
    fn from(error: &PipelineError) -> Self {
        Self::error(error.status_code(), error.public_message())
    }
}

impl From<PipelineError> for ResponseEnvelope {
    fn from(error: PipelineError) -> Self {
        Self::from(&error)
    }
}
