/*!
 * Storage notification events.
 *
 * Object-created notifications look like
 * `{"Records": [{"s3": {"bucket": {"name": ...}, "object": {"key": ...}}}]}`.
 * Only the first record is used.
 */

use serde_json::Value;

use crate::errors::PipelineError;

/// Message returned when an event carries no `Records`
pub const NO_RECORDS_MESSAGE: &str = "Invalid event format: No records found.";

/// Bucket and key named by a storage notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Read the first record of a storage notification.
    ///
    /// A missing `Records` array is an input error (400); a record lacking
    /// one of the nested fields is an `EventMetadata` error naming it (500).
    pub fn from_event(event: &Value) -> Result<Self, PipelineError> {
        let records = event
            .get("Records")
            .ok_or_else(|| PipelineError::InvalidInput(NO_RECORDS_MESSAGE.to_string()))?;

        let record = records.get(0).ok_or(PipelineError::EventMetadata("Records[0]"))?;
        let s3 = field(record, "s3")?;
        let bucket = string_field(field(s3, "bucket")?, "name")?;
        let key = string_field(field(s3, "object")?, "key")?;

        Ok(Self::new(bucket, key))
    }

    /// Build a notification event for this location.
    pub fn to_event(&self) -> Value {
        serde_json::json!({
            "Records": [{
                "s3": {
                    "bucket": { "name": self.bucket },
                    "object": { "key": self.key }
                }
            }]
        })
    }
}

impl std::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

fn field<'a>(value: &'a Value, name: &'static str) -> Result<&'a Value, PipelineError> {
    value.get(name).ok_or(PipelineError::EventMetadata(name))
}

fn string_field(value: &Value, name: &'static str) -> Result<String, PipelineError> {
    field(value, name)?
        .as_str()
        .map(str::to_string)
        .ok_or(PipelineError::EventMetadata(name))
}
