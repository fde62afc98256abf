/*!
 * Evaluation prompt building and result records.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dimensions::Dimension;
use super::rating::{extract_model_ratings, extract_rating_from_value};

/// Marker recorded for a dimension whose model call failed
pub const EVALUATION_FAILED: &str = "Evaluation failed";

/// A rendered prompt for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub dimension: Dimension,
    pub prompt: String,
}

/// Outcome of one dimension's model call.
///
/// Exactly one of `response` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(rename = "function_name")]
    pub dimension: Dimension,

    /// Payload returned by the model entry point
    pub response: Option<Value>,

    /// Failure marker when the call did not succeed; details are only logged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Closing `N/10` rating of the first model that gave one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    /// Closing rating of every model that gave one, by model prefix
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ratings: BTreeMap<String, u8>,
}

impl EvaluationResult {
    /// Record a successful call.
    pub fn success(dimension: Dimension, response: Value) -> Self {
        let rating = extract_rating_from_value(&response);
        let ratings = extract_model_ratings(&response);
        Self {
            dimension,
            response: Some(response),
            error: None,
            rating,
            ratings,
        }
    }

    /// Record a failed call.
    pub fn failure(dimension: Dimension) -> Self {
        Self {
            dimension,
            response: None,
            error: Some(EVALUATION_FAILED.to_string()),
            rating: None,
            ratings: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }
}

/// Renders one prompt per enabled dimension.
#[derive(Debug, Clone)]
pub struct EvaluationPromptBuilder {
    dimensions: Vec<Dimension>,
}

impl EvaluationPromptBuilder {
    /// Create a builder for the given dimensions.
    ///
    /// Order is kept; repeated dimensions are rendered once.
    pub fn new(dimensions: &[Dimension]) -> Self {
        let mut unique = Vec::with_capacity(dimensions.len());
        for dimension in dimensions {
            if !unique.contains(dimension) {
                unique.push(*dimension);
            }
        }
        Self { dimensions: unique }
    }

    /// Dimensions that will be rendered.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Render every enabled template with the script content.
    pub fn build(&self, script: &str) -> Vec<EvaluationRequest> {
        self.dimensions
            .iter()
            .map(|dimension| EvaluationRequest {
                dimension: *dimension,
                prompt: dimension.template().render(script),
            })
            .collect()
    }
}
