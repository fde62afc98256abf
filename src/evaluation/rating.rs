/*!
 * Closing-rating extraction from generated evaluations.
 *
 * Every evaluation template asks the model to end with an `N/10` rating. The
 * last such figure in the text is taken as the verdict.
 */

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RATING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(10|[1-9])\s*/\s*10\b").unwrap());

/// Extract the last `N/10` rating from generated text.
pub fn extract_rating(text: &str) -> Option<u8> {
    RATING_REGEX
        .captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Find the first rating inside any `generation` field of a model response.
///
/// Arrays are walked in order, so for a model entry point payload this is the
/// first configured model that gave a rating. Object keys are visited in the
/// map's sorted key order.
pub fn extract_rating_from_value(value: &Value) -> Option<u8> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("generation") {
                if let Some(rating) = extract_rating(text) {
                    return Some(rating);
                }
            }
            map.iter()
                .filter(|(k, _)| k.as_str() != "generation")
                .find_map(|(_, v)| extract_rating_from_value(v))
        }
        Value::Array(items) => items.iter().find_map(extract_rating_from_value),
        _ => None,
    }
}

/// Ratings per model from a model entry point payload.
///
/// Reads `results[*].model` and `results[*].generation`; results without a
/// rating are left out.
pub fn extract_model_ratings(value: &Value) -> BTreeMap<String, u8> {
    let Some(results) = value.get("results").and_then(Value::as_array) else {
        return BTreeMap::new();
    };

    results
        .iter()
        .filter_map(|result| {
            let model = result.get("model")?.as_str()?;
            let rating = result.get("generation")?.as_str().and_then(extract_rating)?;
            Some((model.to_string(), rating))
        })
        .collect()
}
