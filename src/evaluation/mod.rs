/*!
 * Script coverage prompts.
 *
 * - `dimensions`: the evaluation axes
 * - `templates`: the static instruction texts
 * - `prompts`: rendering prompts and recording results
 * - `rating`: reading the closing rating back out of a generation
 */

pub mod dimensions;
pub mod prompts;
pub mod rating;
pub mod templates;

pub use dimensions::Dimension;
pub use prompts::{EvaluationPromptBuilder, EvaluationRequest, EvaluationResult, EVALUATION_FAILED};
pub use rating::{extract_model_ratings, extract_rating, extract_rating_from_value};
pub use templates::PromptTemplate;
