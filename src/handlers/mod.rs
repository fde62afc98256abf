/*!
 * Pipeline entry points.
 *
 * - `conversion`: base64 upload to flattened script, then evaluation
 * - `evaluation`: one prompt per dimension, dispatched sequentially
 * - `model`: prompt fan-out to every configured model
 * - `annotation`: labelling of a stored script
 *
 * Every entry point takes a JSON event and answers with a `ResponseEnvelope`.
 */

pub mod annotation;
pub mod conversion;
pub mod envelope;
pub mod evaluation;
pub mod events;
pub mod model;
pub mod stage;

pub use annotation::AnnotationHandler;
pub use conversion::{ConversionHandler, ConversionRequest, CONVERTER_FUNCTION};
pub use envelope::ResponseEnvelope;
pub use evaluation::{EvaluationHandler, EvaluationSummary, EvaluationTrigger};
pub use events::ObjectLocation;
pub use model::{ModelEndpoint, ModelHandler, ModelInvocationBatch, ModelInvocationRequest, MODEL_CALL_FAILED};
pub use stage::{PipelineStage, StageTracker};
