/*!
 * Screenplay document model and text extraction.
 *
 * - `document`: parsed tree of a Final Draft (`.fdx`) screenplay
 * - `sanitizer`: removal of annotation (script note) subtrees
 * - `flattener`: pre-order flattening into indented text lines
 */

pub mod document;
pub mod flattener;
pub mod sanitizer;

pub use document::{ScriptDocument, ScriptNode};
pub use flattener::{flatten, flatten_at, FlattenedScript};
pub use sanitizer::{remove_annotations, SCRIPT_NOTE_TAG};

use crate::errors::PipelineError;

/// Parse, sanitize and flatten a screenplay in one step
pub fn extract_script(xml: &str, annotation_tag: &str) -> Result<FlattenedScript, PipelineError> {
    let mut document = ScriptDocument::parse(xml)?;
    document.sanitize(annotation_tag);
    Ok(FlattenedScript::from_document(&document))
}
