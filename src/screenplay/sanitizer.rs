/*!
 * Annotation removal.
 *
 * Script notes are out-of-band comments attached anywhere in a screenplay.
 * They are dropped, with everything nested inside them, before flattening.
 */

use super::document::{ScriptDocument, ScriptNode};

/// Tag Final Draft uses for script notes
pub const SCRIPT_NOTE_TAG: &str = "ScriptNote";

/// Remove every descendant of `node` tagged `annotation_tag`.
///
/// Returns the number of removed subtrees. Nodes nested inside a removed
/// annotation go with it and are not counted separately.
pub fn remove_annotations(node: &mut ScriptNode, annotation_tag: &str) -> usize {
    let before = node.children.len();
    node.children.retain(|child| child.tag != annotation_tag);
    let removed = before - node.children.len();

    removed
        + node
            .children
            .iter_mut()
            .map(|child| remove_annotations(child, annotation_tag))
            .sum::<usize>()
}

/// Sanitize a whole document.
///
/// A root that is itself an annotation cannot be detached from a parent, so it
/// is replaced by an empty untagged root.
pub(crate) fn sanitize_document(document: &mut ScriptDocument, annotation_tag: &str) -> usize {
    if document.root.tag == annotation_tag {
        document.root = ScriptNode::new("", "");
        return 1;
    }
    remove_annotations(&mut document.root, annotation_tag)
}
