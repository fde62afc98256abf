/*!
 * Tree-to-text flattening.
 *
 * Lines are produced in pre-order (parent before children), each prefixed by
 * two spaces per level of depth. Nodes whose trimmed text is empty emit no
 * line but their children are still visited.
 */

use serde::{Deserialize, Serialize};

use super::document::{ScriptDocument, ScriptNode};

const INDENT: &str = "  ";

/// Flatten a tree starting at depth 0.
pub fn flatten(node: &ScriptNode) -> Vec<String> {
    flatten_at(node, 0)
}

/// Flatten a tree whose root sits at `depth`.
pub fn flatten_at(node: &ScriptNode, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    collect(node, depth, &mut lines);
    lines
}

fn collect(node: &ScriptNode, depth: usize, lines: &mut Vec<String>) {
    let text = node.text.trim();
    if !text.is_empty() {
        lines.push(format!("{}{}", INDENT.repeat(depth), text));
    }
    for child in &node.children {
        collect(child, depth + 1, lines);
    }
}

/// The flattened script as persisted and sent for evaluation: `{"content": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlattenedScript {
    /// Indented lines in document order
    pub content: Vec<String>,
}

impl FlattenedScript {
    /// Flatten a (sanitized) document.
    pub fn from_document(document: &ScriptDocument) -> Self {
        Self {
            content: flatten(&document.root),
        }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether no text was extracted.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Pretty JSON as written to storage.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Compact JSON, the text substituted into evaluation prompts.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse the stored JSON form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
