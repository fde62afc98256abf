/*!
 * Core document model for screenplays.
 *
 * A Final Draft file is an XML tree (`FinalDraft > Content > Paragraph > Text`).
 * Only element nodes are kept; each node carries the text that precedes its
 * first child element, which is where Final Draft puts paragraph text.
 */

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

/// A node of the screenplay tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptNode {
    /// Element tag (e.g. "Paragraph", "Text", "ScriptNote")
    pub tag: String,

    /// Leading text content, untrimmed
    #[serde(default)]
    pub text: String,

    /// Child elements in document order
    #[serde(default)]
    pub children: Vec<ScriptNode>,
}

impl ScriptNode {
    /// Create a node without children.
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Append a child, builder style.
    pub fn with_child(mut self, child: ScriptNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children, builder style.
    pub fn with_children(mut self, children: impl IntoIterator<Item = ScriptNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Total number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ScriptNode::node_count).sum::<usize>()
    }

    /// Whether any node in this subtree has the given tag.
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tag == tag || self.children.iter().any(|c| c.contains_tag(tag))
    }

    fn from_xml(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            tag: node.tag_name().name().to_string(),
            text: leading_text(node),
            children: node
                .children()
                .filter(|n| n.is_element())
                .map(ScriptNode::from_xml)
                .collect(),
        }
    }
}

/// Character data before the first child element, with comments and
/// processing instructions skipped.
fn leading_text(node: roxmltree::Node<'_, '_>) -> String {
    node.children()
        .take_while(|c| !c.is_element())
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect()
}

/// A parsed screenplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptDocument {
    /// Root element
    pub root: ScriptNode,
}

impl ScriptDocument {
    /// Wrap an existing tree.
    pub fn new(root: ScriptNode) -> Self {
        Self { root }
    }

    /// Parse a screenplay from XML text.
    ///
    /// Malformed XML is reported as `PipelineError::Parse`. A DOCTYPE
    /// declaration is accepted.
    pub fn parse(xml: &str) -> Result<Self, PipelineError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let doc = roxmltree::Document::parse_with_options(xml, options)
            .map_err(|e| PipelineError::Parse(format!("XML parse error: {}", e)))?;

        Ok(Self::new(ScriptNode::from_xml(doc.root_element())))
    }

    /// Parse a screenplay from raw bytes, which must be UTF-8.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, PipelineError> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| PipelineError::InvalidInput(format!("Document is not valid UTF-8: {}", e)))?;
        Self::parse(xml)
    }

    /// Remove all annotation subtrees in place; returns how many were removed.
    pub fn sanitize(&mut self, annotation_tag: &str) -> usize {
        super::sanitizer::sanitize_document(self, annotation_tag)
    }
}
