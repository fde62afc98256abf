/*!
 * Tests for screenplay parsing, annotation removal and flattening
 */

use storyfy::errors::PipelineError;
use storyfy::screenplay::{
    extract_script, flatten, remove_annotations, FlattenedScript, ScriptDocument, ScriptNode, SCRIPT_NOTE_TAG,
};

use crate::common;

/// Notes at every depth, including notes inside notes, are all removed
#[test]
fn test_sanitize_nestedNotes_shouldLeaveNoAnnotation() {
    let xml = r#"<FinalDraft>
        <ScriptNote><Text>top</Text></ScriptNote>
        <Content>
            <Paragraph>
                <Text>Keep me</Text>
                <ScriptNote><ScriptNote><Text>inner</Text></ScriptNote></ScriptNote>
            </Paragraph>
            <Paragraph><Text>And me</Text></Paragraph>
        </Content>
    </FinalDraft>"#;
    let mut document = ScriptDocument::parse(xml).unwrap();

    let removed = document.sanitize(SCRIPT_NOTE_TAG);

    assert_eq!(removed, 2);
    assert!(!document.root.contains_tag(SCRIPT_NOTE_TAG));
    let content = &document.root.children[0];
    assert_eq!(content.tag, "Content");
    assert_eq!(content.children.len(), 2);
    assert_eq!(content.children[0].children.len(), 1);
    assert_eq!(content.children[0].children[0].text, "Keep me");
}

/// Every non-annotation node survives, in its original relative order
#[test]
fn test_sanitize_shouldPreserveNonAnnotationOrder() {
    let mut root = ScriptNode::new("Content", "").with_children([
        ScriptNode::new("P", "one"),
        ScriptNode::new(SCRIPT_NOTE_TAG, "note"),
        ScriptNode::new("P", "two").with_child(ScriptNode::new(SCRIPT_NOTE_TAG, "deep")),
        ScriptNode::new("P", "three"),
    ]);

    remove_annotations(&mut root, SCRIPT_NOTE_TAG);

    assert_eq!(flatten(&root), vec!["  one", "  two", "  three"]);
}

/// Parent text comes before child text, two spaces per level
#[test]
fn test_flatten_shouldEmitParentsBeforeChildrenWithDepthIndent() {
    let root = ScriptNode::new("root", "").with_children([
        ScriptNode::new("A", "x"),
        ScriptNode::new("B", "").with_child(ScriptNode::new("C", "y")),
    ]);

    let lines = flatten(&root);

    assert_eq!(lines, vec!["  x", "    y"]);
    // C sits one level deeper than A
    let indent = |s: &str| s.len() - s.trim_start().len();
    assert_eq!(indent(&lines[1]) - indent(&lines[0]), 2);
}

/// Flattening the same document twice gives the same lines
#[test]
fn test_flatten_calledTwice_shouldBeIdentical() {
    let document = ScriptDocument::parse(common::SAMPLE_FDX).unwrap();

    let first = FlattenedScript::from_document(&document);
    let second = FlattenedScript::from_document(&document);

    assert_eq!(first, second);
}

/// A document with only whitespace text flattens to nothing
#[test]
fn test_extractScript_whitespaceOnlyDocument_shouldBeEmpty() {
    let script = extract_script("<FinalDraft>\n  <Content>   <Paragraph>\t</Paragraph></Content>\n</FinalDraft>", SCRIPT_NOTE_TAG)
        .unwrap();

    assert!(script.is_empty());
    assert_eq!(script.to_json().unwrap(), r#"{"content":[]}"#);
}

/// The stored JSON parses back to the same lines
#[test]
fn test_flattenedScript_storedJson_shouldParseBackToSameLines() {
    let script = extract_script(common::SAMPLE_FDX, SCRIPT_NOTE_TAG).unwrap();

    let stored = script.to_json_pretty().unwrap();
    let parsed = FlattenedScript::from_json(&stored).unwrap();

    assert_eq!(parsed.content, common::sample_lines());
}

/// The sample screenplay loses its note and keeps the four paragraphs
#[test]
fn test_extractScript_sampleScreenplay_shouldDropNoteText() {
    let script = extract_script(common::SAMPLE_FDX, SCRIPT_NOTE_TAG).unwrap();

    assert_eq!(script.content, common::sample_lines());
    assert!(!script.content.iter().any(|line| line.contains("Too moody?")));
}

/// Malformed XML is reported as a parse error surfacing as 400
#[test]
fn test_extractScript_malformedXml_shouldBeParseError() {
    let error = extract_script("<FinalDraft><Content></FinalDraft>", SCRIPT_NOTE_TAG).unwrap_err();

    assert!(matches!(error, PipelineError::Parse(_)));
    assert_eq!(error.status_code(), 400);
    assert_eq!(error.public_message(), "Invalid XML content");
}

/// Comments and processing instructions never become nodes
#[test]
fn test_parse_commentsAndInstructions_shouldBeIgnored() {
    let xml = "<?xml version=\"1.0\"?><root><!-- hidden --><?pi data?><Text>shown</Text></root>";
    let script = extract_script(xml, SCRIPT_NOTE_TAG).unwrap();

    assert_eq!(script.content, vec!["  shown"]);
}

/// Text interrupted or preceded by a comment is extracted whole
#[test]
fn test_extractScript_textSplitByComment_shouldKeepAllText() {
    let xml = "<FinalDraft><Text><!-- rev -->Hello</Text><Text>Hel<!--x-->lo</Text></FinalDraft>";
    let script = extract_script(xml, SCRIPT_NOTE_TAG).unwrap();

    assert_eq!(script.content, vec!["  Hello", "  Hello"]);
}

/// A document type declaration does not make the upload invalid
#[test]
fn test_extractScript_withDoctype_shouldFlatten() {
    let xml = "<?xml version=\"1.0\"?>\n<!DOCTYPE FinalDraft>\n<FinalDraft><Content><Paragraph><Text>Hi</Text></Paragraph></Content></FinalDraft>";
    let script = extract_script(xml, SCRIPT_NOTE_TAG).unwrap();

    assert_eq!(script.content, vec!["      Hi"]);
}
