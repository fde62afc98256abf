/*!
 * Tests for evaluation prompts and rating extraction
 */

use storyfy::evaluation::{extract_rating, Dimension, EvaluationPromptBuilder};
use storyfy::screenplay::FlattenedScript;

/// The default single-dimension setup renders one plot prompt
#[test]
fn test_build_defaultDimensions_shouldRenderPlotPromptOnly() {
    let script = FlattenedScript {
        content: vec!["  INT. KITCHEN - NIGHT".to_string()],
    };
    let blob = script.to_json().unwrap();

    let requests = EvaluationPromptBuilder::new(&[Dimension::PlotStructure]).build(&blob);

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].dimension, Dimension::PlotStructure);
    assert!(requests[0].prompt.contains("Plot Structure and Pacing"));
    assert!(requests[0].prompt.contains(r#"{"content":["  INT. KITCHEN - NIGHT"]}"#));
}

/// All five dimensions render distinct prompts that each demand a rating
#[test]
fn test_build_allDimensions_shouldRenderFivePromptsWithRating() {
    let requests = EvaluationPromptBuilder::new(&Dimension::ALL).build("FADE IN:");

    assert_eq!(requests.len(), 5);
    for (request, dimension) in requests.iter().zip(Dimension::ALL) {
        assert_eq!(request.dimension, dimension);
        assert!(request.prompt.contains("FADE IN:"));
        assert!(request.prompt.contains("1-10"), "{} has no rating scale", dimension);
    }
}

/// Rendering is a pure substitution: same input, same prompt
#[test]
fn test_build_sameScript_shouldRenderIdenticalPrompts() {
    let builder = EvaluationPromptBuilder::new(&[Dimension::CharacterDevelopment, Dimension::SubplotsThemes]);

    assert_eq!(builder.build("x"), builder.build("x"));
}

/// Dimension identifiers parse from configuration strings
#[test]
fn test_dimension_parse_shouldAcceptIdentifiers() {
    let dimension: Dimension = "originality_creativity".parse().unwrap();

    assert_eq!(dimension, Dimension::OriginalityCreativity);
    assert_eq!(dimension.display_name(), "Originality and Creativity");
    assert!("style".parse::<Dimension>().is_err());
}

/// Ratings follow the template's closing line
#[test]
fn test_extractRating_templateStyleAnswer_shouldReturnScore() {
    let answer = "- **Strengths**: tight second act\n\n**Rating**: I would rate the dialogue and interactions **[6/10]**.";

    assert_eq!(extract_rating(answer), Some(6));
    assert_eq!(extract_rating("Uncertain about labeling."), None);
}
