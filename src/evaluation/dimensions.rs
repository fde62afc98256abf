use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::templates::PromptTemplate;

/// One named axis of script evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    // @dimension: plot structure and pacing
    PlotStructure,
    // @dimension: character development and motivations
    CharacterDevelopment,
    // @dimension: dialogue and character interactions
    DialogueInteractions,
    // @dimension: subplots and themes
    SubplotsThemes,
    // @dimension: originality and creativity
    OriginalityCreativity,
}

impl Dimension {
    /// Every dimension, in report order.
    pub const ALL: [Dimension; 5] = [
        Dimension::PlotStructure,
        Dimension::CharacterDevelopment,
        Dimension::DialogueInteractions,
        Dimension::SubplotsThemes,
        Dimension::OriginalityCreativity,
    ];

    // @returns: Identifier used as function_name and in storage keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlotStructure => "plot_structure",
            Self::CharacterDevelopment => "character_development",
            Self::DialogueInteractions => "dialogue_interactions",
            Self::SubplotsThemes => "subplots_themes",
            Self::OriginalityCreativity => "originality_creativity",
        }
    }

    // @returns: Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PlotStructure => "Plot Structure and Pacing",
            Self::CharacterDevelopment => "Character Development and Motivations",
            Self::DialogueInteractions => "Dialogue and Interactions",
            Self::SubplotsThemes => "Subplots and Themes",
            Self::OriginalityCreativity => "Originality and Creativity",
        }
    }

    /// Instruction template of this dimension.
    pub fn template(&self) -> PromptTemplate {
        PromptTemplate::new(match self {
            Self::PlotStructure => PromptTemplate::PLOT_STRUCTURE,
            Self::CharacterDevelopment => PromptTemplate::CHARACTER_DEVELOPMENT,
            Self::DialogueInteractions => PromptTemplate::DIALOGUE_INTERACTIONS,
            Self::SubplotsThemes => PromptTemplate::SUBPLOTS_THEMES,
            Self::OriginalityCreativity => PromptTemplate::ORIGINALITY_CREATIVITY,
        })
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Dimension {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| anyhow!("Unknown evaluation dimension: {}", s))
    }
}
