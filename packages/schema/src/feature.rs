//! Editor-level features. They add no node or mark types; the editor reads
//! them from the schema and turns them into post-command behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    #[default]
    All,
    Deepest,
    Shallowest,
}

impl FocusMode {
    /// Unknown names fall back to `All`
    pub fn parse(mode: &str) -> Self {
        match mode {
            "deepest" => FocusMode::Deepest,
            "shallowest" => FocusMode::Shallowest,
            _ => FocusMode::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "feature", rename_all = "camelCase")]
pub enum Feature {
    /// Text shown while the document is empty
    Placeholder { text: String },
    Focus { class_name: String, mode: FocusMode },
    /// Smart text replacements on typed input
    Typography,
    CharacterCount { limit: Option<usize> },
    /// Deterministic ids on nodes of `types`, stored under `attribute`
    UniqueId { attribute: String, types: Vec<String> },
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Placeholder { .. } => "placeholder",
            Feature::Focus { .. } => "focus",
            Feature::Typography => "typography",
            Feature::CharacterCount { .. } => "characterCount",
            Feature::UniqueId { .. } => "uniqueId",
        }
    }
}
