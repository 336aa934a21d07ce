//! The structured note produced by the polish stage.
//!
//! The wire shape is exactly `{title, category, tags, content}`. Any
//! response that does not parse to that shape degrades to a placeholder
//! note carrying the raw streamed text — polishing never fails outright.

use crate::defaults;
use serde::{Deserialize, Serialize};

/// A polished note: the structured result of the refinement stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolishedNote {
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub content: String,
}

impl PolishedNote {
    /// Parse a response strictly as the note wire shape.
    ///
    /// Returns None for malformed JSON, missing fields, wrong field types,
    /// or extra fields.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(extract_json_object(raw)?).ok()
    }

    /// The degraded fallback: raw streamed text becomes the content.
    pub fn fallback(raw_text: &str) -> Self {
        Self {
            title: defaults::FALLBACK_NOTE_TITLE.to_string(),
            category: defaults::FALLBACK_NOTE_CATEGORY.to_string(),
            tags: vec![defaults::FALLBACK_NOTE_TAG.to_string()],
            content: raw_text.trim().to_string(),
        }
    }

    /// Interpret a completed refinement stream: strict parse, degrading to
    /// the fallback note on any validation failure.
    pub fn from_stream_output(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| Self::fallback(raw))
    }
}

/// Locate the JSON object within a raw model response.
///
/// Models occasionally wrap their output in code fences or prose; the
/// braces-delimited span is what gets parsed. Returns None when no braces
/// are present.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
