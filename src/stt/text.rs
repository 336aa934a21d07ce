//! Transcript text cleanup.
//!
//! Speech models emit non-speech annotations in brackets or parentheses
//! ("[music]", "(laughs)", "[BLANK_AUDIO]"). These are stripped before
//! the text reaches the transcript accumulator.

use regex::Regex;
use std::sync::OnceLock;

fn annotation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("annotation pattern is valid")
    })
}

/// Remove bracketed and parenthetical annotations from transcribed text.
///
/// Whitespace left behind by removed annotations is collapsed and the
/// result is trimmed, so a transcript consisting only of annotations
/// becomes the empty string.
pub fn strip_annotations(text: &str) -> String {
    let stripped = annotation_pattern().replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
