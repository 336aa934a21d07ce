//! Polish instruction builder.
//!
//! Produces the structured instruction handed to the refinement model,
//! requesting a strict JSON note for the accumulated transcript.

/// Build the refinement instruction for a session transcript.
///
/// The instruction pins down the exact output shape so the response can
/// be parsed as a `PolishedNote`; anything else falls back to the
/// degraded note.
pub fn build_polish_instruction(transcript: &str) -> String {
    format!(
        "Rewrite the following voice transcript as a well-organized note. \
         Fix grammar and remove filler words, but preserve the meaning. \
         Respond with ONLY a JSON object of the exact shape \
         {{\"title\": string, \"category\": string, \"tags\": [string], \"content\": string}} \
         and no other text.\n\nTranscript:\n{}",
        transcript.trim()
    )
}
