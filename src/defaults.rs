//! Default configuration constants for notevox.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default silence amplitude threshold (normalized samples, 0.0 to 1.0).
///
/// A sample whose absolute amplitude is at or below this value counts as
/// silent. 0.01 is tuned for typical microphone input levels.
pub const SILENCE_THRESHOLD: f32 = 0.01;

/// Default minimum trailing-silence duration in milliseconds.
///
/// An utterance is only finalized once at least this much uninterrupted
/// silence trails the unsent audio. 500ms tolerates short word gaps
/// without splitting mid-sentence.
pub const MIN_TRAILING_SILENCE_MS: u32 = 500;

/// Maximum segment duration in seconds.
///
/// Hard backpressure cap: continuous speech with no detected pause is cut
/// into segments of at most this length so no segment grows unbounded.
pub const MAX_SEGMENT_SECS: u32 = 30;

/// Delay before retrying after an empty chunk read, in milliseconds.
///
/// Audio drivers occasionally deliver zero-size chunks during startup or
/// under load; one bounded retry absorbs those hiccups.
pub const EMPTY_CHUNK_RETRY_MS: u64 = 1000;

/// Default language hint for transcription.
///
/// "auto" lets the speech model detect the spoken language.
/// Set to a specific code (e.g., "en", "de") to force a language.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Fixed user-facing message installed when no speech was detected.
pub const NO_SPEECH_MESSAGE: &str = "No speech detected. Please try again.";

/// Title used when a polish response cannot be parsed as a note.
pub const FALLBACK_NOTE_TITLE: &str = "Untitled Note";

/// Category used when a polish response cannot be parsed as a note.
pub const FALLBACK_NOTE_CATEGORY: &str = "Uncategorized";

/// Tag marking a note that was assembled by the degraded fallback.
pub const FALLBACK_NOTE_TAG: &str = "auto-generated";

/// Number of samples in the maximum allowed segment at the given rate.
pub fn max_segment_samples(sample_rate: u32) -> usize {
    (sample_rate * MAX_SEGMENT_SECS) as usize
}

/// Number of samples covering the minimum trailing-silence duration.
pub fn min_silence_samples(sample_rate: u32, min_silence_ms: u32) -> usize {
    (sample_rate as u64 * min_silence_ms as u64 / 1000) as usize
}
