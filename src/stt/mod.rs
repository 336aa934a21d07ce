//! Speech-to-text seam for notevox.
//!
//! The actual inference engine lives outside the core and is injected
//! behind the `SpeechModel` trait; this module owns the trait, the test
//! mock, and transcript text cleanup.

pub mod text;
pub mod transcriber;

pub use text::strip_annotations;
pub use transcriber::{MockSpeechModel, SpeechModel};
