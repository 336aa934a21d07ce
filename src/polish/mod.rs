//! Note polishing seam for notevox.
//!
//! The second pipeline stage turns the session transcript into a
//! structured note. The text-refinement model is injected behind
//! `LanguageModel`; this module owns the trait, the instruction builder,
//! and the strict note shape with its degraded fallback.

pub mod note;
pub mod prompt;
pub mod refiner;

pub use note::PolishedNote;
pub use prompt::build_polish_instruction;
pub use refiner::{LanguageModel, MockLanguageModel};
