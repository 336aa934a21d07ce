//! notevox - Voice note capture core
//!
//! Segments live speech into utterances and routes each one through a
//! streaming transcribe-then-polish pipeline.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod capture;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod polish;
pub mod state;
pub mod stt;

// Composition root
pub use app::SessionDriver;

// Core traits (capture → transcribe → polish)
pub use audio::decoder::ChunkDecoder;
pub use capture::microphone::Microphone;
pub use polish::refiner::LanguageModel;
pub use stt::transcriber::SpeechModel;

// Segmentation
pub use audio::segmenter::{AudioSegment, Segmenter, SegmenterConfig};

// Pipeline
pub use pipeline::events::{CoreEvent, Intent, PipelineRequest};
pub use pipeline::orchestrator::{Orchestrator, OrchestratorHandle, PipelineState};

// Presentation state
pub use state::reducer::{AppEvent, AppState, LifecycleStatus, reduce};

// Error handling
pub use error::{NotevoxError, Result};

// Config
pub use config::Config;

// Error reporting seam
pub use pipeline::error::{ErrorReporter, LogReporter};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
