//! Two-stage AI pipeline for notevox.
//!
//! One finalized utterance at a time flows through transcription and then
//! note polishing, with lifecycle events streamed to the interactive
//! context. Excess requests are dropped, never queued.

pub mod error;
pub mod events;
pub mod orchestrator;

pub use error::{ErrorReporter, LogReporter};
pub use events::{CoreEvent, Intent, PipelineRequest};
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorHandle, PipelineState};
