//! Event and request types crossing the interactive/compute boundary.
//!
//! Intents travel inward; core events travel outward. Neither side shares
//! mutable state with the other.

use crate::audio::segmenter::AudioSegment;
use crate::polish::note::PolishedNote;

/// Inbound intents consumed by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Begin a recording session.
    StartSession,
    /// End the recording session and process any final utterance.
    StopSession,
    /// Submit a finalized segment to the pipeline.
    SubmitSegment {
        audio: AudioSegment,
        language: String,
    },
    /// Cancel the in-flight pipeline run at the next token boundary.
    Interrupt,
}

/// A unit of work accepted by the orchestrator.
///
/// At most one request is in flight at any instant, system-wide.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineRequest {
    /// Run both stages: transcribe the segment, then polish the
    /// accumulated transcript.
    Transcribe {
        audio: AudioSegment,
        language: String,
    },
    /// Run only the polish stage on the given text.
    Polish { text: String },
}

/// Outbound events produced by the core for presentation collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// Model preparation started.
    Loading { message: String },
    /// Progress of an external model download/load.
    ModelProgress {
        file_id: String,
        loaded_bytes: u64,
        total_bytes: u64,
    },
    /// Models are resident; the pipeline can accept work.
    Ready,
    /// Transcription stage began.
    TranscribeStarted,
    /// Partial transcription text plus a running throughput estimate.
    TranscribeToken {
        partial: String,
        tokens_per_second: f32,
    },
    /// Final cleaned transcription for one segment.
    TranscribeComplete { text: String },
    /// Polish stage began.
    PolishStarted,
    /// One streamed polish token plus a running throughput estimate.
    PolishToken { token: String, tokens_per_second: f32 },
    /// Structured note committed for this polish cycle.
    PolishComplete { note: PolishedNote },
    /// The segment contained no usable speech.
    NoSpeechDetected,
    /// A stage failed; the message is a complete, readable string.
    Error { message: String },
}

impl CoreEvent {
    /// Returns true for events that end a pipeline run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CoreEvent::PolishComplete { .. }
                | CoreEvent::NoSpeechDetected
                | CoreEvent::Error { .. }
        )
    }
}
