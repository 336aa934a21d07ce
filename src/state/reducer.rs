//! Pure state-transition function for the presentation snapshot.
//!
//! `reduce(state, event) -> state'` over a closed event enum, checked
//! exhaustively at compile time. Every transition is total: there is no
//! event the reducer treats as an error.

use crate::defaults;
use crate::polish::note::PolishedNote;

/// Model lifecycle as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleStatus {
    /// Models not requested yet.
    #[default]
    Unloaded,
    /// Models are being prepared.
    Loading,
    /// The pipeline can accept work.
    Ready,
}

/// Immutable presentation snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub status: LifecycleStatus,
    /// Microphone session active.
    pub recording: bool,
    /// A segment is being transcribed.
    pub processing: bool,
    /// The transcript is being polished into a note.
    pub polishing: bool,
    /// Accumulated session transcript.
    pub transcript: String,
    /// The current polished note, if any.
    pub note: Option<PolishedNote>,
    /// Progress ratio in [0, 1].
    pub progress: f32,
    /// View toggle: original transcript vs polished note.
    pub show_polished: bool,
    /// Set when a fresh note should fade in.
    pub note_fresh: bool,
    /// User-facing status or error message.
    pub message: Option<String>,
}

impl AppState {
    /// The initial snapshot.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Discrete events recognized by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Loading(String),
    ModelProgress { loaded_bytes: u64, total_bytes: u64 },
    Ready,
    StartRecording,
    StopRecording,
    TranscriptionProgress(f32),
    TranscriptionComplete(String),
    PolishingStarted,
    PolishingComplete(PolishedNote),
    NoSpeechDetected,
    Error(String),
    ToggleView,
}

/// Advance the snapshot by one event.
pub fn reduce(state: &AppState, event: &AppEvent) -> AppState {
    let mut next = state.clone();

    match event {
        AppEvent::Loading(message) => {
            next.status = LifecycleStatus::Loading;
            next.message = Some(message.clone());
        }
        AppEvent::ModelProgress {
            loaded_bytes,
            total_bytes,
        } => {
            next.progress = if *total_bytes == 0 {
                0.0
            } else {
                (*loaded_bytes as f32 / *total_bytes as f32).clamp(0.0, 1.0)
            };
        }
        AppEvent::Ready => {
            next.status = LifecycleStatus::Ready;
            next.progress = 0.0;
            next.message = None;
        }
        AppEvent::StartRecording => {
            next.recording = true;
            next.processing = false;
            next.polishing = false;
            next.transcript.clear();
            next.note = None;
            next.note_fresh = false;
            next.progress = 0.0;
            next.message = None;
        }
        AppEvent::StopRecording => {
            next.recording = false;
            next.processing = true;
        }
        AppEvent::TranscriptionProgress(progress) => {
            next.progress = progress.clamp(0.0, 1.0);
        }
        AppEvent::TranscriptionComplete(text) => {
            if text.trim().is_empty() {
                // No usable speech; polishing is never entered.
                next.processing = false;
                next.polishing = false;
                next.message = Some(defaults::NO_SPEECH_MESSAGE.to_string());
            } else {
                if !next.transcript.is_empty() {
                    next.transcript.push(' ');
                }
                next.transcript.push_str(text.trim());
                next.processing = false;
                next.polishing = true;
            }
        }
        AppEvent::PolishingStarted => {
            next.polishing = true;
        }
        AppEvent::PolishingComplete(note) => {
            next.polishing = false;
            next.processing = false;
            next.note = Some(note.clone());
            next.note_fresh = true;
            next.show_polished = true;
        }
        AppEvent::NoSpeechDetected => {
            next.processing = false;
            next.polishing = false;
            next.message = Some(defaults::NO_SPEECH_MESSAGE.to_string());
        }
        AppEvent::Error(message) => {
            next.processing = false;
            next.polishing = false;
            next.message = Some(message.clone());
        }
        AppEvent::ToggleView => {
            next.show_polished = !next.show_polished;
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> PolishedNote {
        PolishedNote {
            title: "T".into(),
            category: "C".into(),
            tags: vec!["a".into()],
            content: "X".into(),
        }
    }

    #[test]
    fn initial_state_is_unloaded_and_empty() {
        let state = AppState::new();
        assert_eq!(state.status, LifecycleStatus::Unloaded);
        assert!(!state.recording);
        assert!(!state.processing);
        assert!(!state.polishing);
        assert!(state.transcript.is_empty());
        assert!(state.note.is_none());
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn reduce_is_pure() {
        let state = AppState::new();
        let _ = reduce(&state, &AppEvent::StartRecording);
        // The input snapshot is untouched.
        assert_eq!(state, AppState::new());
    }

    #[test]
    fn loading_then_ready_walks_the_lifecycle() {
        let state = AppState::new();

        let state = reduce(&state, &AppEvent::Loading("Loading models...".into()));
        assert_eq!(state.status, LifecycleStatus::Loading);
        assert_eq!(state.message.as_deref(), Some("Loading models..."));

        let state = reduce(
            &state,
            &AppEvent::ModelProgress {
                loaded_bytes: 50,
                total_bytes: 200,
            },
        );
        assert_eq!(state.progress, 0.25);

        let state = reduce(&state, &AppEvent::Ready);
        assert_eq!(state.status, LifecycleStatus::Ready);
        assert_eq!(state.progress, 0.0);
        assert!(state.message.is_none());
    }

    #[test]
    fn model_progress_with_zero_total_is_zero() {
        let state = reduce(
            &AppState::new(),
            &AppEvent::ModelProgress {
                loaded_bytes: 10,
                total_bytes: 0,
            },
        );
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn start_recording_clears_previous_session() {
        let dirty = AppState {
            transcript: "old words".into(),
            note: Some(note()),
            note_fresh: true,
            polishing: true,
            processing: true,
            progress: 0.7,
            message: Some("stale".into()),
            ..AppState::default()
        };

        let state = reduce(&dirty, &AppEvent::StartRecording);
        assert!(state.recording);
        assert!(state.transcript.is_empty());
        assert!(state.note.is_none());
        assert!(!state.note_fresh);
        assert!(!state.processing);
        assert!(!state.polishing);
        assert_eq!(state.progress, 0.0);
        assert!(state.message.is_none());
    }

    #[test]
    fn stop_recording_enters_processing() {
        let state = reduce(&AppState::new(), &AppEvent::StartRecording);
        let state = reduce(&state, &AppEvent::StopRecording);
        assert!(!state.recording);
        assert!(state.processing);
    }

    #[test]
    fn transcription_progress_updates_only_progress() {
        let before = reduce(&AppState::new(), &AppEvent::StartRecording);
        let state = reduce(&before, &AppEvent::TranscriptionProgress(0.4));
        assert_eq!(state.progress, 0.4);
        assert_eq!(
            AppState {
                progress: before.progress,
                ..state
            },
            before
        );
    }

    #[test]
    fn transcription_progress_is_clamped() {
        let state = reduce(&AppState::new(), &AppEvent::TranscriptionProgress(1.7));
        assert_eq!(state.progress, 1.0);
        let state = reduce(&state, &AppEvent::TranscriptionProgress(-0.3));
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn transcription_complete_appends_and_enters_polishing() {
        let state = reduce(&AppState::new(), &AppEvent::TranscriptionComplete("first".into()));
        assert_eq!(state.transcript, "first");
        assert!(state.polishing);
        assert!(!state.processing);

        let state = reduce(&state, &AppEvent::TranscriptionComplete("second".into()));
        assert_eq!(state.transcript, "first second");
    }

    #[test]
    fn empty_transcription_produces_no_speech_state() {
        let busy = AppState {
            processing: true,
            ..AppState::default()
        };

        let state = reduce(&busy, &AppEvent::TranscriptionComplete(String::new()));
        assert!(!state.processing);
        assert!(!state.polishing, "polishing must never be entered");
        assert_eq!(
            state.message.as_deref(),
            Some("No speech detected. Please try again.")
        );
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn whitespace_only_transcription_is_treated_as_empty() {
        let state = reduce(&AppState::new(), &AppEvent::TranscriptionComplete("   ".into()));
        assert!(!state.polishing);
        assert!(state.message.is_some());
    }

    #[test]
    fn polishing_complete_stores_note_with_fade_in() {
        let busy = AppState {
            polishing: true,
            processing: true,
            ..AppState::default()
        };

        let state = reduce(&busy, &AppEvent::PolishingComplete(note()));
        assert!(!state.polishing);
        assert!(!state.processing);
        assert_eq!(state.note, Some(note()));
        assert!(state.note_fresh);
        assert!(state.show_polished);
    }

    #[test]
    fn no_speech_detected_installs_fixed_message() {
        let busy = AppState {
            processing: true,
            polishing: true,
            ..AppState::default()
        };

        let state = reduce(&busy, &AppEvent::NoSpeechDetected);
        assert!(!state.processing);
        assert!(!state.polishing);
        assert_eq!(
            state.message.as_deref(),
            Some("No speech detected. Please try again.")
        );
    }

    #[test]
    fn error_clears_working_flags_and_shows_message() {
        let busy = AppState {
            processing: true,
            polishing: true,
            ..AppState::default()
        };

        let state = reduce(&busy, &AppEvent::Error("Transcription failed: boom".into()));
        assert!(!state.processing);
        assert!(!state.polishing);
        assert_eq!(state.message.as_deref(), Some("Transcription failed: boom"));
    }

    #[test]
    fn toggle_view_flips_back_and_forth() {
        let state = AppState::new();
        let state = reduce(&state, &AppEvent::ToggleView);
        assert!(state.show_polished);
        let state = reduce(&state, &AppEvent::ToggleView);
        assert!(!state.show_polished);
    }

    #[test]
    fn full_session_walkthrough() {
        let state = AppState::new();
        let state = reduce(&state, &AppEvent::Ready);
        let state = reduce(&state, &AppEvent::StartRecording);
        let state = reduce(&state, &AppEvent::StopRecording);
        let state = reduce(&state, &AppEvent::TranscriptionProgress(0.5));
        let state = reduce(&state, &AppEvent::TranscriptionComplete("hello there".into()));
        let state = reduce(&state, &AppEvent::PolishingStarted);
        let state = reduce(&state, &AppEvent::PolishingComplete(note()));

        assert_eq!(state.status, LifecycleStatus::Ready);
        assert!(!state.recording);
        assert!(!state.processing);
        assert!(!state.polishing);
        assert_eq!(state.transcript, "hello there");
        assert_eq!(state.note, Some(note()));
        assert!(state.note_fresh);
    }
}
