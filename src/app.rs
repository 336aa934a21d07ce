//! Session driver: the composition root.
//!
//! Wires the capture controller, the pipeline orchestrator, and the state
//! reducer together, consuming inbound intents and folding outbound core
//! events into the presentation snapshot. This is the only place where
//! the three components meet; they never reference each other directly.

use crate::audio::decoder::ChunkDecoder;
use crate::capture::controller::CaptureController;
use crate::capture::microphone::Microphone;
use crate::error::Result;
use crate::pipeline::events::{CoreEvent, Intent, PipelineRequest};
use crate::pipeline::orchestrator::{Orchestrator, OrchestratorHandle};
use crate::polish::refiner::LanguageModel;
use crate::state::reducer::{AppEvent, AppState, reduce};
use crate::stt::transcriber::SpeechModel;

/// Translate an outbound core event into a reducer event.
///
/// Streaming token events drive progressive rendering directly and do not
/// change the snapshot, so they map to None.
pub fn app_event_for(event: &CoreEvent) -> Option<AppEvent> {
    match event {
        CoreEvent::Loading { message } => Some(AppEvent::Loading(message.clone())),
        CoreEvent::ModelProgress {
            loaded_bytes,
            total_bytes,
            ..
        } => Some(AppEvent::ModelProgress {
            loaded_bytes: *loaded_bytes,
            total_bytes: *total_bytes,
        }),
        CoreEvent::Ready => Some(AppEvent::Ready),
        CoreEvent::TranscribeStarted => None,
        CoreEvent::TranscribeToken { .. } => None,
        CoreEvent::TranscribeComplete { text } => {
            Some(AppEvent::TranscriptionComplete(text.clone()))
        }
        CoreEvent::PolishStarted => Some(AppEvent::PolishingStarted),
        CoreEvent::PolishToken { .. } => None,
        CoreEvent::PolishComplete { note } => Some(AppEvent::PolishingComplete(note.clone())),
        CoreEvent::NoSpeechDetected => Some(AppEvent::NoSpeechDetected),
        CoreEvent::Error { message } => Some(AppEvent::Error(message.clone())),
    }
}

/// Drives one capture session and its pipeline runs.
pub struct SessionDriver<M: Microphone, D: ChunkDecoder> {
    controller: CaptureController<M, D>,
    pipeline: OrchestratorHandle,
    events: crossbeam_channel::Receiver<CoreEvent>,
    state: AppState,
    language: String,
}

impl<M: Microphone, D: ChunkDecoder> SessionDriver<M, D> {
    /// Wires a driver from a capture controller and the two models.
    pub fn new<S, L>(
        controller: CaptureController<M, D>,
        speech: S,
        refiner: L,
        language: &str,
    ) -> Self
    where
        S: SpeechModel + 'static,
        L: LanguageModel + 'static,
    {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        let pipeline = Orchestrator::new(speech, refiner, events_tx).spawn();

        Self {
            controller,
            pipeline,
            events: events_rx,
            state: AppState::new(),
            language: language.to_string(),
        }
    }

    /// The current presentation snapshot.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle to the running pipeline (for submission/interrupt from
    /// other parts of the interactive context).
    pub fn pipeline(&self) -> &OrchestratorHandle {
        &self.pipeline
    }

    /// Consume one inbound intent.
    pub async fn dispatch(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::StartSession => {
                self.controller.start()?;
                self.pipeline.reset_session();
                self.state = reduce(&self.state, &AppEvent::StartRecording);
            }
            Intent::StopSession => {
                let final_segment = self.controller.stop();
                self.state = reduce(&self.state, &AppEvent::StopRecording);
                if let Some(audio) = final_segment {
                    self.pipeline.submit(PipelineRequest::Transcribe {
                        audio,
                        language: self.language.clone(),
                    });
                }
            }
            Intent::SubmitSegment { audio, language } => {
                self.pipeline
                    .submit(PipelineRequest::Transcribe { audio, language });
            }
            Intent::Interrupt => {
                self.pipeline.interrupt();
            }
        }
        Ok(())
    }

    /// Poll the capture side once and submit any finalized segment.
    pub async fn pump_capture(&mut self) {
        if let Some(audio) = self.controller.poll().await {
            self.pipeline.submit(PipelineRequest::Transcribe {
                audio,
                language: self.language.clone(),
            });
        }
    }

    /// Fold all pending core events into the snapshot.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let Some(app_event) = app_event_for(&event) {
                self.state = reduce(&self.state, &app_event);
            }
        }
    }

    /// Stop the pipeline worker and release everything.
    pub async fn shutdown(self) {
        // Dropping the controller releases the microphone if still held.
        drop(self.controller);
        self.pipeline.shutdown().await;
    }
}
