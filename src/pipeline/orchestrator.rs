//! Single-flight orchestrator for the two-stage pipeline.
//!
//! One accepted unit of work walks the machine
//! `Idle → Transcribing → TranscribeDone → Polishing → PolishDone → Idle`,
//! with `Error` reachable from either working state and always handing
//! control back to `Idle`. A request arriving while the machine is busy is
//! dropped, not queued; the caller resubmits after the watermark advances
//! again. Every token emission is a cooperative suspension point where an
//! interrupt takes effect.

use crate::error::NotevoxError;
use crate::pipeline::error::{ErrorReporter, LogReporter};
use crate::pipeline::events::{CoreEvent, PipelineRequest};
use crate::polish::note::PolishedNote;
use crate::polish::prompt::build_polish_instruction;
use crate::polish::refiner::LanguageModel;
use crate::stt::text::strip_annotations;
use crate::stt::transcriber::SpeechModel;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::sync::mpsc;

/// States of the pipeline machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Ready to accept a request.
    Idle,
    /// Stage 1 running.
    Transcribing,
    /// Stage 1 finished with usable text.
    TranscribeDone,
    /// Stage 2 running.
    Polishing,
    /// Stage 2 committed a note.
    PolishDone,
    /// A stage faulted; control returns to Idle immediately after.
    Error,
}

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Buffer size of the per-stage token channels.
    pub token_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { token_buffer: 64 }
    }
}

/// Two-stage pipeline orchestrator.
///
/// Holds the injected models by reference and owns the session transcript
/// accumulator. Drive it directly with [`Orchestrator::process`], or move
/// it onto a worker task with [`Orchestrator::spawn`] and talk to it
/// through the returned handle.
pub struct Orchestrator<S: SpeechModel, L: LanguageModel> {
    speech: Arc<S>,
    refiner: Arc<L>,
    events: crossbeam_channel::Sender<CoreEvent>,
    reporter: Arc<dyn ErrorReporter>,
    interrupt: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
    state: PipelineState,
    transcript: Arc<RwLock<String>>,
    config: OrchestratorConfig,
}

impl<S, L> Orchestrator<S, L>
where
    S: SpeechModel + 'static,
    L: LanguageModel + 'static,
{
    /// Creates an orchestrator owning the given models.
    pub fn new(speech: S, refiner: L, events: crossbeam_channel::Sender<CoreEvent>) -> Self {
        Self::from_arcs(Arc::new(speech), Arc::new(refiner), events)
    }

    /// Creates an orchestrator sharing already-wrapped models.
    pub fn from_arcs(
        speech: Arc<S>,
        refiner: Arc<L>,
        events: crossbeam_channel::Sender<CoreEvent>,
    ) -> Self {
        Self {
            speech,
            refiner,
            events,
            reporter: Arc::new(LogReporter),
            interrupt: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicBool::new(false)),
            state: PipelineState::Idle,
            transcript: Arc::new(RwLock::new(String::new())),
            config: OrchestratorConfig::default(),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Sets a custom configuration.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Current machine state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Session transcript accumulated so far.
    pub fn transcript(&self) -> String {
        self.transcript.read().map(|t| t.clone()).unwrap_or_default()
    }

    /// Clears the transcript accumulator for a new session.
    pub fn reset_session(&self) {
        if let Ok(mut transcript) = self.transcript.write() {
            transcript.clear();
        }
    }

    /// Flag observed at every token boundary; store `true` to cancel.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Verifies both models are resident, bracketed by lifecycle events.
    ///
    /// Emits `Loading` before and `Ready` after; a load fault emits
    /// `Error` and is returned to the caller.
    pub async fn ensure_ready(&self) -> crate::error::Result<()> {
        self.emit(CoreEvent::Loading {
            message: "Loading models...".to_string(),
        });

        if let Err(e) = self.speech.ensure_loaded().await {
            self.reporter.report("model-load", &e);
            self.emit(CoreEvent::Error {
                message: e.to_string(),
            });
            return Err(e);
        }
        if let Err(e) = self.refiner.ensure_loaded().await {
            self.reporter.report("model-load", &e);
            self.emit(CoreEvent::Error {
                message: e.to_string(),
            });
            return Err(e);
        }

        self.emit(CoreEvent::Ready);
        Ok(())
    }

    /// Runs one request through the machine.
    ///
    /// Returns false (and does nothing) if the machine is not idle — the
    /// single-flight drop. On return the machine is always idle again,
    /// whatever happened in between.
    pub async fn process(&mut self, request: PipelineRequest) -> bool {
        if self.state != PipelineState::Idle {
            return false;
        }
        // A stale interrupt from a previous run must not kill this one.
        self.interrupt.store(false, Ordering::SeqCst);

        match request {
            PipelineRequest::Transcribe { audio, language } => {
                self.run_transcribe(audio, language).await;
            }
            PipelineRequest::Polish { text } => {
                self.run_polish(text).await;
            }
        }

        self.state = PipelineState::Idle;
        true
    }

    async fn run_transcribe(
        &mut self,
        audio: crate::audio::segmenter::AudioSegment,
        language: String,
    ) {
        self.state = PipelineState::Transcribing;
        self.emit(CoreEvent::TranscribeStarted);

        if let Err(e) = self.speech.ensure_loaded().await {
            self.fail("transcription", e);
            return;
        }

        let (token_tx, mut token_rx) = mpsc::channel(self.config.token_buffer);
        let speech = Arc::clone(&self.speech);
        let task =
            tokio::spawn(async move { speech.transcribe(audio, &language, token_tx).await });

        let started = Instant::now();
        let mut token_count = 0u32;
        let mut partial = String::new();
        let mut cancelled = false;

        while let Some(token) = token_rx.recv().await {
            if self.interrupt.swap(false, Ordering::SeqCst) {
                cancelled = true;
                break;
            }
            token_count += 1;
            partial.push_str(&token);
            self.emit(CoreEvent::TranscribeToken {
                partial: partial.clone(),
                tokens_per_second: throughput(token_count, started),
            });
        }

        if cancelled || self.interrupt.swap(false, Ordering::SeqCst) {
            task.abort();
            self.cancel("transcription");
            return;
        }

        match task.await {
            Ok(Ok(text)) => {
                let cleaned = strip_annotations(&text);
                if cleaned.is_empty() {
                    // No usable speech: terminal outcome, stage 2 never runs.
                    self.emit(CoreEvent::NoSpeechDetected);
                    return;
                }

                self.state = PipelineState::TranscribeDone;
                self.append_transcript(&cleaned);
                self.emit(CoreEvent::TranscribeComplete { text: cleaned });

                // Polishing consumes the whole session transcript, not
                // just this segment.
                let transcript = self.transcript();
                self.run_polish(transcript).await;
            }
            Ok(Err(e)) => self.fail("transcription", e),
            Err(e) => self.fail(
                "transcription",
                NotevoxError::Transcription {
                    message: format!("stage task failed: {}", e),
                },
            ),
        }
    }

    async fn run_polish(&mut self, text: String) {
        self.state = PipelineState::Polishing;
        self.emit(CoreEvent::PolishStarted);

        if let Err(e) = self.refiner.ensure_loaded().await {
            self.fail("polishing", e);
            return;
        }

        let instruction = build_polish_instruction(&text);
        let (token_tx, mut token_rx) = mpsc::channel(self.config.token_buffer);
        let refiner = Arc::clone(&self.refiner);
        let task = tokio::spawn(async move { refiner.refine(&instruction, token_tx).await });

        let started = Instant::now();
        let mut token_count = 0u32;
        let mut cancelled = false;

        while let Some(token) = token_rx.recv().await {
            if self.interrupt.swap(false, Ordering::SeqCst) {
                cancelled = true;
                break;
            }
            token_count += 1;
            self.emit(CoreEvent::PolishToken {
                token,
                tokens_per_second: throughput(token_count, started),
            });
        }

        if cancelled || self.interrupt.swap(false, Ordering::SeqCst) {
            task.abort();
            self.cancel("polishing");
            return;
        }

        match task.await {
            Ok(Ok(raw)) => {
                // Parse or degrade; this step never fails outright.
                let note = PolishedNote::from_stream_output(&raw);
                self.state = PipelineState::PolishDone;
                self.emit(CoreEvent::PolishComplete { note });
            }
            Ok(Err(e)) => self.fail("polishing", e),
            Err(e) => self.fail(
                "polishing",
                NotevoxError::Polish {
                    message: format!("stage task failed: {}", e),
                },
            ),
        }
    }

    fn emit(&self, event: CoreEvent) {
        self.events.send(event).ok();
    }

    fn fail(&mut self, stage: &str, error: NotevoxError) {
        self.reporter.report(stage, &error);
        self.state = PipelineState::Error;
        self.emit(CoreEvent::Error {
            message: error.to_string(),
        });
    }

    fn cancel(&mut self, stage: &str) {
        self.reporter.report(
            stage,
            &NotevoxError::Other(format!("{} interrupted at token boundary", stage)),
        );
    }

    fn append_transcript(&self, text: &str) {
        if let Ok(mut transcript) = self.transcript.write() {
            if !transcript.is_empty() && !text.is_empty() {
                transcript.push(' ');
            }
            transcript.push_str(text);
        }
    }

    /// Moves the orchestrator onto a worker task.
    ///
    /// The returned handle enforces the single-flight rule at submission
    /// time, so a dropped request never even reaches the worker.
    pub fn spawn(mut self) -> OrchestratorHandle {
        let (request_tx, mut request_rx) = mpsc::channel::<PipelineRequest>(1);
        let in_flight = Arc::clone(&self.in_flight);
        let interrupt = Arc::clone(&self.interrupt);
        let transcript = Arc::clone(&self.transcript);

        let worker = tokio::spawn(async move {
            while let Some(request) = request_rx.recv().await {
                self.process(request).await;
                self.in_flight.store(false, Ordering::SeqCst);
            }
        });

        OrchestratorHandle {
            requests: request_tx,
            in_flight,
            interrupt,
            transcript,
            worker,
        }
    }
}

/// Tokens emitted per second since the stage started.
fn throughput(token_count: u32, started: Instant) -> f32 {
    token_count as f32 / started.elapsed().as_secs_f32().max(1e-6)
}

/// Handle to an orchestrator running on its worker task.
pub struct OrchestratorHandle {
    requests: mpsc::Sender<PipelineRequest>,
    in_flight: Arc<AtomicBool>,
    interrupt: Arc<AtomicBool>,
    transcript: Arc<RwLock<String>>,
    worker: tokio::task::JoinHandle<()>,
}

impl OrchestratorHandle {
    /// Submits a request; returns false when the machine is busy.
    ///
    /// A rejected request is dropped by design — the segment will be
    /// superseded by a later submission once the watermark advances again.
    pub fn submit(&self, request: PipelineRequest) -> bool {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        if self.requests.try_send(request).is_err() {
            self.in_flight.store(false, Ordering::SeqCst);
            return false;
        }
        true
    }

    /// Raises the interrupt; observed at the next token boundary.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::SeqCst);
    }

    /// Returns true while a request is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Session transcript accumulated so far.
    pub fn transcript(&self) -> String {
        self.transcript.read().map(|t| t.clone()).unwrap_or_default()
    }

    /// Clears the transcript accumulator for a new session.
    pub fn reset_session(&self) {
        if let Ok(mut transcript) = self.transcript.write() {
            transcript.clear();
        }
    }

    /// Stops accepting requests and waits for the worker to finish.
    pub async fn shutdown(self) {
        drop(self.requests);
        self.worker.await.ok();
    }
}
