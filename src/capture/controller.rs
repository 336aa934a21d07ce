//! Capture controller: owns the live recording session.
//!
//! Reads encoded chunks from the microphone, decodes them asynchronously
//! (decode calls are serialized per session through `&mut self`, keeping
//! the watermark consistent), and feeds the segmenter. Capture faults are
//! absorbed here and never cross into the pipeline: a failed read or
//! decode yields no audio, which the session surfaces as "no speech".

use crate::audio::decoder::ChunkDecoder;
use crate::audio::segmenter::{AudioSegment, Segmenter, SegmenterConfig};
use crate::capture::microphone::Microphone;
use crate::defaults;
use crate::error::Result;
use std::time::Duration;

/// Lifecycle of the capture controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No session; microphone not held.
    Idle,
    /// Microphone acquired, waiting for the first chunk.
    Armed,
    /// Chunks are flowing.
    Recording,
}

/// Controller for one recording session at a time.
pub struct CaptureController<M: Microphone, D: ChunkDecoder> {
    mic: M,
    decoder: D,
    segmenter: Segmenter,
    state: CaptureState,
    retry_delay: Duration,
}

impl<M: Microphone, D: ChunkDecoder> CaptureController<M, D> {
    /// Creates a controller with default segmentation configuration.
    pub fn new(mic: M, decoder: D) -> Self {
        Self::with_config(mic, decoder, SegmenterConfig::default())
    }

    /// Creates a controller with custom segmentation configuration.
    pub fn with_config(mic: M, decoder: D, config: SegmenterConfig) -> Self {
        Self {
            mic,
            decoder,
            segmenter: Segmenter::with_config(config),
            state: CaptureState::Idle,
            retry_delay: Duration::from_millis(defaults::EMPTY_CHUNK_RETRY_MS),
        }
    }

    /// Overrides the empty-chunk retry delay (mainly for tests).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Current controller state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Current segmentation watermark (samples already handed off).
    pub fn watermark(&self) -> usize {
        self.segmenter.watermark()
    }

    /// Starts a recording session by acquiring the microphone.
    ///
    /// Idempotent: calling `start` while a session is active is a no-op
    /// and does not acquire a second handle.
    pub fn start(&mut self) -> Result<()> {
        if self.state != CaptureState::Idle {
            return Ok(());
        }
        self.mic.acquire()?;
        self.state = CaptureState::Armed;
        Ok(())
    }

    /// Reads, decodes, and segments the next chunk of audio.
    ///
    /// Returns a finalized segment when the segmenter closes an utterance.
    /// An empty chunk schedules one bounded retry before giving up for this
    /// round; read and decode faults are absorbed (the audio is treated as
    /// absent) so the session continues.
    pub async fn poll(&mut self) -> Option<AudioSegment> {
        if self.state == CaptureState::Idle {
            return None;
        }

        let mut chunk = match self.mic.read_chunk() {
            Ok(chunk) => chunk,
            Err(e) => {
                eprintln!("notevox: microphone read failed: {}", e);
                return None;
            }
        };

        if chunk.is_empty() {
            // Transient driver hiccup: wait once, then try again.
            tokio::time::sleep(self.retry_delay).await;
            chunk = match self.mic.read_chunk() {
                Ok(chunk) => chunk,
                Err(e) => {
                    eprintln!("notevox: microphone read failed: {}", e);
                    return None;
                }
            };
            if chunk.is_empty() {
                return None;
            }
        }

        if self.state == CaptureState::Armed {
            self.state = CaptureState::Recording;
        }

        // Suspend point: decode runs async but never overlaps for one
        // session, because it is reached through `&mut self`.
        let samples = match self.decoder.decode(&chunk).await {
            Ok(samples) => samples,
            Err(e) => {
                eprintln!("notevox: chunk decode failed, treating audio as absent: {}", e);
                return None;
            }
        };

        self.segmenter.extend(&samples)
    }

    /// Stops the session and tears it down.
    ///
    /// Flushes the segmenter first so a final in-flight utterance is
    /// handed off, then releases the microphone (always, even when release
    /// reports an error), and only then resets the watermark.
    pub fn stop(&mut self) -> Option<AudioSegment> {
        if self.state == CaptureState::Idle {
            return None;
        }

        let final_segment = self.segmenter.flush();

        if let Err(e) = self.mic.release() {
            eprintln!("notevox: failed to release microphone: {}", e);
        }

        self.segmenter.reset();
        self.state = CaptureState::Idle;

        final_segment
    }
}

impl<M: Microphone, D: ChunkDecoder> Drop for CaptureController<M, D> {
    fn drop(&mut self) {
        if self.state != CaptureState::Idle
            && let Err(e) = self.mic.release()
        {
            eprintln!("notevox: failed to release microphone on drop: {}", e);
        }
    }
}
