//! Utterance segmentation over the session audio buffer.
//!
//! The segmenter owns every decoded sample of the current recording
//! session plus a watermark marking how far audio has already been handed
//! off for transcription. Each time new samples arrive it decides whether
//! the unsent span is a finished utterance, pure silence, or still growing.

use crate::audio::silence::{contains_sound, has_trailing_silence};
use crate::defaults;

/// Configuration for the segmenter.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Sample rate of the session audio in Hz.
    pub sample_rate: u32,
    /// Amplitude at or below which a sample counts as silent.
    pub silence_threshold: f32,
    /// Trailing silence duration (ms) that finalizes an utterance.
    pub min_silence_ms: u32,
    /// Hard cap on segment duration in seconds.
    pub max_segment_secs: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            silence_threshold: defaults::SILENCE_THRESHOLD,
            min_silence_ms: defaults::MIN_TRAILING_SILENCE_MS,
            max_segment_secs: defaults::MAX_SEGMENT_SECS,
        }
    }
}

impl SegmenterConfig {
    /// Creates segmentation configuration from app config.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            silence_threshold: config.audio.silence_threshold,
            min_silence_ms: config.audio.min_silence_ms,
            max_segment_secs: config.audio.max_segment_secs,
        }
    }
}

/// A finalized, immutable span of audio submitted as one transcription unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    /// Normalized samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Index of the first sample within the session buffer.
    pub start_sample: usize,
}

impl AudioSegment {
    /// Creates a segment from raw samples at the given rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32, start_sample: usize) -> Self {
        Self {
            samples,
            sample_rate,
            start_sample,
        }
    }

    /// Number of samples in this segment.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the segment holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of this segment in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        (self.samples.len() as u64 * 1000 / self.sample_rate as u64) as u32
    }
}

/// Segmentation engine: session buffer + already-sent watermark.
///
/// Correctness contract: every sample is eventually either folded into
/// exactly one emitted segment or classified as pure silence and
/// discarded. No sample is handed off twice; no non-silent sample is
/// permanently dropped.
pub struct Segmenter {
    config: SegmenterConfig,
    /// All decoded samples since session start.
    buffer: Vec<f32>,
    /// Sample index up to which audio has been dispatched.
    watermark: usize,
}

impl Segmenter {
    /// Creates a segmenter with default configuration.
    pub fn new() -> Self {
        Self::with_config(SegmenterConfig::default())
    }

    /// Creates a segmenter with custom configuration.
    pub fn with_config(config: SegmenterConfig) -> Self {
        Self {
            config,
            buffer: Vec::new(),
            watermark: 0,
        }
    }

    fn min_silence_samples(&self) -> usize {
        defaults::min_silence_samples(self.config.sample_rate, self.config.min_silence_ms)
    }

    fn max_segment_samples(&self) -> usize {
        (self.config.sample_rate as u64 * self.config.max_segment_secs as u64) as usize
    }

    /// Current watermark: the sample index already handed off.
    pub fn watermark(&self) -> usize {
        self.watermark
    }

    /// Total samples buffered this session.
    pub fn buffered_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Appends newly decoded samples and re-evaluates the unsent span.
    ///
    /// Returns a finalized segment when the span ends in enough trailing
    /// silence or exceeds the hard length cap.
    pub fn extend(&mut self, samples: &[f32]) -> Option<AudioSegment> {
        self.buffer.extend_from_slice(samples);
        self.evaluate()
    }

    /// Evaluates the unsent span against the segmentation rules.
    fn evaluate(&mut self) -> Option<AudioSegment> {
        let unsent = &self.buffer[self.watermark..];
        if unsent.is_empty() {
            return None;
        }

        let over_cap = unsent.len() > self.max_segment_samples();

        // Pure silence within the cap is consumed without cost.
        if !over_cap && !contains_sound(unsent, self.config.silence_threshold) {
            self.watermark = self.buffer.len();
            return None;
        }

        if over_cap
            || has_trailing_silence(
                unsent,
                self.config.silence_threshold,
                self.min_silence_samples(),
            )
        {
            return Some(self.take_unsent());
        }

        // Utterance still in progress; wait for more audio.
        None
    }

    /// Emits any residual non-silent audio regardless of trailing silence.
    ///
    /// Called at session stop so the last utterance is not lost. Pure
    /// silence is discarded; the watermark always advances to the buffer end.
    pub fn flush(&mut self) -> Option<AudioSegment> {
        let unsent = &self.buffer[self.watermark..];
        if unsent.is_empty() {
            return None;
        }

        if !contains_sound(unsent, self.config.silence_threshold) {
            self.watermark = self.buffer.len();
            return None;
        }

        Some(self.take_unsent())
    }

    fn take_unsent(&mut self) -> AudioSegment {
        let start = self.watermark;
        let samples = self.buffer[start..].to_vec();
        self.watermark = self.buffer.len();
        AudioSegment::new(samples, self.config.sample_rate, start)
    }

    /// Clears the session buffer and resets the watermark to 0.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.watermark = 0;
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}
