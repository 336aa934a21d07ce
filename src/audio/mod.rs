//! Audio segmentation for notevox.
//!
//! Decoded samples accumulate in a session buffer; the segmenter watches
//! the unsent span past the watermark and finalizes an utterance when a
//! trailing pause appears or the hard length cap is hit.

pub mod decoder;
pub mod segmenter;
pub mod silence;

pub use decoder::{ChunkDecoder, MockChunkDecoder, PcmChunkDecoder, WavChunkDecoder};
pub use segmenter::{AudioSegment, Segmenter, SegmenterConfig};
pub use silence::{contains_sound, has_trailing_silence};
