//! Decoding of raw encoded capture chunks into normalized samples.
//!
//! The capture layer hands over encoded byte chunks; decoding happens
//! asynchronously and is a suspend point in the capture flow. Decoders are
//! driven through `&mut self`, which serializes decode calls per session.

use crate::error::{NotevoxError, Result};
use async_trait::async_trait;
use std::io::Cursor;

/// Trait for decoding one encoded audio chunk into normalized samples.
#[async_trait]
pub trait ChunkDecoder: Send {
    /// Decode an encoded chunk to normalized f32 samples in [-1.0, 1.0].
    async fn decode(&mut self, encoded: &[u8]) -> Result<Vec<f32>>;
}

/// Decoder for WAV-encoded chunks.
///
/// Accepts 16-bit integer and 32-bit float WAV data; multi-channel input
/// is mixed down to mono by averaging.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavChunkDecoder;

impl WavChunkDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_sync(encoded: &[u8]) -> Result<Vec<f32>> {
        let mut reader =
            hound::WavReader::new(Cursor::new(encoded)).map_err(|e| NotevoxError::Decode {
                message: format!("Failed to parse WAV chunk: {}", e),
            })?;

        let spec = reader.spec();
        let channels = spec.channels as usize;

        let mono: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let raw: Vec<i16> = reader
                    .samples::<i16>()
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| NotevoxError::Decode {
                        message: format!("Failed to read WAV samples: {}", e),
                    })?;
                mix_to_mono(&raw, channels)
                    .into_iter()
                    .map(|s| s / i16::MAX as f32)
                    .collect()
            }
            hound::SampleFormat::Float => {
                let raw: Vec<f32> = reader
                    .samples::<f32>()
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| NotevoxError::Decode {
                        message: format!("Failed to read WAV samples: {}", e),
                    })?;
                mix_to_mono(&raw, channels)
            }
        };

        Ok(mono)
    }
}

#[async_trait]
impl ChunkDecoder for WavChunkDecoder {
    async fn decode(&mut self, encoded: &[u8]) -> Result<Vec<f32>> {
        Self::decode_sync(encoded)
    }
}

/// Mix interleaved multi-channel samples down to mono by averaging.
fn mix_to_mono<T: Into<f32> + Copy>(samples: &[T], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.iter().map(|&s| s.into()).collect();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().map(|&s| s.into()).sum::<f32>() / channels as f32)
        .collect()
}

/// Decoder for raw little-endian f32 PCM chunks.
///
/// This is the zero-conversion path used by the cpal microphone, which
/// already delivers normalized float samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcmChunkDecoder;

impl PcmChunkDecoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChunkDecoder for PcmChunkDecoder {
    async fn decode(&mut self, encoded: &[u8]) -> Result<Vec<f32>> {
        if encoded.len() % 4 != 0 {
            return Err(NotevoxError::Decode {
                message: format!(
                    "PCM chunk length {} is not a multiple of 4 bytes",
                    encoded.len()
                ),
            });
        }

        Ok(encoded
            .chunks_exact(4)
            .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect())
    }
}

/// Encode normalized samples as raw little-endian f32 PCM bytes.
///
/// Inverse of `PcmChunkDecoder::decode`; used by microphone implementations
/// that deliver already-decoded float samples.
pub fn encode_pcm(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Mock decoder for testing
pub struct MockChunkDecoder {
    samples_per_chunk: Vec<f32>,
    should_fail: bool,
    decode_count: usize,
}

impl MockChunkDecoder {
    /// Create a mock that decodes every chunk to the given samples
    pub fn new(samples_per_chunk: Vec<f32>) -> Self {
        Self {
            samples_per_chunk,
            should_fail: false,
            decode_count: 0,
        }
    }

    /// Configure the mock to fail on decode
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of decode calls observed
    pub fn decode_count(&self) -> usize {
        self.decode_count
    }
}

#[async_trait]
impl ChunkDecoder for MockChunkDecoder {
    async fn decode(&mut self, _encoded: &[u8]) -> Result<Vec<f32>> {
        self.decode_count += 1;
        if self.should_fail {
            Err(NotevoxError::Decode {
                message: "mock decode failure".to_string(),
            })
        } else {
            Ok(self.samples_per_chunk.clone())
        }
    }
}
