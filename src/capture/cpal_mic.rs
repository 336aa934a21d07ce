//! Real microphone capture using CPAL (Cross-Platform Audio Library).

use crate::audio::decoder::encode_pcm;
use crate::capture::microphone::Microphone;
use crate::defaults;
use crate::error::{NotevoxError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Preferred device names for desktop audio servers.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
///
/// This respects the desktop's audio device selection instead of binding
/// to a raw ALSA device.
fn get_best_default_device() -> Result<cpal::Device> {
    let host = cpal::default_host();

    if let Ok(devices) = host.input_devices() {
        for device in devices {
            if let Ok(name) = device.name()
                && is_preferred_device(&name)
            {
                return Ok(device);
            }
        }
    }

    host.default_input_device()
        .ok_or_else(|| NotevoxError::MicrophoneUnavailable {
            device: "default".to_string(),
        })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: The stream is only accessed from a single thread at a time
/// through the Mutex wrapper in CpalMicrophone. The stream methods are
/// called synchronously and don't cross thread boundaries unsafely.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Exclusive microphone handle backed by CPAL.
///
/// Captures normalized f32 audio at 16kHz mono and exposes it as raw
/// little-endian f32 PCM chunks, to be decoded by `PcmChunkDecoder`.
pub struct CpalMicrophone {
    device: cpal::Device,
    stream: Mutex<Option<SendableStream>>,
    buffer: Arc<Mutex<Vec<f32>>>,
    sample_rate: u32,
}

impl CpalMicrophone {
    /// Create a new CPAL microphone.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name. If None, uses the best default.
    ///
    /// # Errors
    /// Returns errors if the device is not found or enumeration fails.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let device = if let Some(name) = device_name {
            let host = cpal::default_host();
            let devices = host
                .input_devices()
                .map_err(|e| NotevoxError::Capture {
                    message: format!("Failed to enumerate devices: {}", e),
                })?;

            let mut found_device = None;
            for dev in devices {
                if let Ok(dev_name) = dev.name()
                    && dev_name == name
                {
                    found_device = Some(dev);
                    break;
                }
            }

            found_device.ok_or_else(|| NotevoxError::MicrophoneUnavailable {
                device: name.to_string(),
            })?
        } else {
            get_best_default_device()?
        };

        Ok(Self {
            device,
            stream: Mutex::new(None),
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    /// Build the input stream with the configured format.
    ///
    /// Tries f32/16kHz/mono first (the native path for this crate), then
    /// i16/16kHz/mono with normalization. PipeWire/PulseAudio convert
    /// transparently to whichever format the device offers.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            eprintln!("notevox: audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let buffer = Arc::clone(&self.buffer);
        self.device
            .build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(data.iter().map(|&s| s as f32 / i16::MAX as f32));
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| NotevoxError::Capture {
                message: format!("Failed to build input stream: {}", e),
            })
    }
}

impl Microphone for CpalMicrophone {
    fn acquire(&mut self) -> Result<()> {
        {
            let stream_guard = self.stream.lock().map_err(|e| NotevoxError::Capture {
                message: format!("Failed to lock stream: {}", e),
            })?;
            if stream_guard.is_some() {
                return Ok(()); // Already held
            }
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| NotevoxError::Capture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        let mut stream_guard = self.stream.lock().map_err(|e| NotevoxError::Capture {
            message: format!("Failed to lock stream: {}", e),
        })?;
        *stream_guard = Some(SendableStream(stream));
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        let mut stream_guard = self.stream.lock().map_err(|e| NotevoxError::Capture {
            message: format!("Failed to lock stream: {}", e),
        })?;

        if let Some(sendable_stream) = stream_guard.take() {
            sendable_stream
                .0
                .pause()
                .map_err(|e| NotevoxError::Capture {
                    message: format!("Failed to stop audio stream: {}", e),
                })?;
        }
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.stream
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn read_chunk(&mut self) -> Result<Vec<u8>> {
        let mut buffer = self.buffer.lock().map_err(|e| NotevoxError::Capture {
            message: format!("Failed to lock audio buffer: {}", e),
        })?;

        let samples = std::mem::take(&mut *buffer);
        Ok(encode_pcm(&samples))
    }
}
