use crate::error::{NotevoxError, Result};
use std::collections::VecDeque;

/// Trait for the platform microphone resource.
///
/// This trait allows swapping implementations (real device vs mock).
/// Implementations deliver raw *encoded* chunks; decoding is the
/// `ChunkDecoder`'s concern.
pub trait Microphone: Send {
    /// Acquire the exclusive recording handle and begin capturing.
    ///
    /// Must be idempotent: acquiring an already-held handle is a no-op.
    fn acquire(&mut self) -> Result<()>;

    /// Release the recording handle.
    ///
    /// Must be safe to call when the handle is not held.
    fn release(&mut self) -> Result<()>;

    /// Returns true while the exclusive handle is held.
    fn is_held(&self) -> bool;

    /// Read the next encoded chunk.
    ///
    /// An empty chunk means no data is available yet; it is not an error.
    fn read_chunk(&mut self) -> Result<Vec<u8>>;
}

/// Mock microphone for testing
pub struct MockMicrophone {
    chunks: VecDeque<Vec<u8>>,
    held: bool,
    acquire_count: usize,
    should_fail_acquire: bool,
    should_fail_read: bool,
}

impl MockMicrophone {
    /// Create a mock with no scripted chunks
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
            held: false,
            acquire_count: 0,
            should_fail_acquire: false,
            should_fail_read: false,
        }
    }

    /// Script the chunks returned by successive `read_chunk` calls.
    ///
    /// Once the script is exhausted, reads return empty chunks.
    pub fn with_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks.into();
        self
    }

    /// Configure the mock to fail on acquire
    pub fn with_acquire_failure(mut self) -> Self {
        self.should_fail_acquire = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Number of times the handle was actually acquired.
    ///
    /// Idempotent re-acquisition must not increase this.
    pub fn acquire_count(&self) -> usize {
        self.acquire_count
    }
}

impl Default for MockMicrophone {
    fn default() -> Self {
        Self::new()
    }
}

impl Microphone for MockMicrophone {
    fn acquire(&mut self) -> Result<()> {
        if self.held {
            return Ok(());
        }
        if self.should_fail_acquire {
            return Err(NotevoxError::MicrophoneUnavailable {
                device: "mock".to_string(),
            });
        }
        self.held = true;
        self.acquire_count += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.held = false;
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held
    }

    fn read_chunk(&mut self) -> Result<Vec<u8>> {
        if self.should_fail_read {
            return Err(NotevoxError::Capture {
                message: "mock read failure".to_string(),
            });
        }
        Ok(self.chunks.pop_front().unwrap_or_default())
    }
}
