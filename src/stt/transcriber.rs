use crate::audio::segmenter::AudioSegment;
use crate::error::{NotevoxError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Trait for the speech-to-text stage.
///
/// This trait allows swapping implementations (a real engine vs mock).
/// The model is a heavy, externally-managed resource held by reference;
/// `ensure_loaded` is the explicit readiness precondition.
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Make sure the model weights are resident before inference.
    async fn ensure_loaded(&self) -> Result<()>;

    /// Transcribe one audio segment.
    ///
    /// Intermediate tokens are pushed into `tokens` as they are produced;
    /// each send is a cooperative suspension point. The return value is
    /// the final decoded string.
    ///
    /// # Arguments
    /// * `audio` - Finalized segment of normalized samples
    /// * `language` - Language hint ("auto" for detection)
    /// * `tokens` - Channel for streaming intermediate tokens
    async fn transcribe(
        &self,
        audio: AudioSegment,
        language: &str,
        tokens: mpsc::Sender<String>,
    ) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Implement SpeechModel for Arc<T> to allow sharing across sessions.
#[async_trait]
impl<T: SpeechModel> SpeechModel for Arc<T> {
    async fn ensure_loaded(&self) -> Result<()> {
        (**self).ensure_loaded().await
    }

    async fn transcribe(
        &self,
        audio: AudioSegment,
        language: &str,
        tokens: mpsc::Sender<String>,
    ) -> Result<String> {
        (**self).transcribe(audio, language, tokens).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Mock speech model for testing
pub struct MockSpeechModel {
    model_name: String,
    response: String,
    should_fail: bool,
    should_fail_load: bool,
    token_delay: Duration,
    calls: AtomicUsize,
}

impl MockSpeechModel {
    /// Create a new mock speech model with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
            should_fail_load: false,
            token_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to fail on ensure_loaded
    pub fn with_load_failure(mut self) -> Self {
        self.should_fail_load = true;
        self
    }

    /// Add a delay between emitted tokens (for cancellation tests)
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = delay;
        self
    }

    /// Number of transcribe calls observed
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechModel for MockSpeechModel {
    async fn ensure_loaded(&self) -> Result<()> {
        if self.should_fail_load {
            Err(NotevoxError::ModelNotLoaded {
                model: self.model_name.clone(),
            })
        } else {
            Ok(())
        }
    }

    async fn transcribe(
        &self,
        _audio: AudioSegment,
        _language: &str,
        tokens: mpsc::Sender<String>,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(NotevoxError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }

        for (i, word) in self.response.split_whitespace().enumerate() {
            if !self.token_delay.is_zero() {
                tokio::time::sleep(self.token_delay).await;
            }
            // Tokens carry their own spacing so concatenation reproduces
            // the final text, like a real decoder's pieces.
            let token = if i == 0 {
                word.to_string()
            } else {
                format!(" {}", word)
            };
            if tokens.send(token).await.is_err() {
                // Receiver dropped: the run was cancelled.
                break;
            }
        }

        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> AudioSegment {
        AudioSegment::new(vec![0.5; 1000], 16000, 0)
    }

    #[tokio::test]
    async fn mock_streams_tokens_then_returns_response() {
        let model = MockSpeechModel::new("test-model").with_response("hello streaming world");
        let (tx, mut rx) = mpsc::channel(16);

        let text = model.transcribe(segment(), "en", tx).await.unwrap();
        assert_eq!(text, "hello streaming world");

        let mut streamed = String::new();
        while let Some(token) = rx.recv().await {
            streamed.push_str(&token);
        }
        assert_eq!(streamed, "hello streaming world");
    }

    #[tokio::test]
    async fn mock_failure_returns_error() {
        let model = MockSpeechModel::new("test-model").with_failure();
        let (tx, _rx) = mpsc::channel(16);

        let result = model.transcribe(segment(), "en", tx).await;
        assert!(matches!(result, Err(NotevoxError::Transcription { .. })));
    }

    #[tokio::test]
    async fn mock_ensure_loaded() {
        let ready = MockSpeechModel::new("test-model");
        assert!(ready.ensure_loaded().await.is_ok());

        let unloaded = MockSpeechModel::new("test-model").with_load_failure();
        assert!(matches!(
            unloaded.ensure_loaded().await,
            Err(NotevoxError::ModelNotLoaded { .. })
        ));
    }

    #[tokio::test]
    async fn mock_counts_calls() {
        let model = MockSpeechModel::new("test-model");
        let (tx, _rx) = mpsc::channel(16);
        let (tx2, _rx2) = mpsc::channel(16);

        model.transcribe(segment(), "en", tx).await.unwrap();
        model.transcribe(segment(), "en", tx2).await.unwrap();
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn mock_stops_streaming_when_receiver_dropped() {
        let model = MockSpeechModel::new("test-model").with_response("a b c d e");
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // Still completes without hanging.
        let text = model.transcribe(segment(), "en", tx).await.unwrap();
        assert_eq!(text, "a b c d e");
    }

    #[tokio::test]
    async fn arc_wrapper_delegates() {
        let model = Arc::new(MockSpeechModel::new("shared").with_response("via arc"));
        let (tx, _rx) = mpsc::channel(16);

        assert_eq!(model.model_name(), "shared");
        let text = model.transcribe(segment(), "auto", tx).await.unwrap();
        assert_eq!(text, "via arc");
    }

    #[test]
    fn model_name_is_reported() {
        let model = MockSpeechModel::new("base.en");
        assert_eq!(model.model_name(), "base.en");
    }
}
