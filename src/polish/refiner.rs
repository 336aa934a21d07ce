//! LanguageModel trait for post-transcription note refinement.

use crate::error::{NotevoxError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Trait for the text-refinement stage.
///
/// Implementations receive a structured instruction (built by
/// `polish::prompt`) and stream their raw output token by token; the
/// return value is the complete raw output. Parsing and validation of
/// that output is the caller's concern.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Make sure the model weights are resident before inference.
    async fn ensure_loaded(&self) -> Result<()>;

    /// Refine text according to the given instruction.
    ///
    /// Intermediate tokens are pushed into `tokens` as they are produced;
    /// each send is a cooperative suspension point.
    async fn refine(&self, instruction: &str, tokens: mpsc::Sender<String>) -> Result<String>;

    /// Return the name of this model for logging.
    fn model_name(&self) -> &str;
}

/// Implement LanguageModel for Arc<T> to allow sharing across sessions.
#[async_trait]
impl<T: LanguageModel> LanguageModel for Arc<T> {
    async fn ensure_loaded(&self) -> Result<()> {
        (**self).ensure_loaded().await
    }

    async fn refine(&self, instruction: &str, tokens: mpsc::Sender<String>) -> Result<String> {
        (**self).refine(instruction, tokens).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Mock language model for testing
pub struct MockLanguageModel {
    model_name: String,
    response: String,
    should_fail: bool,
    should_fail_load: bool,
    token_delay: Duration,
    calls: AtomicUsize,
    last_instruction: Mutex<Option<String>>,
}

impl MockLanguageModel {
    /// Create a new mock language model with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: String::new(),
            should_fail: false,
            should_fail_load: false,
            token_delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_instruction: Mutex::new(None),
        }
    }

    /// Configure the mock to return a specific raw response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on refine
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

    /// Number of refine calls observed
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The instruction passed to the most recent refine call
    pub fn last_instruction(&self) -> Option<String> {
        self.last_instruction.lock().ok().and_then(|g| g.clone())
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn ensure_loaded(&self) -> Result<()> {
        if self.should_fail_load {
            Err(NotevoxError::ModelNotLoaded {
                model: self.model_name.clone(),
            })
        } else {
            Ok(())
        }
    }

    async fn refine(&self, instruction: &str, tokens: mpsc::Sender<String>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_instruction.lock() {
            *last = Some(instruction.to_string());
        }

        if self.should_fail {
            return Err(NotevoxError::Polish {
                message: "mock refinement failure".to_string(),
            });
        }

        // Stream in small pieces so callers see multiple token boundaries.
        let piece_len = 8usize;
        let mut start = 0;
        let bytes = self.response.as_bytes();
        while start < bytes.len() {
            let mut end = (start + piece_len).min(bytes.len());
            while !self.response.is_char_boundary(end) {
                end += 1;
            }
            if !self.token_delay.is_zero() {
                tokio::time::sleep(self.token_delay).await;
            }
            if tokens
                .send(self.response[start..end].to_string())
                .await
                .is_err()
            {
                break;
            }
            start = end;
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

    #[tokio::test]
    async fn mock_streams_pieces_that_reassemble_to_response() {
        let response = r#"{"title":"T","category":"C","tags":["a"],"content":"X"}"#;
        let model = MockLanguageModel::new("mock").with_response(response);
        let (tx, mut rx) = mpsc::channel(64);

        let raw = model.refine("instruction", tx).await.unwrap();
        assert_eq!(raw, response);

        let mut reassembled = String::new();
        while let Some(piece) = rx.recv().await {
            reassembled.push_str(&piece);
        }
        assert_eq!(reassembled, response);
    }

    #[tokio::test]
    async fn mock_failure_returns_error() {
        let model = MockLanguageModel::new("mock").with_failure();
        let (tx, _rx) = mpsc::channel(16);

        let result = model.refine("instruction", tx).await;
        assert!(matches!(result, Err(NotevoxError::Polish { .. })));
    }

    #[tokio::test]
    async fn mock_ensure_loaded() {
        let ready = MockLanguageModel::new("mock");
        assert!(ready.ensure_loaded().await.is_ok());

        let unloaded = MockLanguageModel::new("mock").with_load_failure();
        assert!(matches!(
            unloaded.ensure_loaded().await,
            Err(NotevoxError::ModelNotLoaded { .. })
        ));
    }

    #[tokio::test]
    async fn mock_counts_calls() {
        let model = MockLanguageModel::new("mock").with_response("x");
        let (tx, _rx) = mpsc::channel(16);
        model.refine("a", tx).await.unwrap();
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn multibyte_response_splits_on_char_boundaries() {
        let response = "Überblick über Größenordnungen";
        let model = MockLanguageModel::new("mock").with_response(response);
        let (tx, mut rx) = mpsc::channel(64);

        model.refine("i", tx).await.unwrap();

        let mut reassembled = String::new();
        while let Some(piece) = rx.recv().await {
            reassembled.push_str(&piece);
        }
        assert_eq!(reassembled, response);
    }
}
