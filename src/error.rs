//! Error types for notevox.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotevoxError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Capture errors
    #[error("Microphone not available: {device}")]
    MicrophoneUnavailable { device: String },

    #[error("Audio capture failed: {message}")]
    Capture { message: String },

    #[error("Audio chunk decode failed: {message}")]
    Decode { message: String },

    // Pipeline errors
    #[error("Model not loaded: {model}")]
    ModelNotLoaded { model: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("Polishing failed: {message}")]
    Polish { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, NotevoxError>;
