use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub stt: SttConfig,
}

/// Audio capture and segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub silence_threshold: f32,
    pub min_silence_ms: u32,
    pub max_segment_secs: u32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub language: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            silence_threshold: defaults::SILENCE_THRESHOLD,
            min_silence_ms: defaults::MIN_TRAILING_SILENCE_MS,
            max_segment_secs: defaults::MAX_SEGMENT_SECS,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - NOTEVOX_LANGUAGE → stt.language
    /// - NOTEVOX_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("NOTEVOX_LANGUAGE")
            && !language.is_empty()
        {
            self.stt.language = language;
        }

        if let Ok(device) = std::env::var("NOTEVOX_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/notevox/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("notevox").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_notevox_env() {
        remove_env("NOTEVOX_LANGUAGE");
        remove_env("NOTEVOX_AUDIO_DEVICE");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.silence_threshold, 0.01);
        assert_eq!(config.audio.min_silence_ms, 500);
        assert_eq!(config.audio.max_segment_secs, 30);
        assert_eq!(config.stt.language, "auto");
    }

    #[test]
    fn test_load_complete_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[audio]
device = "pipewire"
sample_rate = 48000
silence_threshold = 0.02
min_silence_ms = 750
max_segment_secs = 20

[stt]
language = "de"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.audio.device, Some("pipewire".to_string()));
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.silence_threshold, 0.02);
        assert_eq!(config.audio.min_silence_ms, 750);
        assert_eq!(config.audio.max_segment_secs, 20);
        assert_eq!(config.stt.language, "de");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[stt]
language = "en"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.stt.language, "en");
        // Unspecified sections fall back to defaults
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.silence_threshold, 0.01);
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not = valid [ toml").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/notevox.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid ===").unwrap();

        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_notevox_env();

        set_env("NOTEVOX_LANGUAGE", "fr");
        set_env("NOTEVOX_AUDIO_DEVICE", "pulse");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.stt.language, "fr");
        assert_eq!(config.audio.device, Some("pulse".to_string()));

        clear_notevox_env();
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_notevox_env();

        set_env("NOTEVOX_LANGUAGE", "");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.stt.language, "auto");

        clear_notevox_env();
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        if let Some(path) = Config::default_path() {
            assert!(path.ends_with("notevox/config.toml"));
        }
    }

    #[test]
    fn test_config_roundtrip_through_toml() {
        let config = Config {
            audio: AudioConfig {
                device: Some("hw:1".to_string()),
                sample_rate: 22050,
                silence_threshold: 0.015,
                min_silence_ms: 600,
                max_segment_secs: 25,
            },
            stt: SttConfig {
                language: "es".to_string(),
            },
        };

        let serialized = toml::to_string(&config).unwrap();
        let restored: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, restored);
    }
}
