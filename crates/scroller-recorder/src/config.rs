//! Recorder configuration.
//!
//! Loaded from `<config dir>/scroller/recorder.ron`. Every field is optional;
//! missing fields take the defaults in [`constants`](crate::constants).
//!
//! ```ron
//! (
//!     paste_threshold: 2,
//!     enter_timeout_ms: 500,
//!     idle_timeout_ms: 2000,
//!     max_snapshots: 200,
//!     schemes: ["file", "untitled"],
//! )
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use scroller_timeline::MAX_SNAPSHOTS;

use crate::constants::{
    CHANGE_CHANNEL_CAPACITY, CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENTER_TIMEOUT, IDLE_TIMEOUT,
    PASTE_THRESHOLD, RECORDED_SCHEMES,
};

/// Error type for config operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning for trigger classification, debounce timing, and storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Changed-character volume that triggers an immediate capture.
    pub paste_threshold: usize,
    /// Debounce after a line break, in milliseconds.
    pub enter_timeout_ms: u64,
    /// Idle debounce after an ordinary edit, in milliseconds.
    pub idle_timeout_ms: u64,
    /// Per-document timeline capacity.
    pub max_snapshots: usize,
    /// Document schemes to record.
    pub schemes: Vec<String>,
    /// Buffer size of the async change broadcast.
    pub change_channel_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            paste_threshold: PASTE_THRESHOLD,
            enter_timeout_ms: ENTER_TIMEOUT.as_millis() as u64,
            idle_timeout_ms: IDLE_TIMEOUT.as_millis() as u64,
            max_snapshots: MAX_SNAPSHOTS,
            schemes: RECORDED_SCHEMES.iter().map(|s| s.to_string()).collect(),
            change_channel_capacity: CHANGE_CHANNEL_CAPACITY,
        }
    }
}

impl RecorderConfig {
    pub fn enter_timeout(&self) -> Duration {
        Duration::from_millis(self.enter_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Whether documents with this scheme are recorded.
    pub fn records_scheme(&self, scheme: &str) -> bool {
        self.schemes.iter().any(|s| s == scheme)
    }

    /// Check invariants the recorder relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paste_threshold == 0 {
            return Err(ConfigError::Invalid(
                "paste_threshold must be at least 1".into(),
            ));
        }
        if self.max_snapshots == 0 {
            return Err(ConfigError::Invalid("max_snapshots must be at least 1".into()));
        }
        if self.change_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "change_channel_capacity must be at least 1".into(),
            ));
        }
        if self.enter_timeout_ms > self.idle_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "enter_timeout_ms ({}) must not exceed idle_timeout_ms ({})",
                self.enter_timeout_ms, self.idle_timeout_ms
            )));
        }
        Ok(())
    }

    /// Parse and validate a RON document.
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&content)
    }

    /// Default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from [`default_path`](Self::default_path), falling back to
    /// defaults when the file is absent or unusable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        Self::load_from_or_default(&path)
    }

    /// Load `path`, falling back to defaults when it is absent or unusable.
    pub fn load_from_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded recorder config");
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no recorder config, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unusable recorder config, using defaults"
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = RecorderConfig::default();
        assert_eq!(config.paste_threshold, 2);
        assert_eq!(config.enter_timeout(), Duration::from_millis(500));
        assert_eq!(config.idle_timeout(), Duration::from_millis(2000));
        assert_eq!(config.max_snapshots, 200);
        assert!(config.records_scheme("file"));
        assert!(config.records_scheme("untitled"));
        assert!(!config.records_scheme("history"));
        config.validate().unwrap();
    }

    #[test]
    fn partial_ron_keeps_other_defaults() {
        let config = RecorderConfig::from_ron_str("(idle_timeout_ms: 3000, schemes: [\"file\"])").unwrap();
        assert_eq!(config.idle_timeout_ms, 3000);
        assert_eq!(config.enter_timeout_ms, 500);
        assert_eq!(config.schemes, vec!["file".to_string()]);
        assert!(!config.records_scheme("untitled"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            RecorderConfig::from_ron_str("(max_snapshots: 0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RecorderConfig::from_ron_str("(paste_threshold: 0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RecorderConfig::from_ron_str("(enter_timeout_ms: 5000, idle_timeout_ms: 100)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RecorderConfig::from_ron_str("(max_snapshots: \"lots\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(paste_threshold: 5, max_snapshots: 10)").unwrap();

        let config = RecorderConfig::load(file.path()).unwrap();
        assert_eq!(config.paste_threshold, 5);
        assert_eq!(config.max_snapshots, 10);
    }

    #[test]
    fn missing_or_broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("recorder.ron");
        assert_eq!(RecorderConfig::load_from_or_default(&missing), RecorderConfig::default());

        std::fs::write(&missing, "(paste_threshold: ").unwrap();
        assert_eq!(RecorderConfig::load_from_or_default(&missing), RecorderConfig::default());
    }

    #[test]
    fn default_config_round_trips_through_ron() {
        let config = RecorderConfig::default();
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(RecorderConfig::from_ron_str(&text).unwrap(), config);
    }
}
