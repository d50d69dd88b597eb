//! Configuration management and validation.
//!
//! Provides the intake session configuration: storage endpoint, payload
//! wrapping, transfer indicator pacing and notification buffering. Values
//! come from defaults, an optional TOML file, then command-line overrides.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CATEGORY, DEFAULT_ENDPOINT,
    DEFAULT_MAX_PROGRESS_STEP, DEFAULT_MIN_PROGRESS_STEP, DEFAULT_NOTIFICATION_CAPACITY,
    DEFAULT_PAYLOAD_KEY, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TRANSFER_TICK_MS,
};
use crate::error::{IntakeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Configuration for an intake session and its submission gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Storage backend URL receiving submission batches
    pub endpoint: String,

    /// Key the payload is wrapped under in the request body
    pub payload_key: String,

    /// Category used when none is chosen explicitly
    pub default_category: String,

    /// Milliseconds between transfer indicator ticks
    pub transfer_tick_ms: u64,

    /// Smallest random progress step per tick
    pub min_progress_step: f64,

    /// Largest random progress step per tick
    pub max_progress_step: f64,

    /// HTTP request timeout for submissions
    pub request_timeout_secs: u64,

    /// Notifications buffered per subscriber
    pub notification_capacity: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            payload_key: DEFAULT_PAYLOAD_KEY.to_string(),
            default_category: DEFAULT_CATEGORY.to_string(),
            transfer_tick_ms: DEFAULT_TRANSFER_TICK_MS,
            min_progress_step: DEFAULT_MIN_PROGRESS_STEP,
            max_progress_step: DEFAULT_MAX_PROGRESS_STEP,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}

impl IntakeConfig {
    /// Platform config file location, e.g. `~/.config/exo-intake/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            IntakeError::configuration("Could not determine user config directory")
        })?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents).map_err(|source| IntakeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, else from the default location if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_config_path() {
                Ok(default_path) if default_path.exists() => Self::from_file(&default_path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(IntakeError::configuration("endpoint cannot be empty"));
        }
        if self.payload_key.trim().is_empty() {
            return Err(IntakeError::configuration("payload_key cannot be empty"));
        }
        if self.transfer_tick_ms == 0 {
            return Err(IntakeError::configuration(
                "transfer_tick_ms must be greater than zero",
            ));
        }
        if !(self.min_progress_step > 0.0
            && self.min_progress_step <= self.max_progress_step
            && self.max_progress_step.is_finite())
        {
            return Err(IntakeError::configuration(format!(
                "progress steps must satisfy 0 < min ({}) <= max ({})",
                self.min_progress_step, self.max_progress_step
            )));
        }
        if self.notification_capacity == 0 {
            return Err(IntakeError::configuration(
                "notification_capacity must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn transfer_tick(&self) -> Duration {
        Duration::from_millis(self.transfer_tick_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Set the storage backend endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the key the payload is wrapped under
    pub fn with_payload_key(mut self, key: impl Into<String>) -> Self {
        self.payload_key = key.into();
        self
    }

    /// Set the default submission category
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    /// Set the transfer indicator tick interval
    pub fn with_transfer_tick(mut self, tick: Duration) -> Self {
        self.transfer_tick_ms = tick.as_millis().max(1) as u64;
        self
    }

    /// Set the bounds of a single progress step
    pub fn with_progress_steps(mut self, min: f64, max: f64) -> Self {
        self.min_progress_step = min;
        self.max_progress_step = max;
        self
    }

    /// Set the HTTP request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = IntakeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.payload_key, "planetas");
        assert_eq!(config.transfer_tick(), Duration::from_millis(200));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "endpoint = \"http://example.test/batches\"").unwrap();
        writeln!(temp_file, "transfer_tick_ms = 5").unwrap();

        let config = IntakeConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.endpoint, "http://example.test/batches");
        assert_eq!(config.transfer_tick_ms, 5);
        assert_eq!(config.default_category, "exoplanet");
        assert_eq!(config.max_progress_step, 20.0);
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "transfer_tick_ms = \"fast\"").unwrap();

        match IntakeConfig::from_file(temp_file.path()) {
            Err(IntakeError::ConfigParse { path, .. }) => assert_eq!(path, temp_file.path()),
            other => panic!("Expected ConfigParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let inverted = IntakeConfig::default().with_progress_steps(10.0, 5.0);
        assert!(inverted.validate().is_err());

        let zero_step = IntakeConfig::default().with_progress_steps(0.0, 5.0);
        assert!(zero_step.validate().is_err());

        let nan_step = IntakeConfig::default().with_progress_steps(f64::NAN, 5.0);
        assert!(nan_step.validate().is_err());

        let unbounded = IntakeConfig::default().with_progress_steps(1.0, f64::INFINITY);
        assert!(unbounded.validate().is_err());

        let empty_endpoint = IntakeConfig::default().with_endpoint("  ");
        assert!(matches!(
            empty_endpoint.validate(),
            Err(IntakeError::Configuration { .. })
        ));
    }

    #[test]
    fn test_builders() {
        let config = IntakeConfig::default()
            .with_payload_key("batch")
            .with_default_category("research")
            .with_transfer_tick(Duration::from_micros(10))
            .with_request_timeout(Duration::from_secs(3));

        assert_eq!(config.payload_key, "batch");
        assert_eq!(config.default_category, "research");
        assert_eq!(config.transfer_tick_ms, 1);
        assert_eq!(config.request_timeout_secs, 3);
    }
}
