//! Viewer configuration.
//!
//! Every key is optional; missing keys take the defaults below. Files ending in
//! `.yaml`/`.yml` are read as YAML, anything else as JSON.
//!
//! ```json
//! {
//!   "broker": "10.243.82.33",
//!   "dataTopic": "ESP32/data",
//!   "gainsTopic": "ESP32/gains",
//!   "bufferSize": 1000,
//!   "lookbackSeconds": 10.0,
//!   "quiescenceSeconds": 2.0,
//!   "pollIntervalMs": 100,
//!   "gainMin": 0.0,
//!   "gainMax": 10.0,
//!   "connectAttempts": 5,
//!   "connectBackoffMs": 500
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use balance_bus::{DATA_TOPIC, DEFAULT_BROKER, GAINS_TOPIC, RetryPolicy};
use balance_errors::{ErrorContext, ResultExt, ViewerError};
use balance_gains::{DEFAULT_POLL_INTERVAL, DEFAULT_QUIESCENCE, GainRange, PublisherConfig};
use balance_telemetry::{DEFAULT_BUFFER_SIZE, DEFAULT_LOOKBACK_SECS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on connect backoff growth.
const MAX_CONNECT_BACKOFF: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Broker host the controller publishes to
    pub broker: String,
    /// Inbound telemetry topic
    pub data_topic: String,
    /// Outbound gain update topic
    pub gains_topic: String,
    /// Ring buffer capacity in samples
    pub buffer_size: usize,
    /// Seconds of history in each snapshot
    pub lookback_seconds: f64,
    /// Quiet time before a gain change is published
    pub quiescence_seconds: f64,
    /// Publisher tick
    pub poll_interval_ms: u64,
    /// Slider lower bound
    pub gain_min: f64,
    /// Slider upper bound
    pub gain_max: f64,
    /// Startup connection attempts before giving up
    pub connect_attempts: u32,
    /// Backoff after the first failed attempt; doubles each retry
    pub connect_backoff_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            broker: DEFAULT_BROKER.to_string(),
            data_topic: DATA_TOPIC.to_string(),
            gains_topic: GAINS_TOPIC.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            lookback_seconds: DEFAULT_LOOKBACK_SECS,
            quiescence_seconds: DEFAULT_QUIESCENCE.as_secs_f64(),
            poll_interval_ms: u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(100),
            gain_min: 0.0,
            gain_max: 10.0,
            connect_attempts: 5,
            connect_backoff_ms: 500,
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Config`] when the document does not parse or
    /// fails [`ViewerConfig::validate`].
    pub fn from_json_str(text: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| ViewerError::config(format!("invalid JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Config`] when the document does not parse or
    /// fails [`ViewerConfig::validate`].
    pub fn from_yaml_str(text: &str) -> Result<Self, ViewerError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| ViewerError::config(format!("invalid YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Io`] when the file cannot be read and
    /// [`ViewerError::Config`] when its contents are rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ctx = ErrorContext::new("load config").with("path", path.display().to_string());

        let config = if is_yaml(path) {
            Self::from_yaml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
        .context(ctx)?;

        debug!(path = %path.display(), "Loaded viewer config");
        Ok(config)
    }

    /// Write the config, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Io`] when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ViewerError> {
        let path = path.as_ref();
        let text = if is_yaml(path) {
            serde_yaml::to_string(self)
                .map_err(|e| ViewerError::config(format!("cannot serialize config: {e}")))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| ViewerError::config(format!("cannot serialize config: {e}")))?
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "Saved viewer config");
        Ok(())
    }

    /// Reject values the runtime cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.broker.trim().is_empty() {
            return Err(ViewerError::config("broker must not be empty"));
        }
        if self.data_topic.is_empty() || self.gains_topic.is_empty() {
            return Err(ViewerError::config("topics must not be empty"));
        }
        if self.data_topic == self.gains_topic {
            return Err(ViewerError::config(format!(
                "dataTopic and gainsTopic must differ (both {:?})",
                self.data_topic
            )));
        }
        if self.buffer_size == 0 {
            return Err(ViewerError::config("bufferSize must be at least 1"));
        }
        if !self.lookback_seconds.is_finite() || self.lookback_seconds <= 0.0 {
            return Err(ViewerError::config(format!(
                "lookbackSeconds must be positive, got {}",
                self.lookback_seconds
            )));
        }
        if Duration::try_from_secs_f64(self.quiescence_seconds).is_err() {
            return Err(ViewerError::config(format!(
                "quiescenceSeconds must be a zero or positive duration, got {}",
                self.quiescence_seconds
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ViewerError::config("pollIntervalMs must be at least 1"));
        }
        if !self.gain_min.is_finite() || !self.gain_max.is_finite() || self.gain_min >= self.gain_max
        {
            return Err(ViewerError::config(format!(
                "gainMin must be below gainMax, got [{}, {}]",
                self.gain_min, self.gain_max
            )));
        }
        if self.connect_attempts == 0 {
            return Err(ViewerError::config("connectAttempts must be at least 1"));
        }
        Ok(())
    }

    pub fn quiescence(&self) -> Duration {
        Duration::try_from_secs_f64(self.quiescence_seconds).unwrap_or(DEFAULT_QUIESCENCE)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn gain_range(&self) -> GainRange {
        GainRange::new(self.gain_min, self.gain_max)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let initial_backoff = Duration::from_millis(self.connect_backoff_ms);
        RetryPolicy {
            max_attempts: self.connect_attempts,
            initial_backoff,
            max_backoff: initial_backoff.max(MAX_CONNECT_BACKOFF),
        }
    }

    pub fn publisher_config(&self) -> PublisherConfig {
        PublisherConfig {
            topic: self.gains_topic.clone(),
            quiescence: self.quiescence(),
            poll_interval: self.poll_interval(),
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
