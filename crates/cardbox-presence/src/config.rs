//! Detector configuration.
//!
//! Configuration is read from a JSON file. Every key is optional; missing
//! keys take their default value.
//!
//! ```json
//! {
//!     "min_interval_ms": 2000,
//!     "poll_interval_ms": 200,
//!     "anticollision_timeout_ms": 100,
//!     "anticollision_retry_delay_ms": 10,
//!     "event_channel_capacity": 32
//! }
//! ```

use cardbox_core::constants::{
    DEFAULT_ANTICOLLISION_RETRY_DELAY_MS, DEFAULT_ANTICOLLISION_TIMEOUT_MS,
    DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_MIN_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS,
};
use cardbox_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Timing and delivery settings of a presence detector.
///
/// # Example
///
/// ```
/// use cardbox_presence::DetectorConfig;
/// use std::time::Duration;
///
/// let config = DetectorConfig::from_json_str(r#"{ "min_interval_ms": 1500 }"#).unwrap();
/// assert_eq!(config.min_interval(), Duration::from_millis(1500));
/// assert_eq!(config.poll_interval(), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum time between reported detections, and between a removal
    /// and the next reported detection.
    pub min_interval_ms: u64,

    /// Period of the poll loop.
    pub poll_interval_ms: u64,

    /// Upper bound on the anticollision retry loop within one tick.
    pub anticollision_timeout_ms: u64,

    /// Pause between two anticollision attempts.
    pub anticollision_retry_delay_ms: u64,

    /// Capacity of the channel carrying confirmed tag events.
    pub event_channel_capacity: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            anticollision_timeout_ms: DEFAULT_ANTICOLLISION_TIMEOUT_MS,
            anticollision_retry_delay_ms: DEFAULT_ANTICOLLISION_RETRY_DELAY_MS,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

impl DetectorConfig {
    /// Parse a configuration from JSON text and validate it.
    ///
    /// # Errors
    /// Returns `Error::Json` for malformed JSON and `Error::Config` for
    /// invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise see
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Read a configuration file, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_json_file(path) {
            Ok(config) => {
                info!("Settings loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!(
                    "Failed to load settings from {}: {}; using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Check that the values describe a workable poll loop.
    ///
    /// # Errors
    /// Returns `Error::Config` if the poll interval or channel capacity is
    /// zero, or if one anticollision budget would not fit inside a tick.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be positive".to_string()));
        }

        if self.event_channel_capacity == 0 {
            return Err(Error::Config(
                "event_channel_capacity must be positive".to_string(),
            ));
        }

        if self.anticollision_timeout_ms >= self.poll_interval_ms {
            return Err(Error::Config(format!(
                "anticollision_timeout_ms ({}) must be shorter than poll_interval_ms ({})",
                self.anticollision_timeout_ms, self.poll_interval_ms
            )));
        }

        Ok(())
    }

    /// Minimum interval between reported detections.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Period of the poll loop.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Anticollision time budget per tick.
    pub fn anticollision_timeout(&self) -> Duration {
        Duration::from_millis(self.anticollision_timeout_ms)
    }

    /// Pause between anticollision attempts.
    pub fn anticollision_retry_delay(&self) -> Duration {
        Duration::from_millis(self.anticollision_retry_delay_ms)
    }
}
