//! Client timing configuration.
//!
//! The defaults match the device's reference setup at 115200 baud: a reply
//! line must arrive within 200 ms and state polling runs every 100 ms.
//!
//! ```yaml
//! read_timeout_ms: 200
//! poll_interval_ms: 100
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Default budget for a single reply line.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 200;

/// Default delay between state polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Timing parameters for the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// How long [`read_line`](crate::ODrive::read_line) waits for a terminator
    /// before returning whatever arrived.
    pub read_timeout_ms: u64,

    /// Delay before each `current_state` poll in
    /// [`run_state`](crate::ODrive::run_state).
    pub poll_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl ClientConfig {
    /// Set the per-line read timeout.
    pub fn with_read_timeout_ms(mut self, read_timeout_ms: u64) -> Self {
        self.read_timeout_ms = read_timeout_ms;
        self
    }

    /// Set the state poll interval. Zero is raised to one millisecond.
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms.max(1);
        self
    }

    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(yaml: &str) -> ClientResult<Self> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> ClientResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-line read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// State poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Number of polls allowed within `timeout_seconds`.
    ///
    /// Truncates toward zero, so a non-positive timeout yields a
    /// non-positive budget. At the default interval this is
    /// `timeout_seconds * 10`.
    pub fn tick_budget(&self, timeout_seconds: f32) -> i32 {
        let ticks_per_second = 1000.0 / self.poll_interval_ms.max(1) as f32;
        (timeout_seconds * ticks_per_second) as i32
    }
}
