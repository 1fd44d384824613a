//! Configuration for the G2 driver
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! port = "/dev/ttyS1"
//! queue_capacity = 8
//! backpressure = "drop_oldest"
//! checksum = "reject"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// What the reader thread does when the cycle queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Wait for the consumer, re-checking the stop signal between attempts
    #[default]
    Block,
    /// Evict the oldest queued cycle to make room for the newest
    DropOldest,
}

/// What the decoder does with a frame whose checksum does not match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumPolicy {
    /// Count the mismatch and keep the frame
    #[default]
    Ignore,
    /// Count the mismatch and drop the frame
    Reject,
}

/// G2 lidar driver configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LidarConfig {
    /// Serial port path
    pub port: String,
    /// UART baud rate (G2: 230400)
    pub baud_rate: u32,
    /// Transport read timeout; also bounds how quickly `disable` returns
    pub poll_timeout_ms: u64,
    /// Deadline for command responses (device info, health, frequency)
    pub response_timeout_ms: u64,
    /// Bounded cycle queue depth
    pub queue_capacity: usize,
    /// Full-queue behavior of the reader thread
    pub backpressure: BackpressurePolicy,
    /// Checksum handling in the frame decoder
    pub checksum: ChecksumPolicy,
}

impl Default for LidarConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 230_400,
            poll_timeout_ms: 100,
            response_timeout_ms: 2000,
            queue_capacity: 5,
            backpressure: BackpressurePolicy::Block,
            checksum: ChecksumPolicy::Ignore,
        }
    }
}

impl LidarConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: LidarConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the driver cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::Config("baud_rate must be positive".to_string()));
        }
        if self.poll_timeout_ms == 0 {
            return Err(Error::Config(
                "poll_timeout_ms must be positive".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Transport read timeout
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Command response deadline
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LidarConfig::default();
        assert_eq!(config.baud_rate, 230_400);
        assert_eq!(config.queue_capacity, 5);
        assert_eq!(config.backpressure, BackpressurePolicy::Block);
        assert_eq!(config.checksum, ChecksumPolicy::Ignore);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = LidarConfig::from_toml_str(
            r#"
port = "/dev/ttyS1"
backpressure = "drop_oldest"
checksum = "reject"
"#,
        )
        .unwrap();

        assert_eq!(config.port, "/dev/ttyS1");
        assert_eq!(config.backpressure, BackpressurePolicy::DropOldest);
        assert_eq!(config.checksum, ChecksumPolicy::Reject);
        assert_eq!(config.baud_rate, 230_400);
        assert_eq!(config.poll_timeout(), Duration::from_millis(100));
    }

    #[test]
    fn test_toml_serialization() {
        let config = LidarConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("baud_rate = 230400"));
        assert!(toml_string.contains("backpressure = \"block\""));

        let parsed = LidarConfig::from_toml_str(&toml_string).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_zero_queue_rejected() {
        let result = LidarConfig::from_toml_str("queue_capacity = 0");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = LidarConfig::from_toml_str("backpressure = \"spin\"");
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }
}
