//! Error types for DrishtiIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// DrishtiIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No data arrived within the allotted time
    #[error("Communication timeout")]
    Timeout,

    /// Invalid packet or response
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// Scan frame checksum mismatch
    #[error("Checksum error: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumError {
        /// Checksum carried in the frame header
        expected: u16,
        /// Checksum computed over the received bytes
        actual: u16,
    },

    /// Cycles were requested while the decoder is disabled
    #[error("Lidar is not scanning")]
    NotScanning,

    /// Operation requires the decoder to be disabled
    #[error("Lidar is already scanning")]
    AlreadyScanning,

    /// Reader thread exited and the cycle queue is drained
    #[error("Reader thread stopped")]
    ReaderStopped,

    /// Reader thread panicked
    #[error("Reader thread panicked")]
    ThreadPanic,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
