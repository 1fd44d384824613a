//! Error types for VastuGrid.

use crate::config::ConfigError;

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// VastuGrid error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid mapper configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The fusion worker has exited and no longer accepts messages.
    #[error("Fusion worker stopped")]
    WorkerStopped,

    /// The fusion worker panicked (a geometry invariant was violated).
    #[error("Fusion worker panicked")]
    WorkerPanicked,

    /// A reply did not arrive in time.
    #[error("Timed out waiting for fusion worker")]
    Timeout,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML configuration.
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
