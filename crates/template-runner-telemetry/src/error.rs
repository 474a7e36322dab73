//! Telemetry error types.

use thiserror::Error;

/// A result type using `TelemetryError`.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors that can occur while setting up logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured log level is not recognised.
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    /// A global subscriber or `log` bridge is already installed.
    #[error("failed to install log subscriber: {0}")]
    Init(String),
}
