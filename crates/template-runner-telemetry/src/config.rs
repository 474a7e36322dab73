//! Logging configuration.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, TelemetryError};

/// Logging configuration, read once before the subscriber is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Most verbose level written to the sink.
    pub level: LevelFilter,
}

impl LoggingConfig {
    /// Environment variable holding the log level.
    pub const LEVEL_VAR: &'static str = "LOG_LEVEL";

    /// Read the level from `LOG_LEVEL`, defaulting to `INFO`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidLevel`] for an unrecognised level.
    pub fn from_env() -> Result<Self> {
        Self::from_value(std::env::var(Self::LEVEL_VAR).ok().as_deref())
    }

    /// Parse a level name.
    ///
    /// Accepts `TRACE`, `DEBUG`, `INFO`, `WARN` and `ERROR` in any case, plus
    /// the names older deployments use: `SUCCESS` (INFO), `WARNING` (WARN) and
    /// `CRITICAL` (ERROR). A missing or blank value means `INFO`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidLevel`] for an unrecognised level.
    pub fn from_value(raw: Option<&str>) -> Result<Self> {
        let raw = raw.map(str::trim).unwrap_or_default();
        let level = match raw.to_ascii_uppercase().as_str() {
            "" | "INFO" | "SUCCESS" => LevelFilter::INFO,
            "TRACE" => LevelFilter::TRACE,
            "DEBUG" => LevelFilter::DEBUG,
            "WARN" | "WARNING" => LevelFilter::WARN,
            "ERROR" | "CRITICAL" => LevelFilter::ERROR,
            "OFF" => LevelFilter::OFF,
            _ => return Err(TelemetryError::InvalidLevel(raw.to_string())),
        };
        Ok(Self { level })
    }

    /// Whether error cause chains are written; only at DEBUG or finer.
    #[must_use]
    pub fn include_causes(&self) -> bool {
        self.level >= LevelFilter::DEBUG
    }

    /// The subscriber filter for this level.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::default().add_directive(self.level.into())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
        }
    }
}
