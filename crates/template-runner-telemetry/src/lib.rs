//! Secret-redacting structured logging for the template runner gateway.
//!
//! All log output, whether written with `tracing` macros or through the
//! legacy `log` facade used by older client libraries, flows through one
//! sink:
//!
//! ```text
//! tracing::info!(..) ─────────────────────┐
//!                                         ▼
//! log::warn!(..) ──▶ LogTracer ──▶ tracing event ──▶ RedactingLayer
//!                                                      │ LogRecord
//!                                                      │ render
//!                                                      │ Redactor
//!                                                      ▼
//!                                        non-blocking writer ──▶ stderr
//! ```
//!
//! The layer renders each event into a [`LogRecord`], scrubs the rendered
//! line with the [`Redactor`], and hands it to a `tracing-appender`
//! non-blocking writer so request threads never wait on the terminal.
//!
//! # Example
//!
//! ```no_run
//! use template_runner_telemetry::{init, LoggingConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let _guard = init(&LoggingConfig::from_env()?)?;
//! tracing::info!(password = "hunter2", "logged without the password");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod layer;
pub mod record;
pub mod redact;

pub use config::LoggingConfig;
pub use error::{Result, TelemetryError};
pub use layer::RedactingLayer;
pub use record::{ContextFields, LogRecord};
pub use redact::{redact, Redactor, ScrubRule, REDACTED, SECRET_FIELDS};

pub use tracing_appender::non_blocking::WorkerGuard;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber and the `log` bridge.
///
/// Buffered lines are flushed when the returned guard is dropped, so hold it
/// for the lifetime of the process.
///
/// # Errors
///
/// Returns [`TelemetryError::Init`] if a global subscriber or `log` logger is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let layer = RedactingLayer::new(writer).with_causes(config.include_causes());

    // try_init also installs the LogTracer bridge for `log` records
    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    Ok(guard)
}
