//! Error types for orchestration engine calls.

use thiserror::Error;

/// A result type using `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur when delegating to the orchestration engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine ran and reported a structured error outcome.
    ///
    /// The message is the engine's own text, unchanged.
    #[error("{0}")]
    Downstream(String),

    /// The engine could not be reached or answered with an unexpected status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The engine answered but the body could not be decoded.
    #[error("failed to decode engine response: {0}")]
    Decode(String),

    /// A configured endpoint could not be parsed.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Returns `true` if the engine itself produced this error as a domain
    /// outcome rather than the call failing around it.
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Downstream(_))
    }
}
