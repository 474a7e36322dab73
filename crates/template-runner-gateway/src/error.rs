//! API error types and responses.
//!
//! Every failure leaves the gateway as an `ERROR` envelope; the variant only
//! decides the HTTP status.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use template_runner_auth::AuthError;
use template_runner_engine::EngineError;
use template_runner_telemetry::redact;

use crate::envelope::ResponseEnvelope;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token is valid apart from having expired.
    #[error("{0}")]
    TokenExpired(String),

    /// Missing, malformed or wrongly signed token.
    #[error("Token is unauthorized: {0}")]
    Unauthorized(String),

    /// The request was rejected before reaching the engine.
    #[error("{0}")]
    Validation(String),

    /// The engine reported an error; the text is passed through verbatim.
    #[error("{0}")]
    Downstream(String),

    /// The call to the engine failed in an unexpected way.
    #[error("An unexpected exception occurred calling the template runner: {0}")]
    Unhandled(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::TokenExpired(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::Downstream(_) | Self::Unhandled(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ResponseEnvelope::<()>::Error(redact(&self.to_string()));

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_expired() {
            Self::TokenExpired(err.to_string())
        } else {
            Self::Unauthorized(err.to_string())
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Downstream(msg) => {
                tracing::error!(error = %msg, "Template runner reported an error");
                Self::Downstream(msg)
            }
            EngineError::Transport(_)
            | EngineError::Decode(_)
            | EngineError::InvalidEndpoint(_)
            | EngineError::Internal(_) => {
                tracing::error!(
                    error = &err as &dyn std::error::Error,
                    "Template runner call failed"
                );
                Self::Unhandled(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "Rejected request body");
        Self::Validation(rejection.body_text())
    }
}
