//! The response envelope every gateway operation answers with.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// `{"status": "OK" | "PARTIAL" | "ERROR", "payload": ...}`.
///
/// An `ERROR` payload is always a human-readable message, never a partially
/// filled result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseEnvelope<T> {
    /// The operation succeeded.
    Ok(T),
    /// The engine ran but some devices or steps failed.
    Partial(T),
    /// The operation failed.
    Error(String),
}

impl<T> ResponseEnvelope<T> {
    /// The HTTP status this envelope is sent with, absent an auth failure.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Ok(_) => StatusCode::OK,
            Self::Partial(_) | Self::Error(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for the `ERROR` variant.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl<T: Serialize> IntoResponse for ResponseEnvelope<T> {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_status_and_payload() {
        let ok = ResponseEnvelope::Ok(json!({ "status": 200 }));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "status": "OK", "payload": { "status": 200 } })
        );

        let partial = ResponseEnvelope::Partial(json!([1, 2]));
        assert_eq!(
            serde_json::to_value(&partial).unwrap(),
            json!({ "status": "PARTIAL", "payload": [1, 2] })
        );

        let error = ResponseEnvelope::<()>::Error("db unreachable".into());
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({ "status": "ERROR", "payload": "db unreachable" })
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(ResponseEnvelope::Ok(()).status_code(), StatusCode::OK);
        assert_eq!(
            ResponseEnvelope::Partial(()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ResponseEnvelope::<()>::Error(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_payload_must_be_a_string() {
        let parsed: Result<ResponseEnvelope<serde_json::Value>, _> =
            serde_json::from_value(json!({ "status": "ERROR", "payload": { "partial": true } }));
        assert!(parsed.is_err());
    }

    #[test]
    fn into_response_uses_status_code() {
        let response = ResponseEnvelope::Partial(json!({})).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!ResponseEnvelope::Ok(()).is_error());
    }
}
