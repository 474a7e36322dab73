//! Liveness check.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Health check handler.
///
/// Public, and never touches the validator or the engine.
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// "OK"
/// ```
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json("OK"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_returns_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
