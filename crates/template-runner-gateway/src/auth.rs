//! Authentication extractor.
//!
//! This module provides the `AuthSession` extractor that validates the
//! caller's `x-auth-token` before a protected handler runs.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use template_runner_auth::{AuthError, JwtValidator, ValidatedClaims};
use template_runner_engine::TemplateRunner;

use crate::error::ApiError;
use crate::state::GatewayState;

/// Header carrying the caller's token.
pub const AUTH_HEADER: &str = "x-auth-token";

/// A validated caller token.
///
/// The raw token is kept because run requests may forward it to the engine.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The token exactly as received.
    pub token: String,
    /// Claims extracted during validation.
    pub claims: ValidatedClaims,
}

#[async_trait]
impl<R, V> FromRequestParts<Arc<GatewayState<R, V>>> for AuthSession
where
    R: TemplateRunner + 'static,
    V: JwtValidator + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<R, V>>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                tracing::error!("Request has no x-auth-token header");
                AuthError::MissingToken
            })?;

        let claims = state.jwt_validator.validate(token)?;

        Ok(Self {
            token: token.to_string(),
            claims,
        })
    }
}
