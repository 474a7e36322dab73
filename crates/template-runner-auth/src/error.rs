//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while validating a caller's token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token is well formed but past its expiry.
    #[error("JWT has expired: {0}")]
    TokenExpired(String),

    /// No token was supplied with the request.
    #[error("missing x-auth-token header")]
    MissingToken,

    /// No signing secret is configured, so no token can be verified.
    #[error("no signing secret configured")]
    MissingSecret,

    /// The token signature does not match the configured secret.
    #[error("invalid signature")]
    InvalidSignature,

    /// The audience claim does not contain the expected audience.
    #[error("invalid audience")]
    InvalidAudience,

    /// The token could not be decoded.
    #[error("invalid token format: {0}")]
    InvalidToken(String),
}

impl AuthError {
    /// Returns `true` if the token failed only because it has expired.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::TokenExpired(_))
    }

    /// Returns the caller-visible HTTP status code for this error.
    ///
    /// Expired tokens are reported as 403; every other failure is 401.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::TokenExpired(_) => 403,
            Self::MissingToken
            | Self::MissingSecret
            | Self::InvalidSignature
            | Self::InvalidAudience
            | Self::InvalidToken(_) => 401,
        }
    }
}
