//! JWT validation and claims extraction.
//!
//! This module provides the HS256 validator used by the gateway's auth
//! extractor.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::{AuthError, Result};
use crate::AuthConfig;

/// Validated claims extracted from a JWT.
#[derive(Debug, Clone)]
pub struct ValidatedClaims {
    /// The `sub` claim, if the issuer set one.
    pub subject: Option<String>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Trait for validating JWTs.
///
/// Implementations hold no per-call state, so one instance is shared by every
/// in-flight request.
pub trait JwtValidator: Send + Sync {
    /// Validate a JWT and extract claims.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenExpired`] for expired tokens and another
    /// [`AuthError`] variant for every other failure.
    fn validate(&self, token: &str) -> Result<ValidatedClaims>;
}

/// Raw claims from a JWT before validation.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    /// Audience (can be string or array)
    #[serde(default)]
    aud: Audience,
    /// Expiration timestamp (validated by jsonwebtoken)
    exp: u64,
}

/// Audience claim that can be either a string or array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
enum Audience {
    Single(String),
    Multiple(Vec<String>),
    #[default]
    None,
}

impl Audience {
    fn contains(&self, value: &str) -> bool {
        match self {
            Self::Single(s) => s == value,
            Self::Multiple(v) => v.iter().any(|s| s == value),
            Self::None => false,
        }
    }
}

/// Shared-secret (HS256) JWT validator.
pub struct HmacValidator {
    config: AuthConfig,
    key: Option<DecodingKey>,
}

impl HmacValidator {
    /// Create a validator from the startup auth configuration.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let key = config
            .has_secret()
            .then(|| DecodingKey::from_secret(config.secret.as_bytes()));
        Self { config, key }
    }

    /// The audience this validator expects.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.config.audience
    }

    fn verify(&self, token: &str) -> Result<ValidatedClaims> {
        let key = self.key.as_ref().ok_or(AuthError::MissingSecret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Audience is checked below since it can be string or array
        validation.validate_aud = false;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let token_data = decode::<RawClaims>(token, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired(e.to_string()),
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::InvalidToken(e.to_string()),
        })?;

        let claims = token_data.claims;

        if !claims.aud.contains(&self.config.audience) {
            return Err(AuthError::InvalidAudience);
        }

        let exp_secs = i64::try_from(claims.exp).unwrap_or(i64::MAX);
        let expires_at = DateTime::from_timestamp(exp_secs, 0)
            .ok_or_else(|| AuthError::InvalidToken("invalid exp timestamp".to_string()))?;

        Ok(ValidatedClaims {
            subject: claims.sub,
            expires_at,
        })
    }
}

impl JwtValidator for HmacValidator {
    fn validate(&self, token: &str) -> Result<ValidatedClaims> {
        tracing::info!("START: validating the JWT");

        match self.verify(token) {
            Ok(claims) => {
                tracing::info!("END: validating the JWT");
                Ok(claims)
            }
            Err(err) => {
                if err.is_expired() {
                    tracing::error!(error = %err, "JWT has expired");
                } else {
                    tracing::error!(error = %err, "Token is unauthorized");
                }
                Err(err)
            }
        }
    }
}
