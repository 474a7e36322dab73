//! Signed-token validation for the template runner gateway.
//!
//! Every protected gateway route runs the caller's `x-auth-token` through a
//! [`JwtValidator`] before any work is delegated to the orchestration engine.
//! The production implementation, [`HmacValidator`], verifies:
//!
//! - the HS256 signature against a process-wide shared secret
//! - the `aud` claim against the expected audience
//! - the `exp` claim, with no leeway
//!
//! # Example
//!
//! ```no_run
//! use template_runner_auth::{AuthConfig, HmacValidator, JwtValidator};
//!
//! let config = AuthConfig {
//!     secret: "shared-secret".to_string(),
//!     audience: "template-runner".to_string(),
//! };
//! let validator = HmacValidator::new(config);
//!
//! match validator.validate("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...") {
//!     Ok(claims) => println!("subject: {:?}", claims.subject),
//!     Err(err) => println!("rejected with {}", err.http_status_code()),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod jwt;

pub use error::{AuthError, Result};
pub use jwt::{HmacValidator, JwtValidator, ValidatedClaims};

/// Configuration for token validation.
///
/// Both values are resolved once at startup and never re-read.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Shared HS256 signing secret. An empty secret rejects every token.
    pub secret: String,
    /// Expected JWT audience (`aud` claim).
    pub audience: String,
}

impl AuthConfig {
    /// Returns `true` if a signing secret has been configured.
    #[must_use]
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }
}
