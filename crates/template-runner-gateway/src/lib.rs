//! Authenticated HTTP gateway for the template runner.
//!
//! This crate is the public front door of the device-automation service. It:
//!
//! - validates the caller's `x-auth-token` on every protected route
//! - forwards render and run requests to the orchestration engine
//! - substitutes the caller's token into run requests where required
//! - maps every outcome onto a `{status, payload}` envelope
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Clients                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ HTTP
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  template-runner-gateway                    │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │ AuthSession │ │   Router    │ │  ResponseEnvelope   │    │
//! │  │  extractor  │ │ + handlers  │ │  + ApiError         │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//!        ┌──────────────┐               ┌──────────────────┐
//!        │ HmacValidator│               │ TemplateRunner   │
//!        │ (HS256 JWT)  │               │ (engine client)  │
//!        └──────────────┘               └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use template_runner_auth::{AuthConfig, HmacValidator};
//! use template_runner_engine::{DeviceTransportEndpoint, HttpTemplateRunner, ServiceConfig};
//! use template_runner_gateway::{create_router, GatewayConfig, GatewayState};
//!
//! # async fn example(service: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let runner = Arc::new(HttpTemplateRunner::new("http://engine:8080", Arc::new(service))?);
//! let validator = Arc::new(HmacValidator::new(AuthConfig {
//!     secret: "shared-secret".to_string(),
//!     audience: "template-runner".to_string(),
//! }));
//!
//! let state = GatewayState::new(runner, validator, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod forwarding;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::{AuthSession, AUTH_HEADER};
pub use config::{AppConfig, ConfigError, GatewayConfig};
pub use envelope::ResponseEnvelope;
pub use error::ApiError;
pub use handlers::templates::TemplateRunnerResponse;
pub use routes::create_router;
pub use state::GatewayState;
