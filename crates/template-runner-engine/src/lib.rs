//! Orchestration engine client for the template runner gateway.
//!
//! The engine performs the real work (template lookup, rendering, parallel
//! per-device SSH execution, match evaluation). This crate holds the contract
//! the gateway speaks to it:
//!
//! - **Domain types**: render and run requests and results
//! - **Outcomes**: the engine's `(error, result)` pair, resolved into a `Result`
//! - **Client**: the [`TemplateRunner`] trait and its HTTP implementation
//! - **Configuration**: the snapshot sent to the engine with every call
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐
//! │   Gateway        │────▶│   TemplateRunner     │
//! │   (HTTP)         │     │   (trait)            │
//! └──────────────────┘     └──────────┬───────────┘
//!                                     │
//!                          ┌──────────▼───────────┐
//!                          │ HttpTemplateRunner   │
//!                          └──────────┬───────────┘
//!                                     │ HTTP
//!                          ┌──────────▼───────────┐     ┌──────────────────┐
//!                          │  Orchestration       │────▶│ Device transport │
//!                          │  engine              │     │ (SSH sessions)   │
//!                          └──────────────────────┘     └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{HttpTemplateRunner, TemplateRunner};
pub use config::ServiceConfig;
pub use error::{EngineError, Result};
pub use transport::DeviceTransportEndpoint;
pub use types::{
    DeviceSearch, DownstreamOutcome, ForwardedCredential, Operation, RenderTemplateRequest,
    RenderTemplateResponse, RequestType, RunResult, SearchCriteria, TemplateRunnerRequest,
    STATUS_PARTIAL, STATUS_SUCCESS,
};

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockTemplateRunner;
