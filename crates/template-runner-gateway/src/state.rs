//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use template_runner_auth::JwtValidator;
use template_runner_engine::TemplateRunner;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// Built once at startup and read by every request; nothing in it is mutated
/// afterwards.
///
/// Generic over the engine client and the validator so the router is
/// monomorphized over the concrete pair: production wires in
/// `HttpTemplateRunner` and `HmacValidator`, while the API tests drive the
/// same handlers with `MockTemplateRunner`.
pub struct GatewayState<R, V>
where
    R: TemplateRunner,
    V: JwtValidator,
{
    /// The orchestration engine client.
    pub runner: Arc<R>,
    /// The JWT validator for authentication.
    pub jwt_validator: Arc<V>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<R, V> GatewayState<R, V>
where
    R: TemplateRunner,
    V: JwtValidator,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(runner: Arc<R>, jwt_validator: Arc<V>, config: GatewayConfig) -> Self {
        Self {
            runner,
            jwt_validator,
            config,
        }
    }
}

impl<R, V> Clone for GatewayState<R, V>
where
    R: TemplateRunner,
    V: JwtValidator,
{
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            jwt_validator: Arc::clone(&self.jwt_validator),
            config: self.config.clone(),
        }
    }
}
