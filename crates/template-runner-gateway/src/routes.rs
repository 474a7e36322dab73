//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::any::Any;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use template_runner_auth::JwtValidator;
use template_runner_engine::TemplateRunner;

use crate::error::ApiError;
use crate::handlers::{health, templates};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// Every route is served at `/` and again under the configured root path.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Liveness check
///
/// ## Authenticated (`x-auth-token`)
/// - `POST /render-template` - Render templates
/// - `POST /run-template` - Run templates or raw commands
pub fn create_router<R, V>(state: GatewayState<R, V>) -> Router
where
    R: TemplateRunner + 'static,
    V: JwtValidator + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let prefix = state.config.route_prefix();

    let state = Arc::new(state);

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/render-template", post(templates::render_template::<R, V>))
        .route("/run-template", post(templates::run_template::<R, V>));

    let app = match prefix {
        Some(prefix) => api.clone().nest(&prefix, api),
        None => api,
    };

    app.layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin)
    }
}

/// Turn a handler panic into an `ERROR` envelope.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "handler panicked".to_string());

    tracing::error!(panic = %detail, "Request handler panicked");
    ApiError::Unhandled(detail).into_response()
}
