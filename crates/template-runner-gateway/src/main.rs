//! Template Runner Gateway
//!
//! Entry point for the gateway service. Configuration comes from the process
//! environment; set `RUNLOCAL=1` to layer `local-config.json` over it and
//! listen on port 8000 instead of 8080.

use std::sync::Arc;

use template_runner_auth::HmacValidator;
use template_runner_engine::HttpTemplateRunner;
use template_runner_gateway::{create_router, AppConfig, GatewayState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Buffered log lines are flushed when this guard drops
    let _guard = template_runner_telemetry::init(&config.logging)?;

    tracing::info!("Starting the server");
    tracing::debug!(config = ?config.service, "Service configuration loaded");

    tracing::info!(
        endpoint = %config.service.device_transport,
        "Device transport endpoint registered"
    );

    if !config.auth.has_secret() {
        tracing::warn!("No JWT_SECRET set - every protected request will be rejected");
    }

    let runner = Arc::new(HttpTemplateRunner::new(
        config.template_runner_url.clone(),
        Arc::new(config.service.clone()),
    )?);
    tracing::info!(url = %runner.base_url(), "Template runner client initialized");

    let jwt_validator = Arc::new(HmacValidator::new(config.auth.clone()));
    tracing::info!(audience = %jwt_validator.audience(), "JWT validator initialized");

    let listen_addr = config.gateway.listen_addr.clone();
    let state = GatewayState::new(runner, jwt_validator, config.gateway);
    let app = create_router(state);

    tracing::info!(listen_addr = %listen_addr, run_local = config.run_local, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
