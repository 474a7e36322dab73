//! HTTP client for communicating with the orchestration engine.
//!
//! This module provides the `TemplateRunner` trait the gateway delegates to,
//! and `HttpTemplateRunner`, which calls the engine's REST API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::error::{EngineError, Result};
use crate::types::{
    DownstreamOutcome, RenderTemplateRequest, RenderTemplateResponse, RunResult,
    TemplateRunnerRequest,
};

/// Trait for orchestration engine communication.
///
/// Implementations must be safe to share across concurrent requests; the
/// gateway adds no locking of its own.
#[async_trait]
pub trait TemplateRunner: Send + Sync {
    /// Render every matching template for the requested devices.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Downstream`] if the engine reports an error, or
    /// another variant if the call itself fails.
    async fn render_templates(
        &self,
        request: &RenderTemplateRequest,
    ) -> Result<RenderTemplateResponse>;

    /// Run templates or raw commands against the requested devices.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Downstream`] if the engine reports an error, or
    /// another variant if the call itself fails.
    async fn run_templates(&self, request: &TemplateRunnerRequest) -> Result<RunResult>;
}

/// Request body sent to the engine.
#[derive(Debug, Serialize)]
struct EngineRequest<'a, T> {
    config: &'a ServiceConfig,
    request: &'a T,
}

/// HTTP client for the orchestration engine.
#[derive(Debug, Clone)]
pub struct HttpTemplateRunner {
    client: reqwest::Client,
    base_url: String,
    config: Arc<ServiceConfig>,
}

impl HttpTemplateRunner {
    /// Create a new engine client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the engine (e.g., "http://template-runner:8080")
    /// * `config` - The service configuration snapshot sent with every call
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>, config: Arc<ServiceConfig>) -> Result<Self> {
        // Runs can take minutes across large device lists, so only connecting is bounded.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| EngineError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, base_url, config))
    }

    /// Create a new engine client with a custom reqwest client.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        config: Arc<ServiceConfig>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        }
    }

    /// Get the base URL of the engine.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configuration snapshot sent with every call.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    async fn call<Req, Res>(&self, path: &str, request: &Req) -> Result<Res>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let body = EngineRequest {
            config: &self.config,
            request,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Transport(format!("template runner request failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::Transport(format!("failed to read response: {e}")))?;

        match serde_json::from_slice::<DownstreamOutcome<Res>>(&bytes) {
            Ok(outcome) if status.is_success() || outcome.error.is_some() => {
                tracing::debug!(url = %url, status = %status, "Template runner call completed");
                outcome.into_result()
            }
            Ok(_) => Err(EngineError::Transport(format!(
                "template runner returned status {status}"
            ))),
            Err(e) if status.is_success() => Err(EngineError::Decode(e.to_string())),
            Err(_) => {
                tracing::error!(url = %url, status = %status, "Template runner call failed");
                Err(EngineError::Transport(format!(
                    "template runner returned status {status}"
                )))
            }
        }
    }
}

#[async_trait]
impl TemplateRunner for HttpTemplateRunner {
    async fn render_templates(
        &self,
        request: &RenderTemplateRequest,
    ) -> Result<RenderTemplateResponse> {
        self.call("/v2/render-templates", request).await
    }

    async fn run_templates(&self, request: &TemplateRunnerRequest) -> Result<RunResult> {
        self.call("/v2/run-templates", request).await
    }
}

/// A mock engine for testing.
///
/// Records every request it receives and answers with a configured reply.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockTemplateRunner {
    render_reply: Result<RenderTemplateResponse>,
    run_reply: Result<RunResult>,
    render_requests: parking_lot::Mutex<Vec<RenderTemplateRequest>>,
    run_requests: parking_lot::Mutex<Vec<TemplateRunnerRequest>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockTemplateRunner {
    fn default() -> Self {
        Self {
            render_reply: Ok(RenderTemplateResponse {
                status: crate::types::STATUS_SUCCESS,
                render_results: serde_json::Value::Array(Vec::new()),
            }),
            run_reply: Ok(RunResult {
                status: crate::types::STATUS_SUCCESS,
                run_id: uuid::Uuid::nil(),
                result: serde_json::Value::Object(serde_json::Map::new()),
                operation: None,
                section: None,
                extra: serde_json::Map::new(),
            }),
            render_requests: parking_lot::Mutex::new(Vec::new()),
            run_requests: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTemplateRunner {
    /// Answer render calls with `reply`.
    #[must_use]
    pub fn with_render_reply(mut self, reply: Result<RenderTemplateResponse>) -> Self {
        self.render_reply = reply;
        self
    }

    /// Answer run calls with `reply`. A successful reply echoes the request's run id.
    #[must_use]
    pub fn with_run_reply(mut self, reply: Result<RunResult>) -> Self {
        self.run_reply = reply;
        self
    }

    /// Render requests received so far.
    #[must_use]
    pub fn render_requests(&self) -> Vec<RenderTemplateRequest> {
        self.render_requests.lock().clone()
    }

    /// Run requests received so far.
    #[must_use]
    pub fn run_requests(&self) -> Vec<TemplateRunnerRequest> {
        self.run_requests.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl TemplateRunner for MockTemplateRunner {
    async fn render_templates(
        &self,
        request: &RenderTemplateRequest,
    ) -> Result<RenderTemplateResponse> {
        self.render_requests.lock().push(request.clone());
        self.render_reply.clone()
    }

    async fn run_templates(&self, request: &TemplateRunnerRequest) -> Result<RunResult> {
        self.run_requests.lock().push(request.clone());
        self.run_reply.clone().map(|mut result| {
            result.run_id = request.run_id;
            result
        })
    }
}
