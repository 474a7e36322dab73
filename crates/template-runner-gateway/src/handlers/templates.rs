//! Render and run endpoints.
//!
//! Both operations authenticate the caller, normalize the request, hand it to
//! the orchestration engine, and map the outcome onto the response envelope:
//!
//! | Engine outcome            | Envelope  | HTTP |
//! |---------------------------|-----------|------|
//! | result, status 200        | `OK`      | 200  |
//! | result, status 400        | `PARTIAL` | 500  |
//! | `(error, _)`              | `ERROR`   | 500  |
//! | call failed               | `ERROR`   | 500  |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use template_runner_auth::JwtValidator;
use template_runner_engine::{
    Operation, RenderTemplateRequest, RenderTemplateResponse, RunResult, TemplateRunner,
    TemplateRunnerRequest,
};

use crate::auth::AuthSession;
use crate::envelope::ResponseEnvelope;
use crate::error::ApiError;
use crate::forwarding::{apply_session_credential, resolve_targets};
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Response for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRunnerResponse {
    /// 200 on success, 400 on partial success.
    pub status: u16,
    /// The run id results were grouped under.
    pub run_id: Uuid,
    /// Per-device step statuses.
    pub result: Value,
    /// The request's operation.
    pub operation: Option<Operation>,
    /// The request's section.
    pub section: Option<String>,
}

impl From<RunResult> for TemplateRunnerResponse {
    fn from(result: RunResult) -> Self {
        Self {
            status: result.status,
            run_id: result.run_id,
            result: result.result,
            operation: result.operation,
            section: result.section,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Render every matching template for the requested devices.
///
/// # Errors
///
/// Returns an error if the token is rejected, the request names no targets,
/// or the engine call fails.
pub async fn render_template<R, V>(
    State(state): State<Arc<GatewayState<R, V>>>,
    session: AuthSession,
    body: Result<Json<RenderTemplateRequest>, JsonRejection>,
) -> Result<ResponseEnvelope<RenderTemplateResponse>, ApiError>
where
    R: TemplateRunner + 'static,
    V: JwtValidator + 'static,
{
    tracing::info!("START: render template request");
    let Json(mut request) = body?;
    tracing::debug!(subject = ?session.claims.subject, request = ?request, "Render request received");

    resolve_targets(&request.device_list, &mut request.search_criteria)?;

    let response = state.runner.render_templates(&request).await?;

    tracing::info!(status = response.status, "END: render template request");
    Ok(if response.is_partial() {
        ResponseEnvelope::Partial(response)
    } else {
        ResponseEnvelope::Ok(response)
    })
}

/// Run templates or raw commands against the requested devices.
///
/// # Errors
///
/// Returns an error if the token is rejected, the request names no targets,
/// or the engine call fails.
pub async fn run_template<R, V>(
    State(state): State<Arc<GatewayState<R, V>>>,
    session: AuthSession,
    body: Result<Json<TemplateRunnerRequest>, JsonRejection>,
) -> Result<ResponseEnvelope<TemplateRunnerResponse>, ApiError>
where
    R: TemplateRunner + 'static,
    V: JwtValidator + 'static,
{
    let Json(request) = body?;
    let span = tracing::info_span!(
        "run_template",
        run_id = %request.run_id,
        request_type = ?request.request_type,
    );

    execute_run(state.runner.as_ref(), &session, request)
        .instrument(span)
        .await
}

async fn execute_run<R>(
    runner: &R,
    session: &AuthSession,
    mut request: TemplateRunnerRequest,
) -> Result<ResponseEnvelope<TemplateRunnerResponse>, ApiError>
where
    R: TemplateRunner,
{
    tracing::info!("START: run template request");
    resolve_targets(&request.device_list, &mut request.search_criteria)?;
    apply_session_credential(&mut request, &session.token);
    tracing::debug!(subject = ?session.claims.subject, request = ?request, "Run request received");

    let result = runner.run_templates(&request).await?;

    tracing::info!(status = result.status, "END: run template request");
    Ok(if result.is_partial() {
        ResponseEnvelope::Partial(result.into())
    } else {
        ResponseEnvelope::Ok(result.into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_response_drops_engine_internals() {
        let result: RunResult = serde_json::from_value(json!({
            "status": 200,
            "run_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "result": { "edge-r1": { "run": 200 } },
            "operation": "AUDIT",
            "section": "ntp",
            "device_cache": { "edge-r1": "10.0.0.1" },
        }))
        .unwrap();

        let response = serde_json::to_value(TemplateRunnerResponse::from(result)).unwrap();
        assert_eq!(
            response,
            json!({
                "status": 200,
                "run_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "result": { "edge-r1": { "run": 200 } },
                "operation": "AUDIT",
                "section": "ntp",
            })
        );
    }
}
