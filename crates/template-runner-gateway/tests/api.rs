//! End-to-end HTTP scenarios against the router with a recording engine.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use template_runner_auth::{AuthConfig, HmacValidator};
use template_runner_engine::{
    EngineError, MockTemplateRunner, RenderTemplateRequest, RenderTemplateResponse, RunResult,
    TemplateRunner, TemplateRunnerRequest, STATUS_PARTIAL,
};
use template_runner_gateway::{create_router, GatewayConfig, GatewayState, AUTH_HEADER};

const SECRET: &str = "integration-secret";
const AUDIENCE: &str = "template-runner";
const UNHANDLED_PREFIX: &str = "An unexpected exception occurred calling the template runner: ";

fn mint(secret: &str, audience: &str, exp_offset_secs: i64) -> String {
    encode(
        &Header::default(),
        &json!({
            "sub": "svc-network",
            "aud": audience,
            "exp": Utc::now().timestamp() + exp_offset_secs,
        }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn valid_token() -> String {
    mint(SECRET, AUDIENCE, 3600)
}

fn server_with<R: TemplateRunner + 'static>(runner: Arc<R>) -> TestServer {
    let validator = Arc::new(HmacValidator::new(AuthConfig {
        secret: SECRET.to_string(),
        audience: AUDIENCE.to_string(),
    }));
    let state = GatewayState::new(runner, validator, GatewayConfig::default());
    TestServer::new(create_router(state)).unwrap()
}

fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(AUTH_HEADER),
        HeaderValue::from_str(token).unwrap(),
    )
}

async fn post_with_token(server: &TestServer, path: &str, token: &str, body: &Value) -> TestResponse {
    let (name, value) = auth_header(token);
    server.post(path).add_header(name, value).json(body).await
}

fn render_body() -> Value {
    json!({
        "device_list": [{ "hostname": "edge-r1" }],
        "operation": "CONFIGPUSH",
        "section": "ntp",
    })
}

fn lookup_body(jwt: &str) -> Value {
    json!({
        "request_type": "TEMPLATE_LOOKUP",
        "device_list": [{ "hostname": "edge-r1" }],
        "operation": "AUDIT",
        "section": "ntp",
        "jwt": jwt,
    })
}

fn assert_error(response: &TestResponse, status: StatusCode) -> String {
    assert_eq!(response.status_code(), status);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ERROR", "{body}");
    body["payload"].as_str().unwrap().to_string()
}

struct PanickingRunner;

#[async_trait]
impl TemplateRunner for PanickingRunner {
    async fn render_templates(
        &self,
        _request: &RenderTemplateRequest,
    ) -> template_runner_engine::Result<RenderTemplateResponse> {
        panic!("render worker crashed");
    }

    async fn run_templates(
        &self,
        _request: &TemplateRunnerRequest,
    ) -> template_runner_engine::Result<RunResult> {
        panic!("run worker crashed");
    }
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_needs_no_token() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!("OK"));
    assert!(runner.render_requests().is_empty());
}

#[tokio::test]
async fn routes_are_served_under_root_path() {
    let server = server_with(Arc::new(MockTemplateRunner::default()));

    let response = server.get("/naas/template-runner/v1/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = post_with_token(
        &server,
        "/naas/template-runner/v1/render-template",
        &valid_token(),
        &render_body(),
    )
    .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn expired_token_is_forbidden() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    let expired = mint(SECRET, AUDIENCE, -3600);
    let response = post_with_token(&server, "/render-template", &expired, &render_body()).await;

    let message = assert_error(&response, StatusCode::FORBIDDEN);
    assert!(message.contains("expired"), "{message}");
    assert!(runner.render_requests().is_empty());
}

#[tokio::test]
async fn invalid_tokens_are_unauthorized() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    for token in [
        mint("wrong-secret", AUDIENCE, 3600),
        mint(SECRET, "other-audience", 3600),
        "not-a-jwt".to_string(),
    ] {
        let response = post_with_token(&server, "/run-template", &token, &lookup_body("FAKE")).await;
        assert_error(&response, StatusCode::UNAUTHORIZED);
    }
    assert!(runner.run_requests().is_empty());
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let server = server_with(Arc::new(MockTemplateRunner::default()));

    let response = server.post("/render-template").json(&render_body()).await;
    assert_error(&response, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Render
// =============================================================================

#[tokio::test]
async fn render_success_is_wrapped() {
    let runner = Arc::new(MockTemplateRunner::default().with_render_reply(Ok(
        RenderTemplateResponse {
            status: 200,
            render_results: json!([{ "hostname": "edge-r1", "config": "ntp server 10.0.0.1" }]),
        },
    )));
    let server = server_with(Arc::clone(&runner));

    let response = post_with_token(&server, "/render-template", &valid_token(), &render_body()).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "status": "OK",
            "payload": {
                "status": 200,
                "render_results": [{ "hostname": "edge-r1", "config": "ntp server 10.0.0.1" }],
            },
        })
    );
}

#[tokio::test]
async fn device_list_wins_over_search_criteria() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    let mut body = render_body();
    body["search_criteria"] = json!({ "device_type": "router", "location": "lab" });
    post_with_token(&server, "/render-template", &valid_token(), &body).await;

    let forwarded = runner.render_requests();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].device_list[0].hostname, "edge-r1");
    assert!(forwarded[0].search_criteria.is_none());
}

#[tokio::test]
async fn request_without_targets_never_reaches_engine() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    let body = json!({ "device_list": [], "operation": "AUDIT", "section": "ntp" });
    let response = post_with_token(&server, "/render-template", &valid_token(), &body).await;

    let message = assert_error(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(message.contains("device_list"), "{message}");
    assert!(runner.render_requests().is_empty());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    // missing the required section
    let body = json!({ "device_list": [{ "hostname": "edge-r1" }], "operation": "AUDIT" });
    let response = post_with_token(&server, "/render-template", &valid_token(), &body).await;
    assert_error(&response, StatusCode::INTERNAL_SERVER_ERROR);

    let (name, value) = auth_header(&valid_token());
    let response = server
        .post("/render-template")
        .add_header(name, value)
        .text("{not json")
        .await;
    assert_error(&response, StatusCode::INTERNAL_SERVER_ERROR);

    assert!(runner.render_requests().is_empty());
}

#[tokio::test]
async fn oversized_body_never_reaches_engine() {
    let runner = Arc::new(MockTemplateRunner::default());
    let validator = Arc::new(HmacValidator::new(AuthConfig {
        secret: SECRET.to_string(),
        audience: AUDIENCE.to_string(),
    }));
    let config = GatewayConfig {
        max_body_bytes: 16,
        ..GatewayConfig::default()
    };
    let server =
        TestServer::new(create_router(GatewayState::new(Arc::clone(&runner), validator, config)))
            .unwrap();

    let response = post_with_token(&server, "/render-template", &valid_token(), &render_body()).await;
    assert_ne!(response.status_code(), StatusCode::OK);
    assert!(runner.render_requests().is_empty());
}

#[tokio::test]
async fn partial_render_is_reported() {
    let results = json!([{ "hostname": "edge-r1", "error": "template not found" }]);
    let runner = Arc::new(MockTemplateRunner::default().with_render_reply(Ok(
        RenderTemplateResponse {
            status: STATUS_PARTIAL,
            render_results: results.clone(),
        },
    )));
    let server = server_with(runner);

    let response = post_with_token(&server, "/render-template", &valid_token(), &render_body()).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "PARTIAL");
    assert_eq!(body["payload"]["render_results"], results);
}

#[tokio::test]
async fn transport_failure_is_unhandled_fault() {
    let runner = Arc::new(MockTemplateRunner::default().with_render_reply(Err(
        EngineError::Transport("connection refused".into()),
    )));
    let server = server_with(runner);

    let response = post_with_token(&server, "/render-template", &valid_token(), &render_body()).await;

    let message = assert_error(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(message.starts_with(UNHANDLED_PREFIX), "{message}");
    assert!(message.contains("connection refused"), "{message}");
}

#[tokio::test]
async fn handler_panic_is_unhandled_fault() {
    let server = server_with(Arc::new(PanickingRunner));

    let response = post_with_token(&server, "/render-template", &valid_token(), &render_body()).await;

    let message = assert_error(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message, format!("{UNHANDLED_PREFIX}render worker crashed"));
}

// =============================================================================
// Run
// =============================================================================

#[tokio::test]
async fn lookup_run_forwards_session_token() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));
    let token = valid_token();

    let response = post_with_token(&server, "/run-template", &token, &lookup_body("FAKE")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let forwarded = runner.run_requests();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(forwarded[0].jwt.as_deref(), Some(token.as_str()));
}

#[tokio::test]
async fn run_response_echoes_run_id() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    let mut body = lookup_body("FAKE");
    body["run_id"] = json!("67e55044-10b1-426f-9247-bb680e5fe0c8");
    let response = post_with_token(&server, "/run-template", &valid_token(), &body).await;

    let body = response.json::<Value>();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["payload"]["run_id"], "67e55044-10b1-426f-9247-bb680e5fe0c8");
    assert_eq!(body["payload"]["status"], 200);
}

#[tokio::test]
async fn passthru_without_username_uses_session_token() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));
    let token = valid_token();

    let body = json!({
        "request_type": "SSH_PASSTHRU",
        "device_list": [{ "hostname": "edge-r1" }],
        "device_commands": ["show version"],
    });
    post_with_token(&server, "/run-template", &token, &body).await;

    let forwarded = runner.run_requests();
    assert_eq!(forwarded[0].jwt.as_deref(), Some(token.as_str()));
    assert!(forwarded[0].device_username.is_none());
}

#[tokio::test]
async fn passthru_with_username_keeps_credentials() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    let body = json!({
        "request_type": "SSH_PASSTHRU",
        "device_list": [{ "hostname": "edge-r1" }],
        "device_commands": ["show version"],
        "device_username": "netops",
        "device_password": "pw",
    });
    post_with_token(&server, "/run-template", &valid_token(), &body).await;

    let forwarded = runner.run_requests();
    assert!(forwarded[0].jwt.is_none());
    assert_eq!(forwarded[0].device_username.as_deref(), Some("netops"));
    assert_eq!(forwarded[0].device_password.as_deref(), Some("pw"));
}

#[tokio::test]
async fn downstream_error_is_passed_through() {
    let runner = Arc::new(
        MockTemplateRunner::default()
            .with_run_reply(Err(EngineError::Downstream("db unreachable".into()))),
    );
    let server = server_with(runner);

    let response = post_with_token(&server, "/run-template", &valid_token(), &lookup_body("FAKE")).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "status": "ERROR", "payload": "db unreachable" })
    );
}

#[tokio::test]
async fn search_criteria_run_is_forwarded() {
    let runner = Arc::new(MockTemplateRunner::default());
    let server = server_with(Arc::clone(&runner));

    let body = json!({
        "request_type": "TEMPLATE_LOOKUP",
        "search_criteria": { "device_type": "router" },
        "operation": "AUDIT",
        "section": "ntp",
    });
    let response = post_with_token(&server, "/run-template", &valid_token(), &body).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let forwarded = runner.run_requests();
    assert!(forwarded[0].device_list.is_empty());
    assert_eq!(
        forwarded[0]
            .search_criteria
            .as_ref()
            .and_then(|c| c.device_type.as_deref()),
        Some("router")
    );
}
