//! Request and response types for orchestration engine operations.
//!
//! These types define the API contracts for template rendering and template
//! or command execution. The gateway forwards them to the engine unchanged
//! apart from target normalization and credential substitution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{EngineError, Result};

/// Result status the engine reports for a fully successful call.
pub const STATUS_SUCCESS: u16 = 200;

/// Result status the engine reports when some devices or steps failed.
pub const STATUS_PARTIAL: u16 = 400;

/// Template search operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Push configuration to devices.
    ConfigPush,
    /// Audit device configuration against templates.
    Audit,
}

/// The kind of run requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    /// Look up, render, run and match every template for each device.
    ///
    /// Device credentials are resolved by the device-transport service from
    /// the forwarded token.
    TemplateLookup,
    /// Run an explicit command list on each device with no template handling.
    SshPassthru,
}

/// A single device to operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSearch {
    /// Device hostname.
    pub hostname: String,
    /// Any further lookup attributes understood by the engine.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DeviceSearch {
    /// Create a device reference by hostname.
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            attributes: Map::new(),
        }
    }
}

/// Criteria the engine expands into a device list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Device type filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    /// Location filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Any further filters understood by the engine.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl SearchCriteria {
    /// Returns `true` if no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.device_type.as_deref().map_or(true, str::is_empty)
            && self.location.as_deref().map_or(true, str::is_empty)
            && self.attributes.is_empty()
    }
}

/// Request to render every matching template for a set of devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTemplateRequest {
    /// Explicit devices. Takes precedence over `search_criteria`.
    #[serde(default)]
    pub device_list: Vec<DeviceSearch>,
    /// Criteria to expand into a device list when `device_list` is empty.
    #[serde(default)]
    pub search_criteria: Option<SearchCriteria>,
    /// Template search operation.
    pub operation: Operation,
    /// Template section filter.
    pub section: String,
    /// Template variable overrides.
    #[serde(default)]
    pub template_overrides: Map<String, Value>,
    /// Only render the rollback template (`CONFIGPUSH` only).
    #[serde(default)]
    pub is_rollback: bool,
}

/// Request to run templates or raw commands against a set of devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRunnerRequest {
    /// Groups per-device results in the search index.
    #[serde(default = "Uuid::new_v4")]
    pub run_id: Uuid,
    /// Lookup-based or direct-command run.
    pub request_type: RequestType,
    /// Legacy threading selector, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threading_type: Option<String>,
    /// Explicit devices. Takes precedence over `search_criteria`.
    #[serde(default)]
    pub device_list: Vec<DeviceSearch>,
    /// Criteria to expand into a device list when `device_list` is empty.
    #[serde(default)]
    pub search_criteria: Option<SearchCriteria>,
    /// Template search operation.
    #[serde(default)]
    pub operation: Option<Operation>,
    /// Template section filter.
    #[serde(default)]
    pub section: Option<String>,
    /// Template variable overrides.
    #[serde(default)]
    pub template_overrides: Map<String, Value>,
    /// Token the device-transport service uses to resolve device credentials.
    #[serde(default)]
    pub jwt: Option<String>,
    /// Use the caller's own token when `jwt` is not set.
    #[serde(default)]
    pub use_jwt_from_header: bool,
    /// Commands to run (`SSH_PASSTHRU` only).
    #[serde(default)]
    pub device_commands: Vec<String>,
    /// SSH username for every device (`SSH_PASSTHRU` only).
    #[serde(default)]
    pub device_username: Option<String>,
    /// SSH password for every device, in clear text (`SSH_PASSTHRU` only).
    #[serde(default)]
    pub device_password: Option<String>,
    /// Only run the rollback template (`TEMPLATE_LOOKUP` + `CONFIGPUSH` only).
    #[serde(default)]
    pub is_rollback: bool,
    /// Upper bound on concurrently processed devices.
    #[serde(default)]
    pub threading_count: Option<u32>,
}

/// The credential a run request will hand to the device-transport service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardedCredential<'a> {
    /// A token the transport service exchanges for device credentials.
    Token(Option<&'a str>),
    /// Explicit SSH credentials.
    Password {
        /// SSH username.
        username: &'a str,
        /// SSH password.
        password: Option<&'a str>,
    },
}

impl TemplateRunnerRequest {
    /// Returns `true` if a non-empty device username was supplied.
    #[must_use]
    pub fn has_device_username(&self) -> bool {
        self.device_username
            .as_deref()
            .is_some_and(|username| !username.is_empty())
    }

    /// The credential the engine will use for this request.
    #[must_use]
    pub fn forwarded_credential(&self) -> ForwardedCredential<'_> {
        match (self.request_type, self.device_username.as_deref()) {
            (RequestType::SshPassthru, Some(username)) if !username.is_empty() => {
                ForwardedCredential::Password {
                    username,
                    password: self.device_password.as_deref(),
                }
            }
            _ => ForwardedCredential::Token(self.jwt.as_deref()),
        }
    }
}

/// Result of a render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderTemplateResponse {
    /// 200 on success, 400 on partial success, 500 on failure.
    pub status: u16,
    /// Rendered templates, per device.
    #[serde(default)]
    pub render_results: Value,
}

impl RenderTemplateResponse {
    /// Returns `true` if the engine reported partial success.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.status == STATUS_PARTIAL
    }
}

/// Result of a run call, as the engine reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// 200 on success, 400 on partial success, 500 on failure.
    pub status: u16,
    /// The request's run id.
    pub run_id: Uuid,
    /// Per-device statuses for every lookup, render, run and match step.
    #[serde(default)]
    pub result: Value,
    /// The request's operation.
    #[serde(default)]
    pub operation: Option<Operation>,
    /// The request's section.
    #[serde(default)]
    pub section: Option<String>,
    /// Engine-internal fields that are not part of the public response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunResult {
    /// Returns `true` if the engine reported partial success.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.status == STATUS_PARTIAL
    }
}

/// The `(error, result)` pair every engine call returns.
///
/// When `error` is set, `result` is not authoritative and is discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownstreamOutcome<T> {
    /// Structured error reported by the engine.
    pub error: Option<String>,
    /// Domain result.
    pub result: Option<T>,
}

impl<T> DownstreamOutcome<T> {
    /// Resolve the pair into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Downstream`] if the engine reported an error, or
    /// [`EngineError::Internal`] if it reported neither an error nor a result.
    pub fn into_result(self) -> Result<T> {
        match (self.error, self.result) {
            (Some(error), _) => Err(EngineError::Downstream(error)),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(EngineError::Internal(
                "engine returned neither an error nor a result".to_string(),
            )),
        }
    }
}
