//! Gateway configuration.
//!
//! Everything is read once at startup, from the process environment or, for
//! local runs, from `local-config.json` layered over it. Loading goes through a
//! key lookup so tests never touch the real environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use template_runner_auth::AuthConfig;
use template_runner_engine::{DeviceTransportEndpoint, EngineError, ServiceConfig};
use template_runner_telemetry::{LoggingConfig, TelemetryError};

/// Listen address for deployed instances.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Listen address when `RUNLOCAL=1`.
pub const LOCAL_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Path prefix the routes are additionally served under.
pub const DEFAULT_ROOT_PATH: &str = "/naas/template-runner/v1";

/// Override file read when `RUNLOCAL=1`.
pub const LOCAL_CONFIG_FILE: &str = "local-config.json";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// The local override file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadOverrides {
        /// Path of the override file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The local override file is not in the expected shape.
    #[error("invalid local overrides: {0}")]
    InvalidOverrides(String),

    /// The device-transport URL could not be parsed.
    #[error(transparent)]
    Endpoint(#[from] EngineError),

    /// The log level is not recognised.
    #[error(transparent)]
    Logging(#[from] TelemetryError),
}

/// Configuration for the HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Prefix the routes are also mounted under. Empty mounts at `/` only.
    #[serde(default = "GatewayConfig::default_root_path")]
    pub root_path: String,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        DEFAULT_LISTEN_ADDR.to_string()
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    fn default_root_path() -> String {
        DEFAULT_ROOT_PATH.to_string()
    }

    /// The root path as a nestable prefix: leading slash, no trailing slash.
    ///
    /// Returns `None` when the routes should only be served at `/`.
    #[must_use]
    pub fn route_prefix(&self) -> Option<String> {
        let trimmed = self.root_path.trim().trim_matches('/');
        (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: Self::default_max_body(),
            root_path: Self::default_root_path(),
        }
    }
}

/// The complete process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Token validation settings.
    pub auth: AuthConfig,
    /// Base URL of the orchestration engine.
    pub template_runner_url: String,
    /// Snapshot sent to the engine with every call.
    pub service: ServiceConfig,
    /// HTTP surface settings.
    pub gateway: GatewayConfig,
    /// Log threshold.
    pub logging: LoggingConfig,
    /// Whether local overrides were requested.
    pub run_local: bool,
}

impl AppConfig {
    /// Load from the process environment, layering `local-config.json` from
    /// the working directory on top when `RUNLOCAL=1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the override file is unreadable or malformed, or if
    /// [`AppConfig::from_lookup`] fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_local = std::env::var("RUNLOCAL").is_ok_and(|v| v.trim() == "1");
        let overrides = if run_local {
            load_local_overrides(Path::new(LOCAL_CONFIG_FILE))?
        } else {
            HashMap::new()
        };

        let mut config = Self::from_lookup(|key| {
            overrides
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })?;
        config.apply_run_mode(run_local);
        Ok(config)
    }

    /// Load from an arbitrary key lookup.
    ///
    /// `TEMPLATE_RUNNER_URL` and `DCS_SERVER_URL` are required; everything
    /// else defaults to empty. A missing `JWT_SECRET` is accepted but rejects
    /// every token.
    ///
    /// # Errors
    ///
    /// Returns an error if a required key is missing, the device-transport URL
    /// cannot be parsed, or `LOG_LEVEL` is not a known level.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        let require = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let dcs_server_url = require("DCS_SERVER_URL")?;
        let device_transport = DeviceTransportEndpoint::from_url(&dcs_server_url)?;

        let service = ServiceConfig {
            postgraphile_url: get("POSTGRAPHILE_URL"),
            redis_hostname: get("REDIS_HOSTNAME"),
            redis_port: get("REDIS_PORT"),
            redis_db: get("REDIS_DB"),
            redis_password: get("REDIS_PASSWORD"),
            elasticsearch_host: get("ELASTICSEARCH_HOST"),
            elasticsearch_port: get("ELASTICSEARCH_PORT"),
            elasticsearch_index: get("ELASTICSEARCH_INDEX"),
            dcs_server_url,
            secrets_config: get("SECRETS_CONFIG"),
            device_transport,
        };

        let mut gateway = GatewayConfig::default();
        if let Some(root_path) = lookup("ROOT_PATH") {
            gateway.root_path = root_path;
        }

        Ok(Self {
            auth: AuthConfig {
                secret: get("JWT_SECRET"),
                audience: get("JWT_AUDIENCE"),
            },
            template_runner_url: require("TEMPLATE_RUNNER_URL")?,
            service,
            gateway,
            logging: LoggingConfig::from_value(lookup(LoggingConfig::LEVEL_VAR).as_deref())?,
            run_local: false,
        })
    }

    /// Switch between the deployed and local listen addresses.
    pub fn apply_run_mode(&mut self, run_local: bool) {
        self.run_local = run_local;
        self.gateway.listen_addr = if run_local {
            LOCAL_LISTEN_ADDR
        } else {
            DEFAULT_LISTEN_ADDR
        }
        .to_string();
    }
}

#[derive(Debug, Deserialize)]
struct LocalOverrides {
    env: Vec<HashMap<String, Value>>,
}

/// Read a `{"env": [{"KEY": value}, ...]}` override file.
///
/// Later entries win. Non-string values are kept in their JSON text form.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not in that shape.
pub fn load_local_overrides(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadOverrides {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: LocalOverrides =
        serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidOverrides(e.to_string()))?;

    Ok(parsed
        .env
        .into_iter()
        .flatten()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}
