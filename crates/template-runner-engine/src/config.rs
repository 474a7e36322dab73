//! Engine-facing service configuration.

use serde::{Deserialize, Serialize};

use crate::transport::DeviceTransportEndpoint;

/// The configuration snapshot handed to the orchestration engine on every call.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Template and device data store (GraphQL endpoint).
    pub postgraphile_url: String,
    /// Cache host.
    pub redis_hostname: String,
    /// Cache port.
    pub redis_port: String,
    /// Cache database index.
    pub redis_db: String,
    /// Cache password.
    pub redis_password: String,
    /// Search index host, where per-device results are written.
    pub elasticsearch_host: String,
    /// Search index port.
    pub elasticsearch_port: String,
    /// Search index name.
    pub elasticsearch_index: String,
    /// Device-transport service URL.
    pub dcs_server_url: String,
    /// Location of the secrets configuration.
    pub secrets_config: String,
    /// Device-transport endpoint parsed from `dcs_server_url`.
    pub device_transport: DeviceTransportEndpoint,
}
