//! Device-transport service endpoint.
//!
//! The engine opens device sessions through a separate device-transport
//! service. Its address is registered once at startup from a URL.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EngineError, Result};

/// Host and port of the device-transport service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTransportEndpoint {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl DeviceTransportEndpoint {
    /// Parse an endpoint from a URL such as `http://dcs.internal:9000`.
    ///
    /// When the URL has no explicit port, the scheme's default port is used.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidEndpoint`] if the URL cannot be parsed or
    /// has no host or resolvable port.
    pub fn from_url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| EngineError::InvalidEndpoint(format!("{raw}: {e}")))?;

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| EngineError::InvalidEndpoint(format!("{raw}: missing host")))?
            .to_string();

        let port = url
            .port_or_known_default()
            .ok_or_else(|| EngineError::InvalidEndpoint(format!("{raw}: missing port")))?;

        Ok(Self { host, port })
    }
}

impl fmt::Display for DeviceTransportEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
