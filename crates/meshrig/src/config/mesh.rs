//! Mesh-wide proxy defaults.

use std::time::Duration;

use serde::Serialize;

/// Process-wide defaults for proxy behaviour.
///
/// Built once from [`MeshConfig::default`], adjusted once by the harness, and
/// never mutated afterwards. The discovery service reads it when generating
/// listeners and clusters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeshConfig {
    /// Port the proxy captures inbound/outbound traffic on.
    pub proxy_listen_port: u16,
    /// Port of the HTTP proxy listener; 0 disables it.
    pub proxy_http_port: u16,
    /// Connect timeout applied to generated clusters.
    #[serde(serialize_with = "crate::bootstrap::serialize_duration")]
    pub connect_timeout: Duration,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            proxy_listen_port: 15001,
            proxy_http_port: 0,
            connect_timeout: Duration::from_secs(1),
        }
    }
}

impl MeshConfig {
    /// Returns a copy with the HTTP proxy listener enabled on `port`.
    pub fn with_proxy_http_port(mut self, port: u16) -> Self {
        self.proxy_http_port = port;
        self
    }

    /// Whether the HTTP proxy listener is enabled.
    pub fn http_proxy_enabled(&self) -> bool {
        self.proxy_http_port != 0
    }
}
