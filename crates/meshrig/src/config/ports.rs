//! Fixed local ports of the harness components.

/// HTTP proxy listener port advertised through the mesh config.
pub const PROXY_HTTP_PORT: u16 = 15002;

/// Ports every component binds to.
///
/// The binary always uses [`HarnessPorts::fixed`]; there is no command-line
/// override and no conflict detection beyond the bind error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessPorts {
    /// Discovery service HTTP API.
    pub discovery_http: u16,
    /// Discovery service gRPC (HTTP/2) address.
    pub discovery_grpc: u16,
    /// Policy/telemetry server.
    pub policy: u16,
    /// Plain echo backend.
    pub echo: u16,
    /// HTTP echo backend, version `v1`.
    pub http_v1: u16,
    /// RPC echo backend, version `v1`.
    pub grpc_v1: u16,
    /// HTTP echo backend, version `v2`.
    pub http_v2: u16,
    /// RPC echo backend, version `v2`.
    pub grpc_v2: u16,
}

impl HarnessPorts {
    /// The hard-coded port layout of the harness.
    pub const fn fixed() -> Self {
        Self {
            discovery_http: 15007,
            discovery_grpc: 15010,
            policy: 9091,
            echo: 7070,
            http_v1: 7072,
            grpc_v1: 7073,
            http_v2: 7074,
            grpc_v2: 7075,
        }
    }

    /// Every component on an OS-assigned port. Used by tests running several
    /// harnesses side by side.
    pub const fn ephemeral() -> Self {
        Self {
            discovery_http: 0,
            discovery_grpc: 0,
            policy: 0,
            echo: 0,
            http_v1: 0,
            grpc_v1: 0,
            http_v2: 0,
            grpc_v2: 0,
        }
    }

    /// Address the discovery service forwards policy calls to.
    pub fn mixer_address(&self) -> String {
        format!("localhost:{}", self.policy)
    }
}

impl Default for HarnessPorts {
    fn default() -> Self {
        Self::fixed()
    }
}
