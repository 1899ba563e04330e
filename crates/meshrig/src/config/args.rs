//! Startup parameters of the discovery service.

use std::path::PathBuf;
use std::time::Duration;

use super::{HarnessConfig, HarnessPorts, MeshConfig, PROXY_HTTP_PORT};

/// Interval between two scans of the watched configuration directory.
pub const DEFAULT_FILE_WALK_INTERVAL: Duration = Duration::from_secs(5);

/// Name of the built-in mock service registry.
pub const MOCK_REGISTRY: &str = "Mock";

/// Namespace the harness runs the discovery service in.
const DEFAULT_NAMESPACE: &str = "testing";

/// Built-in test data shipped with the crate.
pub fn default_config_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/config"))
}

/// Listener options of the discovery API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Port of the HTTP/1 discovery API.
    pub http_port: u16,
    /// Listen address of the HTTP/2 endpoint, `host:port` or `:port`.
    pub grpc_addr: String,
    /// Cache discovery responses until the config store changes.
    pub enable_caching: bool,
    /// Expose the `/debug/*` endpoints.
    pub enable_profiling: bool,
}

/// Mesh-level wiring handed to generated proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshArgs {
    /// Address of the policy/telemetry server.
    pub mixer_address: String,
    /// Refresh delay advertised for route discovery.
    pub rds_refresh_delay: Duration,
}

/// Configuration source of the discovery service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Directory of YAML/JSON config files.
    pub file_dir: PathBuf,
}

/// Service registries backing the discovery service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceArgs {
    /// Registry names, e.g. `Mock`.
    pub registries: Vec<String>,
}

/// Aggregate startup parameters of the discovery service.
///
/// Constructed once and passed by reference to the service constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessArgs {
    pub namespace: String,
    pub discovery: DiscoveryOptions,
    pub mesh: MeshArgs,
    pub config: ConfigArgs,
    pub service: ServiceArgs,
    pub mesh_config: MeshConfig,
    /// Polling interval of the config directory watcher.
    pub file_walk_interval: Duration,
}

impl HarnessArgs {
    /// Builds the discovery arguments for the given harness settings and port layout.
    pub fn new(config: &HarnessConfig, ports: &HarnessPorts) -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            discovery: DiscoveryOptions {
                http_port: ports.discovery_http,
                grpc_addr: format!(":{}", ports.discovery_grpc),
                enable_caching: true,
                enable_profiling: true,
            },
            mesh: MeshArgs {
                mixer_address: ports.mixer_address(),
                rds_refresh_delay: Duration::from_millis(10),
            },
            config: ConfigArgs {
                file_dir: config.resolved_config_dir(),
            },
            service: ServiceArgs {
                registries: vec![MOCK_REGISTRY.to_string()],
            },
            mesh_config: MeshConfig::default().with_proxy_http_port(PROXY_HTTP_PORT),
            file_walk_interval: config.walk_interval(),
        }
    }
}
