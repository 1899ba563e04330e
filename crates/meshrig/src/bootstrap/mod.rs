//! Proxy bootstrap file generation.
//!
//! The generator turns a [`ProxyBootstrapConfig`] into the JSON bootstrap the
//! sidecar proxy reads at startup (`<config_path>/envoy-rev<epoch>.json`).
//! Without a custom template the built-in Envoy v2 bootstrap is emitted; with
//! one, the template is rendered through [`crate::template`] and must produce
//! valid JSON.

mod envoy;


use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::template::{self, TemplateError};

/// Discovery address the sidecar proxy is pointed at.
pub const DEFAULT_DISCOVERY_ADDRESS: &str = "localhost:8080";

/// Service cluster of the sidecar proxy.
pub const DEFAULT_SERVICE_CLUSTER: &str = "test";

/// Node identity written into the bootstrap.
pub const SIDECAR_NODE_ID: &str = "sidecar~127.0.0.2~a~a";

/// Restart epoch of the first (and only) proxy generation.
pub const BOOTSTRAP_EPOCH: u32 = 1;

/// Admin port of the sidecar proxy.
pub const DEFAULT_PROXY_ADMIN_PORT: u16 = 15000;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("proxy config field '{field}' must be non-zero")]
    ZeroDuration { field: &'static str },

    #[error("invalid discovery address '{0}': expected host:port")]
    InvalidDiscoveryAddress(String),

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read bootstrap template {path}: {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render bootstrap template: {0}")]
    Template(#[from] TemplateError),

    #[error("bootstrap template {path} did not render to valid JSON: {source}")]
    InvalidTemplateOutput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize bootstrap: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write bootstrap file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize a duration the way the proxy's JSON config expects it: `"10s"`,
/// `"0.01s"`.
pub fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*duration))
}

pub(crate) fn format_duration(duration: Duration) -> String {
    format!("{}s", duration.as_secs_f64())
}

/// Settings of one sidecar proxy: where it finds discovery, where its files
/// live, and the timings baked into its bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyBootstrapConfig {
    pub discovery_address: String,
    /// Output directory of the bootstrap file.
    pub config_path: PathBuf,
    pub binary_path: PathBuf,
    pub service_cluster: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_config_file: Option<PathBuf>,
    pub proxy_admin_port: u16,
    #[serde(serialize_with = "serialize_duration")]
    pub discovery_refresh_delay: Duration,
    #[serde(serialize_with = "serialize_duration")]
    pub connect_timeout: Duration,
    #[serde(serialize_with = "serialize_duration")]
    pub drain_duration: Duration,
}

impl ProxyBootstrapConfig {
    /// Sidecar settings used by the harness.
    pub fn sidecar(
        discovery_address: impl Into<String>,
        config_path: impl Into<PathBuf>,
        binary_path: impl Into<PathBuf>,
        custom_config_file: Option<PathBuf>,
    ) -> Self {
        Self {
            discovery_address: discovery_address.into(),
            config_path: config_path.into(),
            binary_path: binary_path.into(),
            service_cluster: DEFAULT_SERVICE_CLUSTER.to_string(),
            custom_config_file,
            proxy_admin_port: DEFAULT_PROXY_ADMIN_PORT,
            discovery_refresh_delay: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            drain_duration: Duration::from_secs(30),
        }
    }

    /// Reject configs the proxy would crash on.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        for (field, value) in [
            ("discovery_refresh_delay", self.discovery_refresh_delay),
            ("connect_timeout", self.connect_timeout),
            ("drain_duration", self.drain_duration),
        ] {
            if value.is_zero() {
                return Err(BootstrapError::ZeroDuration { field });
            }
        }
        self.discovery_host_port()?;
        Ok(())
    }

    /// Split the discovery address into host and port.
    pub fn discovery_host_port(&self) -> Result<(&str, u16), BootstrapError> {
        let invalid = || BootstrapError::InvalidDiscoveryAddress(self.discovery_address.clone());
        let (host, port) = self.discovery_address.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        Ok((host, port))
    }

    /// Path of the bootstrap file for `epoch`.
    pub fn bootstrap_path(&self, epoch: u32) -> PathBuf {
        self.config_path.join(format!("envoy-rev{epoch}.json"))
    }
}

/// A bootstrap file on disk and the config it was generated from.
#[derive(Debug, Clone)]
pub struct GeneratedBootstrap {
    pub config: ProxyBootstrapConfig,
    pub path: PathBuf,
}

/// Build the sidecar config for `mesh_addr` and write its bootstrap file into
/// `out_dir`.
pub fn generate_bootstrap(
    mesh_addr: &str,
    out_dir: &Path,
    binary_path: &Path,
    custom_config_path: Option<&Path>,
) -> Result<GeneratedBootstrap, BootstrapError> {
    let config = ProxyBootstrapConfig::sidecar(
        mesh_addr,
        out_dir,
        binary_path,
        custom_config_path.map(Path::to_path_buf),
    );
    let path = write_bootstrap(&config, SIDECAR_NODE_ID, BOOTSTRAP_EPOCH)?;
    Ok(GeneratedBootstrap { config, path })
}

/// Validate `config` and write its bootstrap for `node_id` / `epoch`.
///
/// Nothing is written when validation fails. A write that fails halfway
/// leaves the partial file behind.
pub fn write_bootstrap(
    config: &ProxyBootstrapConfig,
    node_id: &str,
    epoch: u32,
) -> Result<PathBuf, BootstrapError> {
    config.validate()?;

    let contents = match &config.custom_config_file {
        Some(template_path) => render_custom(config, template_path, node_id, epoch)?,
        None => serde_json::to_string_pretty(&envoy::bootstrap(config, node_id)?)?,
    };

    fs::create_dir_all(&config.config_path).map_err(|source| BootstrapError::CreateDir {
        path: config.config_path.clone(),
        source,
    })?;

    let path = config.bootstrap_path(epoch);
    fs::write(&path, contents).map_err(|source| BootstrapError::Write {
        path: path.clone(),
        source,
    })?;

    debug!(
        path = %path.display(),
        node = node_id,
        epoch,
        discovery = %config.discovery_address,
        "wrote proxy bootstrap"
    );
    Ok(path)
}

fn render_custom(
    config: &ProxyBootstrapConfig,
    template_path: &Path,
    node_id: &str,
    epoch: u32,
) -> Result<String, BootstrapError> {
    debug!(template = %template_path.display(), "rendering custom bootstrap template");
    let source = fs::read_to_string(template_path).map_err(|source| BootstrapError::ReadTemplate {
        path: template_path.to_path_buf(),
        source,
    })?;

    let rendered = template::render(&source, &template_vars(config, node_id, epoch)?)?;
    serde_json::from_str::<serde_json::Value>(&rendered).map_err(|source| {
        BootstrapError::InvalidTemplateOutput {
            path: template_path.to_path_buf(),
            source,
        }
    })?;
    Ok(rendered)
}

fn template_vars(
    config: &ProxyBootstrapConfig,
    node_id: &str,
    epoch: u32,
) -> Result<HashMap<String, String>, BootstrapError> {
    let (host, port) = config.discovery_host_port()?;
    Ok(HashMap::from([
        ("node.id".to_string(), node_id.to_string()),
        ("cluster".to_string(), config.service_cluster.clone()),
        ("discovery.host".to_string(), host.to_string()),
        ("discovery.port".to_string(), port.to_string()),
        ("refresh_delay".to_string(), format_duration(config.discovery_refresh_delay)),
        ("connect_timeout".to_string(), format_duration(config.connect_timeout)),
        ("drain_duration".to_string(), format_duration(config.drain_duration)),
        ("epoch".to_string(), epoch.to_string()),
    ]))
}
