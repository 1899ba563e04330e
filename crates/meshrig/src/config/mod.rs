//! Configuration types for the meshrig harness.
//!
//! - `HarnessConfig`: command-line / environment settings for the binary
//! - `MeshConfig`: mesh-wide proxy defaults consumed by the discovery service
//! - `HarnessPorts`: the fixed local ports every component binds to
//! - `HarnessArgs`: aggregate startup parameters of the discovery service

mod args;
mod mesh;
mod ports;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::builder::{OsStringValueParser, TypedValueParser};
use clap::{ArgAction, Parser, ValueEnum};

pub use args::{
    default_config_dir, ConfigArgs, DiscoveryOptions, HarnessArgs, MeshArgs, ServiceArgs,
    DEFAULT_FILE_WALK_INTERVAL, MOCK_REGISTRY,
};
pub use mesh::MeshConfig;
pub use ports::{HarnessPorts, PROXY_HTTP_PORT};

/// Environment variable overriding the watched configuration directory.
pub const CONFIG_DIR_ENV: &str = "MESHRIG_CONFIG";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default proxy binary, resolved through `PATH`.
pub const DEFAULT_PROXY_BINARY: &str = "envoy";

/// Output format of the harness logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single line output.
    #[default]
    Compact,
    /// Structured JSON, one object per event.
    Json,
}

/// Harness settings resolved from the command line and the environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "meshrig")]
#[command(
    author,
    version,
    about = "Run discovery, policy, mock backends and a sidecar proxy in one process"
)]
pub struct HarnessConfig {
    /// Start the sidecar proxy process
    #[arg(
        long,
        alias = "envoy",
        env = "MESHRIG_PROXY",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub proxy: bool,

    /// Directory of mesh configuration files watched by the discovery service
    #[arg(long, env = CONFIG_DIR_ENV, value_parser = any_path())]
    pub config_dir: Option<PathBuf>,

    /// Output directory for the proxy bootstrap file and proxy log
    #[arg(long, env = "MESHRIG_OUT", default_value_os_t = default_out_dir())]
    pub out_dir: PathBuf,

    /// Path of the proxy binary
    #[arg(long, env = "MESHRIG_PROXY_BIN", default_value = DEFAULT_PROXY_BINARY)]
    pub proxy_bin: PathBuf,

    /// Optional bootstrap template rendered instead of the built-in bootstrap
    #[arg(long, env = "MESHRIG_BOOTSTRAP_TEMPLATE", value_parser = any_path())]
    pub bootstrap_template: Option<PathBuf>,

    /// Polling interval of the configuration directory watcher, in milliseconds
    #[arg(long, env = "MESHRIG_WALK_INTERVAL_MS", default_value_t = 5000)]
    pub walk_interval_ms: u64,

    /// Log filter directive (tracing `EnvFilter` syntax)
    #[arg(long, env = "MESHRIG_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Log output format
    #[arg(long, env = "MESHRIG_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl HarnessConfig {
    /// Polling interval of the configuration directory watcher.
    pub fn walk_interval(&self) -> Duration {
        Duration::from_millis(self.walk_interval_ms)
    }

    /// Directory watched by the discovery service, falling back to the
    /// built-in test data when no override is configured.
    ///
    /// An empty value counts as unset.
    pub fn resolved_config_dir(&self) -> PathBuf {
        non_empty(self.config_dir.as_deref())
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_dir)
    }

    /// Custom bootstrap template, if one is set and non-empty.
    pub fn resolved_bootstrap_template(&self) -> Option<&Path> {
        non_empty(self.bootstrap_template.as_deref())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            proxy: true,
            config_dir: None,
            out_dir: default_out_dir(),
            proxy_bin: PathBuf::from(DEFAULT_PROXY_BINARY),
            bootstrap_template: None,
            walk_interval_ms: DEFAULT_FILE_WALK_INTERVAL.as_millis() as u64,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

/// Path parser that accepts empty values, so an empty environment variable
/// behaves like an unset one instead of failing the parse.
fn any_path() -> impl TypedValueParser<Value = PathBuf> {
    OsStringValueParser::new().map(PathBuf::from)
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Default output directory: `<tmp>/meshrig`.
pub fn default_out_dir() -> PathBuf {
    std::env::temp_dir().join("meshrig")
}
