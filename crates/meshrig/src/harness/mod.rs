//! Startup orchestration.
//!
//! [`Harness::start_all`] brings the components up in dependency order:
//! discovery, policy, the mock backends, then (optionally) the sidecar proxy.
//! The first failure aborts the sequence; components already started keep
//! running and nothing is rolled back.

mod signal;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::backend::{default_backends, start_backend, BackendError, BackendHandle};
use crate::bootstrap::{
    generate_bootstrap, BootstrapError, BOOTSTRAP_EPOCH, DEFAULT_DISCOVERY_ADDRESS,
};
use crate::config::{HarnessArgs, HarnessConfig, HarnessPorts};
use crate::discovery::{start_discovery_service, DiscoveryError, DiscoveryHandle};
use crate::health::{Stage, StartupReporter, StructuredStartupReporter};
use crate::policy::{start_policy_server, PolicyError, PolicyHandle};
use crate::proxy::{open_proxy_log, run_proxy, ProxyLaunch, ProxyProcess};

pub use signal::{wait_for_shutdown, ShutdownError, ShutdownSignal, TerminationSignal};

/// Proxy log file name inside the output directory.
pub const PROXY_LOG_FILE: &str = "envoy_hyperistio_sidecar.log";

/// Service node name the proxy is launched with.
pub const PROXY_SERVICE_NODE: &str = "node";

/// Extra arguments passed to the proxy binary.
pub const PROXY_EXTRA_ARGS: [&str; 1] = ["--disable-hot-restart"];

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("discovery service failed to start: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("policy server failed to start: {0}")]
    Policy(#[from] PolicyError),

    #[error("mock backend failed to start: {0}")]
    Backend(#[from] BackendError),

    #[error("proxy bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),
}

/// Startup sequence of the harness.
pub struct Harness {
    config: HarnessConfig,
    ports: HarnessPorts,
    reporter: Arc<dyn StartupReporter>,
}

impl Harness {
    /// Harness on the fixed port layout, reporting through `tracing`.
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            ports: HarnessPorts::fixed(),
            reporter: Arc::new(StructuredStartupReporter::new()),
        }
    }

    pub fn with_ports(mut self, ports: HarnessPorts) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn StartupReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Start every component in order and return their handles.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_all(&self) -> Result<RunningHarness, HarnessError> {
        let args = HarnessArgs::new(&self.config, &self.ports);

        let discovery = self.stage(Stage::Discovery, || start_discovery_service(&args))?;
        let policy = self.stage(Stage::Policy, || start_policy_server(self.ports.policy))?;

        let mut backends = Vec::new();
        for spec in default_backends(&self.ports) {
            let stage = Stage::Backend(spec.kind.to_string());
            backends.push(self.stage(stage, || start_backend(&spec))?);
        }

        let proxy = if self.config.proxy {
            Some(self.stage(Stage::Proxy, || self.start_proxy())?)
        } else {
            debug!("proxy disabled, skipping");
            None
        };

        debug!(
            discovery = %discovery.http_addr(),
            policy = %policy.local_addr(),
            backends = backends.len(),
            proxy = proxy.is_some(),
            "harness started"
        );

        Ok(RunningHarness {
            discovery,
            policy,
            backends,
            proxy,
        })
    }

    fn stage<T, E>(
        &self,
        stage: Stage,
        start: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, HarnessError>
    where
        E: std::error::Error + Into<HarnessError> + 'static,
    {
        self.reporter.stage_starting(&stage);
        match start() {
            Ok(value) => {
                self.reporter.stage_ready(&stage);
                Ok(value)
            }
            Err(e) => {
                self.reporter.stage_failed(&stage, &e);
                Err(e.into())
            }
        }
    }

    /// Write the bootstrap, then launch the proxy against it.
    ///
    /// A proxy that fails to spawn is logged and skipped.
    fn start_proxy(&self) -> Result<ProxyStage, BootstrapError> {
        let out_dir = &self.config.out_dir;
        let bootstrap = generate_bootstrap(
            DEFAULT_DISCOVERY_ADDRESS,
            out_dir,
            &self.config.proxy_bin,
            self.config.resolved_bootstrap_template(),
        )?;

        let log = open_proxy_log(&out_dir.join(PROXY_LOG_FILE));
        let launch = ProxyLaunch {
            node_id: PROXY_SERVICE_NODE.to_string(),
            epoch: BOOTSTRAP_EPOCH,
            bootstrap_file: bootstrap.path.clone(),
            extra_args: PROXY_EXTRA_ARGS.iter().map(|a| a.to_string()).collect(),
        };

        let process = match run_proxy(&bootstrap.config, launch, log) {
            Ok(process) => Some(process),
            Err(e) => {
                warn!(error = %e, "proxy not started, continuing without it");
                None
            }
        };

        Ok(ProxyStage {
            bootstrap: bootstrap.path,
            process,
        })
    }
}

/// Proxy stage outcome: the bootstrap file and, if it spawned, the process.
#[derive(Debug)]
pub struct ProxyStage {
    pub bootstrap: PathBuf,
    pub process: Option<ProxyProcess>,
}

/// Handles of every started component.
///
/// Held for the life of the process; the binary exits without stopping them.
#[derive(Debug)]
pub struct RunningHarness {
    discovery: DiscoveryHandle,
    policy: PolicyHandle,
    backends: Vec<BackendHandle>,
    proxy: Option<ProxyStage>,
}

impl RunningHarness {
    pub fn discovery(&self) -> &DiscoveryHandle {
        &self.discovery
    }

    pub fn policy(&self) -> &PolicyHandle {
        &self.policy
    }

    pub fn backends(&self) -> &[BackendHandle] {
        &self.backends
    }

    pub fn proxy(&self) -> Option<&ProxyStage> {
        self.proxy.as_ref()
    }

    pub fn bootstrap_path(&self) -> Option<&Path> {
        self.proxy.as_ref().map(|p| p.bootstrap.as_path())
    }

    /// Stop everything. The binary never calls this; tests use it to release
    /// ports.
    pub async fn stop(self) {
        if let Some(mut process) = self.proxy.and_then(|p| p.process) {
            if process.stop() {
                let _ = process.wait().await;
            }
        }
        for backend in self.backends {
            backend.stop().await;
        }
        self.policy.stop().await;
        self.discovery.stop().await;
    }
}
