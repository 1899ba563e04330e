//! Discovery service.
//!
//! Serves proxy configuration built from two sources: a directory of config
//! files (see [`store`]) and the configured service registries (see
//! [`registry`]). The same API is exposed on an HTTP/1 port and on an
//! HTTP/1 + HTTP/2 ("gRPC") address. A watcher task re-scans the directory
//! every `file_walk_interval` and reloads it when anything changed.

mod handler;
pub mod registry;
pub mod store;
pub mod xds;


use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::HarnessArgs;
use crate::network::{any_addr, parse_listen_addr};
use crate::server::{BoundListener, Protocol, ServeError, ServerHandle};

pub use handler::CACHE_HEADER;
pub use registry::{AggregateRegistry, MockRegistry, ServiceRegistry};
pub use store::{ConfigEntry, ConfigSnapshot, ConfigStore, StoreError};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to load mesh config: {0}")]
    Config(#[from] StoreError),

    #[error("unknown service registry '{0}'")]
    UnknownRegistry(String),

    #[error("invalid discovery gRPC address '{0}'")]
    InvalidGrpcAddr(String),

    #[error("file walk interval must be non-zero")]
    ZeroWalkInterval,

    #[error(transparent)]
    Bind(#[from] ServeError),
}

/// A constructed, not yet serving, discovery service.
pub struct DiscoveryService {
    args: HarnessArgs,
    grpc_addr: SocketAddr,
    store: Arc<ConfigStore>,
    registry: Arc<AggregateRegistry>,
}

impl DiscoveryService {
    /// Validate `args`, load the config directory and build the registries.
    pub fn new(args: &HarnessArgs) -> Result<Self, DiscoveryError> {
        if args.file_walk_interval.is_zero() {
            return Err(DiscoveryError::ZeroWalkInterval);
        }
        let grpc_addr = parse_listen_addr(&args.discovery.grpc_addr)
            .ok_or_else(|| DiscoveryError::InvalidGrpcAddr(args.discovery.grpc_addr.clone()))?;

        let registry = AggregateRegistry::from_names(&args.service.registries)?;
        let store = ConfigStore::open(&args.config.file_dir, &args.namespace)?;

        Ok(Self {
            args: args.clone(),
            grpc_addr,
            store: Arc::new(store),
            registry: Arc::new(registry),
        })
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Bind both listeners, start serving and start the directory watcher.
    ///
    /// Both ports are bound before anything is spawned.
    pub fn start(self) -> Result<DiscoveryHandle, DiscoveryError> {
        let http = BoundListener::bind("discovery-http", any_addr(self.args.discovery.http_port))?;
        let grpc = BoundListener::bind("discovery-grpc", self.grpc_addr)?;

        let handler = Arc::new(handler::DiscoveryHandler::new(
            self.args.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
        ));
        let http = http.serve(Protocol::Http1, handler.clone());
        let grpc = grpc.serve(Protocol::Auto, handler);
        let watcher = spawn_watcher(Arc::clone(&self.store), self.args.file_walk_interval);

        debug!(
            http = %http.local_addr(),
            grpc = %grpc.local_addr(),
            namespace = %self.args.namespace,
            registries = ?self.registry.names(),
            "discovery service started"
        );

        Ok(DiscoveryHandle {
            http,
            grpc,
            watcher,
            store: self.store,
        })
    }
}

fn spawn_watcher(store: Arc<ConfigStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the store was just loaded.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let scan = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || scan.refresh()).await {
                Ok(Ok(true)) => {
                    let snapshot = store.snapshot();
                    info!(
                        dir = %store.dir().display(),
                        version = store.version(),
                        entries = snapshot.entries.len(),
                        "mesh config reloaded"
                    );
                }
                Ok(Ok(false)) => {}
                Ok(Err(e)) => {
                    warn!(error = %e, "mesh config reload failed, keeping previous config");
                }
                Err(e) => {
                    warn!(error = %e, "mesh config scan task failed");
                }
            }
        }
    })
}

/// A running discovery service.
#[derive(Debug)]
pub struct DiscoveryHandle {
    http: ServerHandle,
    grpc: ServerHandle,
    watcher: JoinHandle<()>,
    store: Arc<ConfigStore>,
}

impl DiscoveryHandle {
    pub fn http_addr(&self) -> SocketAddr {
        self.http.local_addr()
    }

    pub fn grpc_addr(&self) -> SocketAddr {
        self.grpc.local_addr()
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Stop both listeners and the watcher.
    pub async fn stop(self) {
        self.watcher.abort();
        self.http.stop().await;
        self.grpc.stop().await;
    }
}

/// Construct and start the discovery service for `args`.
pub fn start_discovery_service(args: &HarnessArgs) -> Result<DiscoveryHandle, DiscoveryError> {
    info!(dir = %args.config.file_dir.display(), "using mesh configs");
    DiscoveryService::new(args)?.start()
}
