//! Shared accept loop for the harness servers.
//!
//! Every component (discovery, policy, mock backends) binds its port through
//! [`BoundListener::bind`] and hands a [`RequestHandler`] to
//! [`BoundListener::serve`], which spawns the accept loop and returns a
//! [`ServerHandle`]. Binding and serving are separate steps so a port-in-use
//! error surfaces synchronously to the caller before anything is spawned.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::network::create_listener;

/// Response body type produced by every handler.
pub type ResponseBody = BoxBody<Bytes, Infallible>;

/// Request handler plugged into the shared accept loop.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle(&self, req: Request<Incoming>, peer: SocketAddr) -> Response<ResponseBody>;
}

/// HTTP protocol spoken on a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// HTTP/1.1 only.
    Http1,
    /// HTTP/1.1 or HTTP/2 with prior knowledge (h2c), detected per connection.
    Auto,
}

/// Errors raised while binding a server listener.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {name} on {addr}: {source}")]
    Bind {
        name: &'static str,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// A bound, not yet serving, listener.
#[derive(Debug)]
pub struct BoundListener {
    name: &'static str,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl BoundListener {
    /// Bind `addr` for the component called `name`.
    pub fn bind(name: &'static str, addr: SocketAddr) -> Result<Self, ServeError> {
        let bind_error = |source| ServeError::Bind { name, addr, source };
        let listener = create_listener(addr).map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        Ok(Self {
            name,
            listener,
            local_addr,
        })
    }

    /// Address the listener is bound to (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawn the accept loop and serve every connection with `handler`.
    pub fn serve(self, protocol: Protocol, handler: Arc<dyn RequestHandler>) -> ServerHandle {
        let (shutdown_tx, _) = broadcast::channel(1);
        let mut shutdown_rx = shutdown_tx.subscribe();
        let Self {
            name,
            listener,
            local_addr,
        } = self;

        debug!(server = name, addr = %local_addr, ?protocol, "listening");

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, peer)) => {
                                let handler = Arc::clone(&handler);
                                tokio::spawn(serve_connection(name, protocol, stream, peer, handler));
                            }
                            Err(e) => {
                                error!(server = name, error = %e, "accept error");
                            }
                        }
                    }
                    // Only an explicit stop ends the loop; a dropped handle
                    // leaves the server running.
                    Ok(()) = shutdown_rx.recv() => {
                        debug!(server = name, addr = %local_addr, "shutting down");
                        break;
                    }
                }
            }
        });

        ServerHandle {
            name,
            local_addr,
            shutdown_tx,
            task,
        }
    }
}

async fn serve_connection(
    name: &'static str,
    protocol: Protocol,
    stream: tokio::net::TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn RequestHandler>,
) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| {
        let handler = Arc::clone(&handler);
        async move { Ok::<_, Infallible>(handler.handle(req, peer).await) }
    });

    let result = match protocol {
        Protocol::Http1 => http1::Builder::new()
            .serve_connection(io, service)
            .await
            .map_err(|e| e.to_string()),
        Protocol::Auto => auto::Builder::new(TokioExecutor::new())
            .serve_connection(io, service)
            .await
            .map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        debug!(server = name, %peer, error = %e, "connection error");
    }
}

/// Handle to a running server.
///
/// The harness keeps these for the lifetime of the process and never joins
/// them; tests use [`ServerHandle::shutdown`] to release ports. Dropping the
/// handle does not stop the server.
pub struct ServerHandle {
    name: &'static str,
    local_addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the accept loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop accepting connections. In-flight connections are not interrupted.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Stop the accept loop and wait for it to exit.
    pub async fn stop(self) {
        self.shutdown();
        let _ = self.task.await;
    }
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("name", &self.name)
            .field("local_addr", &self.local_addr)
            .finish()
    }
}
