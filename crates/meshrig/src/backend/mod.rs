//! Mock backend servers.
//!
//! Three flavours stand behind the mesh during manual testing:
//!
//! - `echo`: returns the request body unchanged (used by the policy tests)
//! - `http-<version>`: describes the request it received, one `Key=value` per line
//! - `grpc-<version>`: echoes gRPC frames back with an OK `grpc-status` trailer

mod echo;
mod grpc;
mod http;

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::HarnessPorts;
use crate::network::any_addr;
use crate::server::{BoundListener, Protocol, RequestHandler, ServeError, ServerHandle};

pub use grpc::{grpc_frame, GRPC_CONTENT_TYPE};

/// Response header carrying the backend version.
pub const SERVICE_VERSION_HEADER: &str = "x-service-version";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to start backend {backend}: {source}")]
    Bind {
        backend: String,
        #[source]
        source: ServeError,
    },
}

/// What a mock backend serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Echo,
    Http { version: String },
    Grpc { version: String },
}

impl BackendKind {
    pub fn http(version: &str) -> Self {
        BackendKind::Http {
            version: version.to_string(),
        }
    }

    pub fn grpc(version: &str) -> Self {
        BackendKind::Grpc {
            version: version.to_string(),
        }
    }

    fn server_name(&self) -> &'static str {
        match self {
            BackendKind::Echo => "echo",
            BackendKind::Http { .. } => "http-echo",
            BackendKind::Grpc { .. } => "grpc-echo",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Echo => f.write_str("echo"),
            BackendKind::Http { version } => write!(f, "http-{version}"),
            BackendKind::Grpc { version } => write!(f, "grpc-{version}"),
        }
    }
}

/// A backend to start: its kind and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSpec {
    pub kind: BackendKind,
    pub port: u16,
}

/// The harness backends, in start order.
pub fn default_backends(ports: &HarnessPorts) -> Vec<BackendSpec> {
    vec![
        BackendSpec {
            kind: BackendKind::Echo,
            port: ports.echo,
        },
        BackendSpec {
            kind: BackendKind::http("v1"),
            port: ports.http_v1,
        },
        BackendSpec {
            kind: BackendKind::grpc("v1"),
            port: ports.grpc_v1,
        },
        BackendSpec {
            kind: BackendKind::http("v2"),
            port: ports.http_v2,
        },
        BackendSpec {
            kind: BackendKind::grpc("v2"),
            port: ports.grpc_v2,
        },
    ]
}

/// A running mock backend.
#[derive(Debug)]
pub struct BackendHandle {
    kind: BackendKind,
    server: ServerHandle,
}

impl BackendHandle {
    pub fn kind(&self) -> &BackendKind {
        &self.kind
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub async fn stop(self) {
        self.server.stop().await;
    }
}

/// Bind and serve one backend.
pub fn start_backend(spec: &BackendSpec) -> Result<BackendHandle, BackendError> {
    let listener =
        BoundListener::bind(spec.kind.server_name(), any_addr(spec.port)).map_err(|source| {
            BackendError::Bind {
                backend: spec.kind.to_string(),
                source,
            }
        })?;
    let port = listener.local_addr().port();

    let (protocol, handler): (Protocol, Arc<dyn RequestHandler>) = match &spec.kind {
        BackendKind::Echo => (Protocol::Http1, Arc::new(echo::EchoHandler)),
        BackendKind::Http { version } => (
            Protocol::Http1,
            Arc::new(http::HttpEchoHandler::new(version, port)),
        ),
        BackendKind::Grpc { version } => {
            (Protocol::Auto, Arc::new(grpc::GrpcEchoHandler::new(version)))
        }
    };

    let server = listener.serve(protocol, handler);
    debug!(backend = %spec.kind, addr = %server.local_addr(), "backend started");
    Ok(BackendHandle {
        kind: spec.kind.clone(),
        server,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral(kind: BackendKind) -> BackendSpec {
        BackendSpec { kind, port: 0 }
    }

    #[test]
    fn test_default_backends_order() {
        let names: Vec<String> = default_backends(&HarnessPorts::fixed())
            .iter()
            .map(|b| format!("{}@{}", b.kind, b.port))
            .collect();
        assert_eq!(
            names,
            [
                "echo@7070",
                "http-v1@7072",
                "grpc-v1@7073",
                "http-v2@7074",
                "grpc-v2@7075"
            ]
        );
    }

    #[tokio::test]
    async fn test_echo_backend_returns_body() {
        let backend = start_backend(&ephemeral(BackendKind::Echo)).unwrap();
        let port = backend.local_addr().port();

        let response = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/anything"))
            .header("content-type", "text/plain")
            .body("ping")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(response.text().await.unwrap(), "ping");

        backend.stop().await;
    }

    #[tokio::test]
    async fn test_http_backend_describes_request() {
        let backend = start_backend(&ephemeral(BackendKind::http("v2"))).unwrap();
        let port = backend.local_addr().port();

        let response = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{port}/hello?x=1"))
            .header("x-request-id", "abc")
            .send()
            .await
            .unwrap();
        assert_eq!(response.headers()[SERVICE_VERSION_HEADER], "v2");
        let body = response.text().await.unwrap();

        assert!(body.contains("ServiceVersion=v2\n"));
        assert!(body.contains(&format!("ServicePort={port}\n")));
        assert!(body.contains("Method=GET\n"));
        assert!(body.contains("URL=/hello?x=1\n"));
        assert!(body.contains("RequestHeader=x-request-id:abc\n"));
    }

    #[tokio::test]
    async fn test_grpc_backend_echoes_frames() {
        let backend = start_backend(&ephemeral(BackendKind::grpc("v1"))).unwrap();
        let port = backend.local_addr().port();
        let frame = grpc_frame(b"hello");

        let client = reqwest::Client::builder()
            .http2_prior_knowledge()
            .build()
            .unwrap();
        let response = client
            .post(format!("http://127.0.0.1:{port}/istio.test.Echo/Echo"))
            .header("content-type", GRPC_CONTENT_TYPE)
            .body(frame.clone())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], GRPC_CONTENT_TYPE);
        assert_eq!(response.headers()[SERVICE_VERSION_HEADER], "v1");
        assert_eq!(response.bytes().await.unwrap(), frame);
    }

    #[tokio::test]
    async fn test_grpc_backend_rejects_plain_http() {
        let backend = start_backend(&ephemeral(BackendKind::grpc("v1"))).unwrap();
        let port = backend.local_addr().port();

        let response = reqwest::get(format!("http://127.0.0.1:{port}/"))
            .await
            .unwrap();
        assert_eq!(response.status(), 415);
    }

    #[tokio::test]
    async fn test_port_in_use_names_backend() {
        let first = start_backend(&ephemeral(BackendKind::Echo)).unwrap();
        let err = start_backend(&BackendSpec {
            kind: BackendKind::http("v1"),
            port: first.local_addr().port(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("http-v1"));
    }
}
