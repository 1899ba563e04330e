use std::fmt::Write;
use std::net::SocketAddr;

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};

use super::SERVICE_VERSION_HEADER;
use crate::response::{build_response_with_headers, collect_body};
use crate::server::{RequestHandler, ResponseBody};

/// Describes each request as `Key=value` lines, followed by the request body.
pub(super) struct HttpEchoHandler {
    version: String,
    port: u16,
}

impl HttpEchoHandler {
    pub(super) fn new(version: &str, port: u16) -> Self {
        Self {
            version: version.to_string(),
            port,
        }
    }

    fn describe(&self, req: &Request<Incoming>, peer: SocketAddr) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "ServiceVersion={}", self.version);
        let _ = writeln!(out, "ServicePort={}", self.port);
        let _ = writeln!(out, "Method={}", req.method());
        let _ = writeln!(out, "URL={}", req.uri());
        let _ = writeln!(out, "Proto={:?}", req.version());
        let _ = writeln!(out, "RemoteAddr={peer}");
        if let Some(host) = req.headers().get(hyper::header::HOST) {
            let _ = writeln!(out, "Host={}", String::from_utf8_lossy(host.as_bytes()));
        }
        for (name, value) in req.headers() {
            let _ = writeln!(
                out,
                "RequestHeader={}:{}",
                name,
                String::from_utf8_lossy(value.as_bytes())
            );
        }
        out
    }
}

#[async_trait]
impl RequestHandler for HttpEchoHandler {
    async fn handle(&self, req: Request<Incoming>, peer: SocketAddr) -> Response<ResponseBody> {
        let mut body = self.describe(&req, peer);
        // An unreadable body is reported inline; the description is still useful.
        match collect_body(req).await {
            Ok(bytes) if !bytes.is_empty() => body.push_str(&String::from_utf8_lossy(&bytes)),
            Ok(_) => {}
            Err(e) => {
                let _ = writeln!(body, "BodyError={e}");
            }
        }

        build_response_with_headers(
            StatusCode::OK,
            [
                ("content-type", "text/plain"),
                (SERVICE_VERSION_HEADER, self.version.as_str()),
            ],
            body,
        )
    }
}
