use std::net::SocketAddr;

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};

use crate::response::{build_response_with_headers, collect_body, error_response};
use crate::server::{RequestHandler, ResponseBody};

/// Returns the request body, and its content type, unchanged.
pub(super) struct EchoHandler;

#[async_trait]
impl RequestHandler for EchoHandler {
    async fn handle(&self, req: Request<Incoming>, _peer: SocketAddr) -> Response<ResponseBody> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        match collect_body(req).await {
            Ok(body) => {
                build_response_with_headers(StatusCode::OK, [("content-type", content_type)], body)
            }
            Err(e) => error_response(StatusCode::BAD_REQUEST, &e),
        }
    }
}
