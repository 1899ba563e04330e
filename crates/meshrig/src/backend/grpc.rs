use std::convert::Infallible;
use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Frame, Incoming};
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use tracing::debug;

use super::SERVICE_VERSION_HEADER;
use crate::response::{collect_body, error_response};
use crate::server::{RequestHandler, ResponseBody};

pub const GRPC_CONTENT_TYPE: &str = "application/grpc";

/// Wrap `payload` in a gRPC length-prefixed message (uncompressed).
pub fn grpc_frame(payload: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(5 + payload.len());
    frame.put_u8(0);
    frame.put_u32(payload.len() as u32);
    frame.put_slice(payload);
    frame.freeze()
}

/// Echoes gRPC request messages back, tagged with the backend version.
pub(super) struct GrpcEchoHandler {
    version: HeaderValue,
}

impl GrpcEchoHandler {
    pub(super) fn new(version: &str) -> Self {
        Self {
            version: HeaderValue::from_str(version)
                .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
        }
    }

    fn reply(&self, messages: Bytes, status: u16) -> Response<ResponseBody> {
        let mut trailers = HeaderMap::new();
        trailers.insert("grpc-status", HeaderValue::from(status));

        let frames: Vec<Result<Frame<Bytes>, Infallible>> =
            vec![Ok(Frame::data(messages)), Ok(Frame::trailers(trailers))];
        let body = StreamBody::new(stream::iter(frames)).boxed();

        let mut response = Response::new(body);
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(GRPC_CONTENT_TYPE));
        headers.insert(SERVICE_VERSION_HEADER, self.version.clone());
        response
    }
}

#[async_trait]
impl RequestHandler for GrpcEchoHandler {
    async fn handle(&self, req: Request<Incoming>, _peer: SocketAddr) -> Response<ResponseBody> {
        let is_grpc = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(GRPC_CONTENT_TYPE));
        if !is_grpc {
            return error_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "expected content-type application/grpc",
            );
        }

        let method = req.uri().path().to_string();
        match collect_body(req).await {
            Ok(messages) => {
                debug!(%method, bytes = messages.len(), "grpc echo");
                self.reply(messages, 0)
            }
            // 13: INTERNAL
            Err(_) => self.reply(Bytes::new(), 13),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grpc_frame_prefix() {
        let frame = grpc_frame(b"abc");
        assert_eq!(&frame[..], &[0, 0, 0, 0, 3, b'a', b'b', b'c']);
    }
}
