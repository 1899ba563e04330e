//! HTTP response helpers shared by the harness servers.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

use crate::server::ResponseBody;

/// Error payload returned by every harness endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Wrap a complete body into the boxed response body type.
pub fn full_body(body: impl Into<Bytes>) -> ResponseBody {
    Full::new(body.into()).boxed()
}

/// Build a JSON response.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<ResponseBody> {
    let json = serde_json::to_string_pretty(body).unwrap_or_else(|_| "{}".to_string());
    build_response_with_headers(status, [("Content-Type", "application/json")], json)
}

/// Build an HTTP response with the given status and body.
pub fn build_response(status: StatusCode, body: impl Into<Bytes>) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .body(full_body(body))
        .unwrap_or_else(|_| Response::new(full_body("Internal Server Error")))
}

/// Build an HTTP response with headers.
///
/// Falls back to a bare 200 with an error body if the builder rejects a
/// header, which only happens with invalid header names.
pub fn build_response_with_headers(
    status: StatusCode,
    headers: impl IntoIterator<Item = (impl AsRef<str>, impl AsRef<str>)>,
    body: impl Into<Bytes>,
) -> Response<ResponseBody> {
    let mut builder = Response::builder().status(status);
    for (key, value) in headers {
        builder = builder.header(key.as_ref(), value.as_ref());
    }
    builder
        .body(full_body(body))
        .unwrap_or_else(|_| Response::new(full_body("Internal Server Error")))
}

/// Create an error response.
pub fn error_response(status: StatusCode, message: &str) -> Response<ResponseBody> {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: status.as_u16(),
            message: message.to_string(),
        },
    };
    json_response(status, &error)
}

/// Create a not found response.
pub fn not_found() -> Response<ResponseBody> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Collect request body into bytes.
pub async fn collect_body(req: Request<Incoming>) -> Result<Bytes, String> {
    req.collect()
        .await
        .map(|c| c.to_bytes())
        .map_err(|e| format!("Failed to read request body: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_json_response_sets_content_type() {
        let response = json_response(StatusCode::OK, &serde_json::json!({"ok": true}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(body["error"]["message"], "Not Found");
    }

    #[tokio::test]
    async fn test_build_response_with_headers() {
        let response =
            build_response_with_headers(StatusCode::CREATED, [("x-service-version", "v1")], "hi");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-service-version").unwrap(), "v1");
        assert_eq!(body_string(response).await, "hi");
    }
}
