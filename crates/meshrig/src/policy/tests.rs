use super::*;
use std::time::Duration;

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

async fn next(policy: &mut PolicyServer) -> Report {
    tokio::time::timeout(Duration::from_secs(5), policy.next_report())
        .await
        .expect("report within timeout")
        .expect("stream open")
}

#[tokio::test]
async fn test_reports_are_streamed_in_order() {
    let mut policy = PolicyServer::bind(loopback()).unwrap();
    let addr = policy.local_addr();
    let server = policy.start().unwrap();

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/report"))
        .json(&serde_json::json!({
            "attributes": [
                {"destination.service": "hello", "response.code": 200},
                {"destination.service": "world", "response.code": 503},
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let first = next(&mut policy).await;
    assert_eq!(first.attribute_str("destination.service"), Some("hello"));
    let second = next(&mut policy).await;
    assert_eq!(second.attribute_str("destination.service"), Some("world"));
    assert_eq!(second.attributes["response.code"], 503);
    assert_eq!(policy.controls().report_count(), 2);

    server.stop().await;
}

#[tokio::test]
async fn test_single_attribute_set_report() {
    let mut policy = PolicyServer::bind(loopback()).unwrap();
    let addr = policy.local_addr();
    let _server = policy.start().unwrap();

    reqwest::Client::new()
        .post(format!("http://{addr}/report"))
        .body(r#"{"attributes": {"source.uid": "kubernetes://a"}}"#)
        .send()
        .await
        .unwrap();

    let report = next(&mut policy).await;
    assert_eq!(report.attribute_str("source.uid"), Some("kubernetes://a"));

    let count: serde_json::Value = reqwest::get(format!("http://{addr}/reports/count"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 1);
}

#[tokio::test]
async fn test_invalid_report_is_rejected() {
    let mut policy = PolicyServer::bind(loopback()).unwrap();
    let addr = policy.local_addr();
    let _server = policy.start().unwrap();

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/report"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(policy.controls().report_count(), 0);
}

#[tokio::test]
async fn test_check_status_is_configurable() {
    let mut policy = PolicyServer::bind(loopback()).unwrap();
    let addr = policy.local_addr();
    let _server = policy.start().unwrap();
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(format!("http://{addr}/check"))
        .json(&serde_json::json!({"attributes": {"request.path": "/"}}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"]["code"], 0);
    assert_eq!(body["valid_use_count"], 10_000);

    policy.controls().set_check_status(7);
    let body: serde_json::Value = client
        .post(format!("http://{addr}/check"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"]["code"], 7);
    assert_eq!(policy.controls().check_count(), 2);
}

#[tokio::test]
async fn test_unknown_route() {
    let mut policy = PolicyServer::bind(loopback()).unwrap();
    let addr = policy.local_addr();
    let _server = policy.start().unwrap();

    let response = reqwest::get(format!("http://{addr}/report")).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_start_twice() {
    let mut policy = PolicyServer::bind(loopback()).unwrap();
    let _server = policy.start().unwrap();
    assert!(matches!(policy.start(), Err(PolicyError::AlreadyStarted)));
}

#[tokio::test]
async fn test_bind_port_in_use() {
    let first = PolicyServer::bind(loopback()).unwrap();
    let err = PolicyServer::bind(first.local_addr()).err().unwrap();
    assert!(matches!(err, PolicyError::Bind(ServeError::Bind { .. })));
}

#[tokio::test]
async fn test_start_policy_server_on_ephemeral_port() {
    let handle = start_policy_server(0).unwrap();
    let port = handle.local_addr().port();
    assert_ne!(port, 0);

    reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/report"))
        .json(&serde_json::json!({"attributes": [{"a": "b"}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(handle.controls().report_count(), 1);
    assert!(!handle.printer_finished());

    handle.stop().await;
}
