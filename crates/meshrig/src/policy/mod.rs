//! Policy/telemetry server.
//!
//! A stand-in for the mesh policy service: `POST /check` answers with a
//! configurable status, `POST /report` turns each attribute set into a
//! [`Report`] delivered through [`PolicyServer::next_report`].

mod types;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::network::any_addr;
use crate::response::{collect_body, error_response, json_response, not_found};
use crate::server::{BoundListener, Protocol, RequestHandler, ResponseBody, ServeError, ServerHandle};

pub use types::{
    Attributes, CheckRequest, CheckResponse, CheckStatus, Report, ReportAttributes, ReportCount,
    ReportRequest,
};

const SERVER_NAME: &str = "policy";

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Bind(#[from] ServeError),

    #[error("policy server already started")]
    AlreadyStarted,
}

/// Counters and knobs shared between the server and its owner.
#[derive(Debug, Default)]
struct PolicyState {
    check_status: AtomicI32,
    checks: AtomicU64,
    reports: AtomicU64,
}

/// Cheap handle for adjusting a running policy server.
#[derive(Debug, Clone)]
pub struct PolicyControls {
    state: Arc<PolicyState>,
}

impl PolicyControls {
    /// Status code returned by subsequent `/check` calls. 0 means OK.
    pub fn set_check_status(&self, code: i32) {
        self.state.check_status.store(code, Ordering::Relaxed);
    }

    pub fn check_count(&self) -> u64 {
        self.state.checks.load(Ordering::Relaxed)
    }

    pub fn report_count(&self) -> u64 {
        self.state.reports.load(Ordering::Relaxed)
    }
}

/// The policy server: a bound listener plus the receiving end of the report
/// stream.
pub struct PolicyServer {
    listener: Option<BoundListener>,
    local_addr: SocketAddr,
    state: Arc<PolicyState>,
    reports_tx: Option<mpsc::UnboundedSender<Report>>,
    reports_rx: mpsc::UnboundedReceiver<Report>,
}

impl PolicyServer {
    /// Bind the policy port. Fails if the port is taken.
    pub fn bind(addr: SocketAddr) -> Result<Self, PolicyError> {
        let listener = BoundListener::bind(SERVER_NAME, addr)?;
        let local_addr = listener.local_addr();
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Ok(Self {
            listener: Some(listener),
            local_addr,
            state: Arc::new(PolicyState::default()),
            reports_tx: Some(reports_tx),
            reports_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn controls(&self) -> PolicyControls {
        PolicyControls {
            state: Arc::clone(&self.state),
        }
    }

    /// Start serving. The report stream ends once the returned server has
    /// stopped and its connections are closed.
    pub fn start(&mut self) -> Result<ServerHandle, PolicyError> {
        let (listener, reports) = match (self.listener.take(), self.reports_tx.take()) {
            (Some(listener), Some(reports)) => (listener, reports),
            _ => return Err(PolicyError::AlreadyStarted),
        };
        let handler = PolicyHandler {
            state: Arc::clone(&self.state),
            reports,
        };
        Ok(listener.serve(Protocol::Auto, Arc::new(handler)))
    }

    /// Next received report, or `None` once the server is gone.
    pub async fn next_report(&mut self) -> Option<Report> {
        self.reports_rx.recv().await
    }
}

struct PolicyHandler {
    state: Arc<PolicyState>,
    reports: mpsc::UnboundedSender<Report>,
}

impl PolicyHandler {
    async fn check(&self, req: Request<Incoming>) -> Response<ResponseBody> {
        let body = match collect_body(req).await {
            Ok(body) => body,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
        };
        let request: CheckRequest = if body.is_empty() {
            CheckRequest::default()
        } else {
            match serde_json::from_slice(&body) {
                Ok(request) => request,
                Err(e) => {
                    return error_response(StatusCode::BAD_REQUEST, &format!("invalid check: {e}"))
                }
            }
        };

        self.state.checks.fetch_add(1, Ordering::Relaxed);
        let code = self.state.check_status.load(Ordering::Relaxed);
        debug!(attributes = request.attributes.len(), code, "check");
        json_response(StatusCode::OK, &CheckResponse::with_code(code))
    }

    async fn report(&self, req: Request<Incoming>) -> Response<ResponseBody> {
        let body = match collect_body(req).await {
            Ok(body) => body,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
        };
        let request: ReportRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, &format!("invalid report: {e}"))
            }
        };

        for attributes in request.attributes.into_vec() {
            self.state.reports.fetch_add(1, Ordering::Relaxed);
            // The receiver only goes away with the server itself.
            let _ = self.reports.send(Report::new(attributes));
        }
        json_response(StatusCode::OK, &serde_json::json!({}))
    }

    fn report_count(&self) -> Response<ResponseBody> {
        let count = self.state.reports.load(Ordering::Relaxed);
        json_response(StatusCode::OK, &ReportCount { count })
    }
}

#[async_trait]
impl RequestHandler for PolicyHandler {
    async fn handle(&self, req: Request<Incoming>, _peer: SocketAddr) -> Response<ResponseBody> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!(%method, %path, "policy request");

        match (&method, path.as_str()) {
            (&Method::POST, "/check") => self.check(req).await,
            (&Method::POST, "/report") => self.report(req).await,
            (&Method::GET, "/reports/count") => self.report_count(),
            _ => not_found(),
        }
    }
}

/// A started policy server and its report printer.
#[derive(Debug)]
pub struct PolicyHandle {
    server: ServerHandle,
    controls: PolicyControls,
    printer: JoinHandle<()>,
}

impl PolicyHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    pub fn controls(&self) -> &PolicyControls {
        &self.controls
    }

    /// Whether the report printer has exited.
    pub fn printer_finished(&self) -> bool {
        self.printer.is_finished()
    }

    /// Stop accepting connections. The printer drains what is left and exits.
    pub async fn stop(self) {
        self.server.stop().await;
    }
}

/// Bind and start the policy server on `port`, then spawn a task printing
/// every report to stdout.
pub fn start_policy_server(port: u16) -> Result<PolicyHandle, PolicyError> {
    let mut policy = PolicyServer::bind(any_addr(port))?;
    let server = policy.start()?;
    let controls = policy.controls();

    let printer = tokio::spawn(async move {
        while let Some(report) = policy.next_report().await {
            println!("policy report: {report}");
        }
        debug!("policy report stream closed");
    });

    debug!(addr = %server.local_addr(), "policy server started");
    Ok(PolicyHandle {
        server,
        controls,
        printer,
    })
}
