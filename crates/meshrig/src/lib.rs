//! meshrig: a single-process service mesh harness.
//!
//! Brings up a discovery service, a policy/telemetry server, mock HTTP and
//! gRPC backends and, optionally, a sidecar proxy wired to them. Intended for
//! manual testing and debugging of proxy configuration.

// ===== Components =====
pub mod backend;
pub mod bootstrap;
pub mod discovery;
pub mod policy;
pub mod proxy;

// ===== Orchestration =====
pub mod config;
pub mod harness;
pub mod health;
pub mod telemetry;

// ===== Shared plumbing =====
pub mod network;
pub mod response;
pub mod server;
pub mod template;

pub use config::{HarnessConfig, HarnessPorts};
pub use harness::{wait_for_shutdown, Harness, HarnessError, RunningHarness, ShutdownSignal};
