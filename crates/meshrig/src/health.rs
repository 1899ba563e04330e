//! Structured reporting of harness startup stages.

use std::fmt;
use std::sync::Arc;

/// One step of the startup sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Discovery,
    Policy,
    /// A mock backend, named after its role (`echo`, `http-v1`, ...).
    Backend(String),
    Proxy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Discovery => f.write_str("discovery"),
            Stage::Policy => f.write_str("policy"),
            Stage::Backend(name) => write!(f, "backend:{name}"),
            Stage::Proxy => f.write_str("proxy"),
        }
    }
}

/// Observer for startup events, one call per stage transition.
pub trait StartupReporter: Send + Sync {
    fn stage_starting(&self, stage: &Stage);

    fn stage_ready(&self, stage: &Stage);

    /// Invoked once, for the stage that aborted the startup.
    fn stage_failed(&self, stage: &Stage, error: &(dyn std::error::Error + 'static));
}

impl<T> StartupReporter for Arc<T>
where
    T: StartupReporter + ?Sized,
{
    fn stage_starting(&self, stage: &Stage) {
        (**self).stage_starting(stage);
    }

    fn stage_ready(&self, stage: &Stage) {
        (**self).stage_ready(stage);
    }

    fn stage_failed(&self, stage: &Stage, error: &(dyn std::error::Error + 'static)) {
        (**self).stage_failed(stage, error);
    }
}

/// Default reporter that records startup events using `tracing`.
///
/// Everything is logged at debug level; the caller of `start_all` reports the
/// failure that ends startup.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredStartupReporter;

impl StructuredStartupReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StartupReporter for StructuredStartupReporter {
    fn stage_starting(&self, stage: &Stage) {
        tracing::debug!(
            target: "meshrig::health",
            event = "stage_starting",
            stage = %stage,
            "starting"
        );
    }

    fn stage_ready(&self, stage: &Stage) {
        tracing::debug!(
            target: "meshrig::health",
            event = "stage_ready",
            stage = %stage,
            "ready"
        );
    }

    fn stage_failed(&self, stage: &Stage, error: &(dyn std::error::Error + 'static)) {
        tracing::debug!(
            target: "meshrig::health",
            event = "stage_failed",
            stage = %stage,
            error = %error,
            "failed to start"
        );
    }
}
