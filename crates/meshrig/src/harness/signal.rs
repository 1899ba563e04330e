//! Termination signal handling.

use std::fmt;
use std::io;

use thiserror::Error;
use tokio::signal::unix::{signal, Signal, SignalKind};

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("failed to install signal handlers: {source}")]
    Install {
        #[source]
        source: io::Error,
    },
}

/// The signal that ended the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationSignal::Interrupt => f.write_str("SIGINT"),
            TerminationSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Installed SIGINT and SIGTERM handlers.
///
/// Install before starting components so a signal arriving during startup is
/// not lost.
pub struct ShutdownSignal {
    interrupt: Signal,
    terminate: Signal,
}

impl ShutdownSignal {
    pub fn install() -> Result<Self, ShutdownError> {
        let install = |kind| signal(kind).map_err(|source| ShutdownError::Install { source });
        Ok(Self {
            interrupt: install(SignalKind::interrupt())?,
            terminate: install(SignalKind::terminate())?,
        })
    }

    /// Block until SIGINT or SIGTERM arrives.
    pub async fn wait(mut self) -> TerminationSignal {
        tokio::select! {
            _ = self.interrupt.recv() => TerminationSignal::Interrupt,
            _ = self.terminate.recv() => TerminationSignal::Terminate,
        }
    }
}

/// Install the handlers and wait for the first termination signal.
pub async fn wait_for_shutdown() -> Result<TerminationSignal, ShutdownError> {
    Ok(ShutdownSignal::install()?.wait().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_display() {
        assert_eq!(TerminationSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(TerminationSignal::Terminate.to_string(), "SIGTERM");
    }
}
