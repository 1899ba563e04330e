//! Sidecar proxy process management.
//!
//! [`run_proxy`] spawns the proxy binary against a generated bootstrap and
//! returns a [`ProxyProcess`]: a stop channel that terminates the child and an
//! exit channel that reports how it ended. A supervising task owns the child
//! for its whole life.

mod log;


use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bootstrap::ProxyBootstrapConfig;

pub use log::{open_proxy_log, LogTarget, ProxyLog};

/// Maximum object name length passed to the proxy.
const MAX_OBJ_NAME_LEN: u32 = 189;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to spawn proxy binary {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for proxy process: {0}")]
    Wait(#[source] io::Error),

    #[error("proxy supervisor went away")]
    Detached,
}

/// Per-launch parameters of a proxy process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyLaunch {
    pub node_id: String,
    pub epoch: u32,
    pub bootstrap_file: PathBuf,
    pub extra_args: Vec<String>,
}

/// Command-line arguments of the proxy binary.
pub fn proxy_args(config: &ProxyBootstrapConfig, launch: &ProxyLaunch) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-c".into(),
        launch.bootstrap_file.clone().into(),
        "--restart-epoch".into(),
        launch.epoch.to_string().into(),
        "--drain-time-s".into(),
        config.drain_duration.as_secs().to_string().into(),
        "--service-cluster".into(),
        config.service_cluster.clone().into(),
        "--service-node".into(),
        launch.node_id.clone().into(),
        "--max-obj-name-len".into(),
        MAX_OBJ_NAME_LEN.to_string().into(),
    ];
    args.extend(launch.extra_args.iter().map(OsString::from));
    args
}

/// Spawn the proxy binary with output redirected to `log`.
///
/// Returns as soon as the process is started. Must be called from within a
/// tokio runtime.
pub fn run_proxy(
    config: &ProxyBootstrapConfig,
    launch: ProxyLaunch,
    log: ProxyLog,
) -> Result<ProxyProcess, ProxyError> {
    let args = proxy_args(config, &launch);
    let (stdout, stderr) = log.stdio();

    let mut command = Command::new(&config.binary_path);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr);

    let child = command.spawn().map_err(|source| ProxyError::Spawn {
        binary: config.binary_path.clone(),
        source,
    })?;
    let pid = child.id();

    debug!(
        binary = %config.binary_path.display(),
        pid = ?pid,
        node = %launch.node_id,
        epoch = launch.epoch,
        log = ?log.target(),
        "proxy started"
    );

    let (stop_tx, stop_rx) = oneshot::channel();
    let (exit_tx, exit_rx) = oneshot::channel();
    let task = tokio::spawn(supervise(child, pid, stop_rx, exit_tx));

    Ok(ProxyProcess {
        pid,
        stop: Some(stop_tx),
        exits: Some(exit_rx),
        task,
        log: log.target().clone(),
    })
}

enum SupervisorEvent {
    Exited(io::Result<ExitStatus>),
    Stop,
    Detached,
}

async fn supervise(
    mut child: Child,
    pid: Option<u32>,
    stop_rx: oneshot::Receiver<()>,
    exit_tx: oneshot::Sender<Result<ExitStatus, ProxyError>>,
) {
    let event = tokio::select! {
        status = child.wait() => SupervisorEvent::Exited(status),
        stop = stop_rx => match stop {
            Ok(()) => SupervisorEvent::Stop,
            Err(_) => SupervisorEvent::Detached,
        },
    };

    let status = match event {
        SupervisorEvent::Exited(status) => status,
        SupervisorEvent::Stop => {
            info!(pid = ?pid, "stopping proxy");
            terminate(pid);
            child.wait().await
        }
        // Nobody can stop it any more; keep reaping.
        SupervisorEvent::Detached => child.wait().await,
    };

    let outcome = match status {
        Ok(status) if status.success() => {
            info!(pid = ?pid, "proxy exited");
            Ok(status)
        }
        Ok(status) => {
            warn!(pid = ?pid, %status, "proxy exited abnormally");
            Ok(status)
        }
        Err(e) => {
            warn!(pid = ?pid, error = %e, "failed to wait for proxy");
            Err(ProxyError::Wait(e))
        }
    };
    let _ = exit_tx.send(outcome);
}

fn terminate(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    // SAFETY: plain syscall on a pid owned by this supervisor and not yet reaped.
    let result = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if result != 0 {
        warn!(pid, error = %io::Error::last_os_error(), "failed to signal proxy");
    }
}

/// A running proxy process.
///
/// Dropping it leaves the process running.
#[derive(Debug)]
pub struct ProxyProcess {
    pid: Option<u32>,
    stop: Option<oneshot::Sender<()>>,
    exits: Option<oneshot::Receiver<Result<ExitStatus, ProxyError>>>,
    task: JoinHandle<()>,
    log: LogTarget,
}

impl ProxyProcess {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn log_target(&self) -> &LogTarget {
        &self.log
    }

    /// Whether the supervisor has observed the process exit.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Ask the supervisor to terminate the process. Returns `false` when a stop
    /// was already requested or the process is gone.
    pub fn stop(&mut self) -> bool {
        self.stop.take().is_some_and(|stop| stop.send(()).is_ok())
    }

    /// Take the exit channel. Yields the exit status once the process ends.
    pub fn take_exit(&mut self) -> Option<oneshot::Receiver<Result<ExitStatus, ProxyError>>> {
        self.exits.take()
    }

    /// Wait for the process to exit.
    pub async fn wait(mut self) -> Result<ExitStatus, ProxyError> {
        match self.exits.take() {
            Some(exits) => exits.await.unwrap_or(Err(ProxyError::Detached)),
            None => Err(ProxyError::Detached),
        }
    }
}
