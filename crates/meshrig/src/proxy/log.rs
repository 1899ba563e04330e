//! Proxy output destination.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::{debug, warn};

/// Where the proxy's stdout and stderr end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// An opened proxy log, ready to be handed to the child process.
#[derive(Debug)]
pub struct ProxyLog {
    target: LogTarget,
    file: Option<File>,
}

impl ProxyLog {
    /// Log sink that forwards to the harness's own stderr.
    pub fn stderr() -> Self {
        Self {
            target: LogTarget::Stderr,
            file: None,
        }
    }

    pub fn target(&self) -> &LogTarget {
        &self.target
    }

    /// Stdout and stderr handles for the child.
    ///
    /// Both point at the same file. A handle that cannot be duplicated falls
    /// back to stderr.
    pub(crate) fn stdio(&self) -> (Stdio, Stdio) {
        match &self.file {
            Some(file) => (clone_or_stderr(file), clone_or_stderr(file)),
            None => (Stdio::from(io::stderr()), Stdio::from(io::stderr())),
        }
    }
}

fn clone_or_stderr(file: &File) -> Stdio {
    match file.try_clone() {
        Ok(file) => Stdio::from(file),
        Err(e) => {
            warn!(error = %e, "failed to duplicate proxy log handle, using stderr");
            Stdio::from(io::stderr())
        }
    }
}

/// Create (or truncate) the proxy log at `path`.
///
/// Never fails: when the file cannot be created a warning is logged and the
/// proxy writes to stderr instead.
pub fn open_proxy_log(path: &Path) -> ProxyLog {
    match File::create(path) {
        Ok(file) => {
            debug!(path = %path.display(), "proxy log");
            ProxyLog {
                target: LogTarget::File(path.to_path_buf()),
                file: Some(file),
            }
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to create proxy log, falling back to stderr"
            );
            ProxyLog::stderr()
        }
    }
}
