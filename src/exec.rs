//! Timeout-bounded subprocess execution.
//!
//! Every external command the statusline runs (git queries, the macOS
//! keychain lookup) goes through [`run_with_timeout`]. A child that outlives
//! its deadline is killed; callers decide how to degrade.

use std::fmt;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub enum ExecError {
    /// The program could not be started (not installed, bad cwd, ...).
    Spawn(std::io::Error),
    /// Waiting on the child failed.
    Wait(std::io::Error),
    /// The child ran past its deadline and was killed.
    TimedOut(Duration),
    /// The child exited unsuccessfully; `None` when killed by a signal.
    Failed(Option<i32>),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Spawn(e) => write!(f, "failed to spawn: {e}"),
            ExecError::Wait(e) => write!(f, "failed to wait: {e}"),
            ExecError::TimedOut(t) => write!(f, "timed out after {}ms", t.as_millis()),
            ExecError::Failed(Some(code)) => write!(f, "exited with status {code}"),
            ExecError::Failed(None) => write!(f, "terminated by signal"),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Spawn(e) | ExecError::Wait(e) => Some(e),
            _ => None,
        }
    }
}

/// Run `cmd` to completion and return its stdout, or fail after `timeout`.
///
/// stdin is closed and stderr discarded. stdout is drained on a helper
/// thread so a chatty child cannot block on a full pipe while we poll. The
/// deadline also covers that drain: a background grandchild holding the pipe
/// open does not extend it.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<String, ExecError> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(ExecError::Spawn)?;

    let reader: Option<Receiver<Vec<u8>>> = child.stdout.take().map(|mut out| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = out.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExecError::TimedOut(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                return Err(ExecError::Wait(e));
            }
        }
    };

    if !status.success() {
        return Err(ExecError::Failed(status.code()));
    }

    let stdout = match reader {
        Some(rx) => match rx.recv_timeout(timeout.saturating_sub(start.elapsed())) {
            Ok(buf) => buf,
            Err(mpsc::RecvTimeoutError::Timeout) => return Err(ExecError::TimedOut(timeout)),
            Err(mpsc::RecvTimeoutError::Disconnected) => Vec::new(),
        },
        None => Vec::new(),
    };
    Ok(String::from_utf8_lossy(&stdout).into_owned())
}
