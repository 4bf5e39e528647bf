//! Attached SSH sessions.
//!
//! Runs a connection command in the foreground: stdin is inherited, while
//! stdout and stderr are piped and forwarded to mssh's own streams by two
//! background threads. Only the child's exit is waited on; the forwarding
//! threads are never joined.

use crate::command::ConnectionCommand;
use crate::error::{MsshError, Result};
use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use tracing::debug;

/// Build the process for an attached session.
pub fn attached_command(command: &ConnectionCommand) -> Command {
    let mut cmd = Command::new(command.program());
    cmd.args(command.args())
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

/// Copy `from` into `to` on a detached thread.
fn forward<R, W>(name: &'static str, mut from: R, mut to: W)
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    thread::spawn(move || {
        if let Err(e) = io::copy(&mut from, &mut to) {
            debug!(stream = name, error = %e, "stream forwarding stopped");
        }
    });
}

/// Run `command` attached to the terminal and wait for it to exit.
///
/// # Errors
///
/// Returns [`MsshError::Launch`] if the process can't be started, can't be
/// waited on, or exits unsuccessfully.
pub fn run_attached(command: &ConnectionCommand) -> Result<ExitStatus> {
    let mut child = attached_command(command).spawn().map_err(|e| {
        MsshError::Launch(format!("failed to start {}: {}", command.program(), e))
    })?;

    if let Some(stdout) = child.stdout.take() {
        forward("stdout", stdout, io::stdout());
    }
    if let Some(stderr) = child.stderr.take() {
        forward("stderr", stderr, io::stderr());
    }

    let status = child
        .wait()
        .map_err(|e| MsshError::Launch(format!("failed to wait {}: {}", command.program(), e)))?;

    if status.success() {
        Ok(status)
    } else {
        Err(MsshError::Launch(format!(
            "{} exited with {}",
            command.program(),
            status
        )))
    }
}
