//! Tmux window launching.
//!
//! Each target gets its own tmux window running the connection command.
//! Windows are started detached: mssh doesn't wait for them.

use crate::command::ConnectionCommand;
use crate::error::{MsshError, Result};
use std::process::{Child, Command, ExitStatus};
use std::thread;
use tracing::{debug, warn};

/// Check if we're running inside a tmux session.
///
/// Checks for the `TMUX` environment variable, which tmux sets when active.
pub fn in_tmux() -> bool {
    std::env::var("TMUX").is_ok()
}

/// Build the `tmux new-window` invocation for a connection command.
///
/// tmux runs the window command through the shell, so the argv is joined
/// with single spaces.
pub fn new_window_command(command: &ConnectionCommand) -> Command {
    let mut cmd = Command::new("tmux");
    cmd.args(["new-window", &command.to_string()]);
    cmd
}

/// Open a new tmux window running `command`.
///
/// Returns as soon as tmux has been started; the window's lifetime is
/// independent of mssh.
///
/// # Errors
///
/// Returns [`MsshError::Tmux`] if the tmux binary can't be started.
pub fn new_window(command: &ConnectionCommand) -> Result<Child> {
    if !in_tmux() {
        debug!("TMUX is not set; tmux will pick the most recent session");
    }
    new_window_command(command)
        .spawn()
        .map_err(|e| MsshError::Tmux(format!("failed to start tmux: {}", e)))
}

/// Map a finished `tmux new-window` status to a result.
///
/// # Errors
///
/// Returns [`MsshError::Tmux`] if tmux exited unsuccessfully.
pub fn check_status(status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(MsshError::Tmux(format!("new-window exited with {}", status)))
    }
}

/// Collect the exit status of a `tmux new-window` client.
///
/// A client that has already failed is reported as an error. One that is
/// still running is waited on by a detached thread, which logs a failure
/// against `host`.
///
/// # Errors
///
/// Returns [`MsshError::Tmux`] if tmux has already exited unsuccessfully or
/// its status can't be read.
pub fn reap(mut child: Child, host: &str) -> Result<()> {
    match child.try_wait() {
        Ok(Some(status)) => check_status(status),
        Ok(None) => {
            let host = host.to_string();
            thread::spawn(move || match child.wait() {
                Ok(status) => {
                    if let Err(e) = check_status(status) {
                        warn!(host = %host, "{}", e);
                    }
                }
                Err(e) => debug!(host = %host, error = %e, "failed to wait for tmux"),
            });
            Ok(())
        }
        Err(e) => Err(MsshError::Tmux(format!("failed to wait for tmux: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::build_for_record;
    use crate::config::HostRecord;

    #[test]
    fn test_new_window_command_args() {
        let record = HostRecord {
            via: "bastion".into(),
            hostname: String::new(),
            gateway_command: "ssh -A".into(),
        };
        let cmd = new_window_command(&build_for_record("db1", &record));
        assert_eq!(cmd.get_program(), "tmux");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["new-window", "ssh -t bastion ssh -A db1"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_check_status() {
        let ok = Command::new("true").status().unwrap();
        assert!(check_status(ok).is_ok());

        let failed = Command::new("false").status().unwrap();
        let err = check_status(failed).unwrap_err();
        assert!(matches!(err, MsshError::Tmux(msg) if msg.contains("new-window exited")));
    }

    #[cfg(unix)]
    #[test]
    fn test_reap_reports_finished_failure() {
        let mut child = Command::new("false").spawn().unwrap();
        // let it finish so the status is already available
        let status = child.wait().unwrap();
        assert!(!status.success());
        assert!(matches!(reap(child, "web1"), Err(MsshError::Tmux(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_reap_running_child_is_detached() {
        let child = Command::new("sleep").arg("1").spawn().unwrap();
        assert!(reap(child, "web1").is_ok());
    }
}
