//! Launch orchestration.
//!
//! Takes the resolved targets and opens a connection for each one, in order,
//! after applying the run-wide guard policy:
//!
//! - several targets need tmux mode
//! - more than [`CONFIRM_THRESHOLD`] targets need a `y` answer unless `--yes`
//!   was given
//! - dry runs stop after listing the targets
//!
//! A target that fails to build or launch is logged and skipped; the rest
//! still launch.

use crate::command::{self, ConnectionCommand};
use crate::config::Config;
use crate::error::{MsshError, Result};
use crate::{ssh, tmux};
use std::io::{Read, Write};
use tracing::{error, info, warn};

/// Target counts above this require confirmation.
pub const CONFIRM_THRESHOLD: usize = 2;

/// How every target in a run is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaunchMode {
    /// Run the command in the foreground, attached to the terminal.
    #[default]
    Attached,
    /// Open a detached tmux window per target.
    Tmux,
}

/// Opens one connection command.
pub trait Launcher {
    /// Launch `command` for `host`.
    fn launch(&mut self, host: &str, command: &ConnectionCommand) -> Result<()>;
}

/// Opens each command in a new tmux window.
#[derive(Debug, Default)]
pub struct TmuxLauncher;

impl Launcher for TmuxLauncher {
    fn launch(&mut self, host: &str, command: &ConnectionCommand) -> Result<()> {
        let child = tmux::new_window(command)?;
        info!(host, pid = child.id(), "opened tmux window");
        tmux::reap(child, host)
    }
}

/// Runs each command attached to the terminal and waits for it.
#[derive(Debug, Default)]
pub struct AttachedLauncher;

impl Launcher for AttachedLauncher {
    fn launch(&mut self, host: &str, command: &ConnectionCommand) -> Result<()> {
        let status = ssh::run_attached(command)?;
        info!(host, %status, "session ended");
        Ok(())
    }
}

impl LaunchMode {
    /// Pick the mode from the `--tmux` flag.
    pub fn from_tmux_flag(tmux: bool) -> Self {
        if tmux {
            LaunchMode::Tmux
        } else {
            LaunchMode::Attached
        }
    }

    /// The launcher implementing this mode.
    pub fn launcher(self) -> Box<dyn Launcher> {
        match self {
            LaunchMode::Attached => Box::new(AttachedLauncher),
            LaunchMode::Tmux => Box::new(TmuxLauncher),
        }
    }
}

/// Run-wide launch settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchOptions {
    /// List the targets and stop.
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    pub yes: bool,
    /// Launch strategy for every target.
    pub mode: LaunchMode,
}

/// Outcome of a completed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LaunchSummary {
    /// Hosts whose command was launched.
    pub launched: Vec<String>,
    /// Hosts whose command failed to build or launch.
    pub failed: Vec<String>,
}

/// Reject several targets when each would take over the terminal.
///
/// # Errors
///
/// Returns [`MsshError::TooManyTargets`] for more than one target outside
/// tmux mode.
pub fn check_guard(targets: usize, mode: LaunchMode) -> Result<()> {
    if mode == LaunchMode::Attached && targets > 1 {
        return Err(MsshError::TooManyTargets(targets));
    }
    Ok(())
}

/// Ask for a single-character confirmation.
///
/// Only `y` or `Y` counts as yes. End of input or a read failure is a no.
pub fn confirm<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "Too many hosts selected\nInput `y` to continue: ")?;
    output.flush()?;

    let mut answer = [0u8; 1];
    match input.read(&mut answer) {
        Ok(1) => Ok(matches!(answer[0], b'y' | b'Y')),
        Ok(_) => Ok(false),
        Err(e) => {
            error!("Error reading confirmation: {}", e);
            Ok(false)
        }
    }
}

/// Drives one run: listing, guard checks, confirmation and launching.
pub struct Orchestrator<'a, R, W> {
    config: &'a Config,
    options: LaunchOptions,
    input: R,
    output: W,
}

impl<'a, R: Read, W: Write> Orchestrator<'a, R, W> {
    /// Create an orchestrator reading answers from `input` and writing the
    /// target list and prompts to `output`.
    pub fn new(config: &'a Config, options: LaunchOptions, input: R, output: W) -> Self {
        Orchestrator {
            config,
            options,
            input,
            output,
        }
    }

    /// Launch every target in order.
    ///
    /// `targets` should already be sorted (see [`crate::resolver::resolve`]).
    ///
    /// # Errors
    ///
    /// - [`MsshError::TooManyTargets`] if the guard rejects the run
    /// - [`MsshError::ConfirmationAborted`] if the user declines
    /// - [`MsshError::Io`] if the target list can't be written
    pub fn run(&mut self, targets: &[String], launcher: &mut dyn Launcher) -> Result<LaunchSummary> {
        for target in targets {
            writeln!(self.output, "{}", target)?;
        }

        if self.options.dry_run {
            return Ok(LaunchSummary::default());
        }

        check_guard(targets.len(), self.options.mode)?;

        if targets.len() > CONFIRM_THRESHOLD
            && !self.options.yes
            && !confirm(&mut self.input, &mut self.output)?
        {
            return Err(MsshError::ConfirmationAborted);
        }

        let mut summary = LaunchSummary::default();
        for host in targets {
            let launched = command::build(host, self.config)
                .and_then(|cmd| launcher.launch(host, &cmd));
            match launched {
                Ok(()) => summary.launched.push(host.clone()),
                Err(e) => {
                    warn!(host = %host, "{}", e);
                    summary.failed.push(host.clone());
                }
            }
        }

        Ok(summary)
    }
}
