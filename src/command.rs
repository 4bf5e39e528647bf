//! Connection command derivation.
//!
//! Turns a host name and its [`HostRecord`] into the exact argv to run.
//!
//! | `Via`   | `GatewayCommand` | command                                        |
//! |---------|------------------|------------------------------------------------|
//! | empty   | empty            | `ssh -t <addr>`                                |
//! | empty   | `mosh`           | `mosh <addr>`                                  |
//! | `gw`    | `ssh -A`         | `ssh -t gw "ssh -A <addr>"`                    |
//!
//! `<addr>` is the record's `Hostname`, or the host name itself when unset.

use crate::config::{Config, HostRecord};
use crate::error::{MsshError, Result};
use std::fmt;
use tracing::{info, warn};

/// Invocation used when no `GatewayCommand` applies.
pub const DEFAULT_CLIENT: [&str; 2] = ["ssh", "-t"];

/// A fully resolved program invocation: program name followed by arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCommand(Vec<String>);

impl ConnectionCommand {
    /// The program to execute.
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    /// The whole argv.
    pub fn argv(&self) -> &[String] {
        &self.0
    }

    /// Consume the command, returning the argv.
    pub fn into_argv(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for ConnectionCommand {
    /// Arguments joined by single spaces, as handed to `tmux new-window`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

fn default_client() -> Vec<String> {
    DEFAULT_CLIENT.iter().map(|s| s.to_string()).collect()
}

/// Derive the command for a host record.
///
/// The result always has at least two elements.
pub fn build_for_record(host_name: &str, record: &HostRecord) -> ConnectionCommand {
    let address = if record.hostname.is_empty() {
        host_name
    } else {
        record.hostname.as_str()
    };

    let mut argv = if !record.has_gateway() && record.has_gateway_command() {
        record
            .gateway_command
            .split_whitespace()
            .map(str::to_string)
            .collect()
    } else {
        default_client()
    };

    if record.has_gateway() {
        if !record.has_gateway_command() {
            warn!(
                host = host_name,
                via = %record.via,
                "Via is set without GatewayCommand; remote command is just the address"
            );
        }
        argv.push(record.via.clone());
        argv.push(format!("{} {}", record.gateway_command, address));
    } else {
        argv.push(address.to_string());
    }

    ConnectionCommand(argv)
}

/// Derive the command for `host_name` from the merged config.
///
/// The built command is logged before it is returned.
///
/// # Errors
///
/// Returns [`MsshError::HostNotFound`] if the host isn't configured.
pub fn build(host_name: &str, config: &Config) -> Result<ConnectionCommand> {
    let record = config
        .get_host(host_name)
        .ok_or_else(|| MsshError::HostNotFound(host_name.to_string()))?;
    let command = build_for_record(host_name, record);
    info!(host = host_name, command = ?command.argv(), "built connection command");
    Ok(command)
}
