//! # mssh
//!
//! A multi-host SSH launcher. Pick hosts from a config file by name filters,
//! then connect to each one, directly or in separate tmux windows, optionally
//! hopping through a gateway host.
//!
//! ## Features
//!
//! - **Layered config**: host files can `include` others; the first definition
//!   of a host wins
//! - **Filters**: regular expressions combined with AND, or exact names
//!   combined with OR (`-f`)
//! - **Templates**: hosts whose names start with `_` are never selected
//! - **Gateways**: `Via` runs the connection as a remote command on a jump host
//! - **Tmux**: one window per host with `-t`
//!
//! ## Quick Example
//!
//! ```yaml
//! # ~/.mssh
//! include:
//!   - ~/.mssh.d/work.yaml
//! hosts:
//!   bastion: {}
//!   web1:
//!     Hostname: 10.0.0.11
//!   web2:
//!     Hostname: 10.0.0.12
//!   db1:
//!     Via: bastion
//!     GatewayCommand: ssh -t
//! ```
//!
//! `mssh -t web` then opens `ssh -t 10.0.0.11` and `ssh -t 10.0.0.12` in two
//! tmux windows, and `mssh db1` runs `ssh -t bastion "ssh -t db1"`.
//!
//! ## Architecture
//!
//! - [`config`]: config data structures and parsing
//! - [`loader`]: file loading and include merging
//! - [`resolver`]: target selection from filters
//! - [`command`]: connection command derivation
//! - [`launch`]: guard policy, confirmation and sequential launching
//! - [`tmux`]: tmux window launching
//! - [`ssh`]: attached SSH sessions
//! - [`cli`]: command-line argument parsing with clap
//! - [`error`]: error types

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod launch;
pub mod loader;
pub mod resolver;
pub mod ssh;
pub mod tmux;

pub use command::ConnectionCommand;
pub use config::{Config, ConfigDocument, HostRecord};
pub use error::{MsshError, Result};
pub use resolver::FilterSpec;
