//! Command-line interface for mssh.
//!
//! Parses arguments using clap and provides the [`Cli`] struct containing
//! all user-specified options.

use crate::launch::{LaunchMode, LaunchOptions};
use crate::loader::DEFAULT_CONFIG_PATH;
use crate::resolver::FilterSpec;
use clap::Parser;

/// Command-line arguments for mssh.
///
/// # Examples
///
/// ```bash
/// # Connect to the one host matching "db1"
/// mssh db1
///
/// # Open every web host in its own tmux window
/// mssh -t web
///
/// # Show which hosts match both filters, without connecting
/// mssh -n prod web
///
/// # Open exactly these hosts
/// mssh -t -f web1 web3
/// ```
#[derive(Parser, Debug)]
#[command(name = "mssh")]
#[command(version)]
#[command(about = "Multi-host SSH launcher - resolve hosts from config and connect")]
#[command(long_about = "mssh picks hosts from a YAML or TOML host list by regex (all filters \
    must match)\nor by exact name (-f, any filter may match), then connects to each one with \
    ssh,\ngoing through a gateway host when one is configured.")]
pub struct Cli {
    /// Config file path.
    ///
    /// Files ending in `.toml` are read as TOML, everything else as YAML.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config_file: String,

    /// Show target hosts and exit.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Match filters as exact host names; a host matching any filter is selected.
    #[arg(short, long)]
    pub fixed_string: bool,

    /// Don't ask for confirmation when many hosts are selected.
    #[arg(short, long)]
    pub yes: bool,

    /// Open each host in a new tmux window.
    #[arg(short, long)]
    pub tmux: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Host filters: regular expressions, or exact names with `-f`.
    #[arg(value_name = "FILTER", required = true)]
    pub filters: Vec<String>,
}

impl Cli {
    /// The filter spec selected by the flags.
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::from_fixed_string(self.filters.clone(), self.fixed_string)
    }

    /// The launch settings selected by the flags.
    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            dry_run: self.dry_run,
            yes: self.yes,
            mode: LaunchMode::from_tmux_flag(self.tmux),
        }
    }

    /// Default log filter directive for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}
