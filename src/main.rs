//! mssh CLI entry point.
//!
//! This binary provides the `mssh` command: resolve hosts from the config,
//! then connect to each one directly or in tmux windows.

use clap::Parser;
use mssh::cli::Cli;
use mssh::error::Result;
use mssh::launch::Orchestrator;
use mssh::{loader, resolver};
use std::io;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        if e.is_config_error() {
            eprintln!("Config file: {} (set with --config-file)", cli.config_file);
        }
        std::process::exit(1);
    }
}

/// Log to stderr so stdout carries only the target list and prompts.
fn init_logging(cli: &Cli) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_level().into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// Main application logic.
fn run(cli: &Cli) -> Result<()> {
    let config = loader::load_config(&cli.config_file)?;
    let targets = resolver::resolve(config.host_names().as_slice(), &cli.filter_spec())?;

    let options = cli.launch_options();
    let mut launcher = options.mode.launcher();
    let summary = Orchestrator::new(&config, options, io::stdin(), io::stdout())
        .run(&targets, launcher.as_mut())?;

    if !summary.failed.is_empty() {
        warn!(
            "{} of {} hosts failed to launch: {}",
            summary.failed.len(),
            targets.len(),
            summary.failed.join(", ")
        );
    }

    Ok(())
}
