//! # nestbox
//!
//! Runs a program inside new PID and UTS namespaces with its filesystem
//! root confined to a prepared directory.
//!
//! ```text
//! nestbox --rootfs <DIR> launch <program> [args...]
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

mod commands;

use std::process::ExitCode;

use clap::Parser;
use nestbox_common::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

fn main() -> anyhow::Result<ExitCode> {
    init_tracing()?;

    let cli = Cli::parse();
    Ok(commands::execute(cli))
}

/// Logs go to stderr so the target program owns stdout.
fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}
