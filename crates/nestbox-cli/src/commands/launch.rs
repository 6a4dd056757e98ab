//! `nestbox launch`: start the full bootstrap.

use std::process::ExitCode;

use clap::Args;
use nestbox_common::config::NestboxConfig;
use nestbox_common::error::Result;
use nestbox_common::types::Invocation;
use nestbox_core::launcher;

/// Arguments for the `launch` command.
#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Program to run inside the container, followed by its arguments.
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "PROGRAM"
    )]
    pub command: Vec<String>,
}

/// Executes the `launch` command.
///
/// The exit code is the target's own status, or `128 + signal` if it was
/// killed.
///
/// # Errors
///
/// Returns an error if the configuration is unusable or the confined
/// child cannot be created or awaited.
pub fn execute(config: &NestboxConfig, args: LaunchArgs) -> Result<ExitCode> {
    let invocation = Invocation::new(args.command)?;
    let outcome = launcher::launch(config, &invocation)?;
    Ok(ExitCode::from(outcome.exit_code()))
}
