//! `nestbox confine`: internal re-execution target of `launch`.
//!
//! Not meant to be typed by a user, but its argument shape is a stable
//! contract with the launcher.

use std::process::ExitCode;

use clap::Args;
use nestbox_common::config::NestboxConfig;
use nestbox_common::error::Result;
use nestbox_common::types::Invocation;
use nestbox_core::confiner;
use nestbox_core::sys::HostSyscalls;

/// Arguments for the `confine` command.
#[derive(Args, Debug)]
pub struct ConfineArgs {
    /// Program to exec once confined, followed by its arguments.
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "PROGRAM"
    )]
    pub command: Vec<String>,
}

/// Executes the `confine` command.
///
/// On success the process image is replaced by the target and this
/// function never returns.
///
/// # Errors
///
/// Returns the error of the first confinement step that fails.
pub fn execute(config: &NestboxConfig, args: ConfineArgs) -> Result<ExitCode> {
    let invocation = Invocation::new(args.command)?;
    let mut sys = HostSyscalls::new();
    let never = confiner::confine_and_exec(&mut sys, config, &invocation)?;
    match never {}
}
