//! CLI command definitions and phase dispatch.
//!
//! The first positional argument selects the lifecycle phase. `launch` is
//! the public entry point; `confine` is the hidden target the launcher
//! re-executes into. Anything else is rejected by the parser with a usage
//! error before any process, namespace, or mount is touched.
//!
//! The root, hostname, and mount options are global, so they may appear on
//! either side of the selector but never inside the target's arguments.

pub mod confine;
pub mod launch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nestbox_common::config::NestboxConfig;
use nestbox_common::constants::{APP_NAME, ENV_HOSTNAME, ENV_PRIVATE_MOUNTS, ENV_ROOTFS};
use nestbox_common::error::NestboxError;
use nestbox_core::phase::Phase;

/// nestbox: run a program in new PID and UTS namespaces under a confined root.
#[derive(Parser, Debug)]
#[command(name = "nestbox", version, about, long_about = None)]
pub struct Cli {
    /// Lifecycle phase to run.
    #[command(subcommand)]
    pub command: Command,

    /// Directory that becomes `/` inside the container (required).
    #[arg(long, global = true, env = ENV_ROOTFS, value_name = "DIR")]
    pub rootfs: Option<PathBuf>,

    /// Hostname inside the container's UTS namespace.
    #[arg(long, global = true, env = ENV_HOSTNAME, value_name = "NAME")]
    pub hostname: Option<String>,

    /// Also give the container a private mount namespace.
    #[arg(long, global = true, env = ENV_PRIVATE_MOUNTS)]
    pub private_mounts: bool,
}

impl Cli {
    /// Builds the bootstrap configuration from the parsed options.
    ///
    /// clap cannot mark a global option as required, so the root is
    /// checked here.
    ///
    /// # Errors
    ///
    /// Returns a usage error if no root directory was given.
    pub fn config(&self) -> Result<NestboxConfig, NestboxError> {
        let rootfs = self.rootfs.clone().ok_or_else(|| NestboxError::Usage {
            message: format!(
                "the root directory is required: pass --rootfs <DIR> or set {ENV_ROOTFS}"
            ),
        })?;
        let config = NestboxConfig::new(rootfs).with_private_mounts(self.private_mounts);
        Ok(match &self.hostname {
            Some(hostname) => config.with_hostname(hostname.clone()),
            None => config,
        })
    }
}

/// Lifecycle phases, selected by the first positional argument.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a program inside new PID and UTS namespaces under the root.
    Launch(launch::LaunchArgs),
    /// Confine this process and exec the program (internal re-exec target).
    #[command(hide = true)]
    Confine(confine::ConfineArgs),
}

impl Command {
    /// Returns the lifecycle phase this command runs.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Launch(_) => Phase::Launch,
            Self::Confine(_) => Phase::Confine,
        }
    }
}

/// Dispatches the parsed command to its phase and maps the outcome to the
/// process exit status.
pub fn execute(cli: Cli) -> ExitCode {
    let phase = cli.command.phase();
    let result = cli.config().and_then(|config| match cli.command {
        Command::Launch(args) => launch::execute(&config, args),
        Command::Confine(args) => confine::execute(&config, args),
    });
    result.unwrap_or_else(|err| report(phase, &err))
}

#[allow(clippy::print_stderr)]
fn report(phase: Phase, err: &NestboxError) -> ExitCode {
    tracing::debug!(error = ?err, kind = ?err.kind(), %phase, "bootstrap failed");
    eprintln!("{APP_NAME} {phase}: {err}");
    ExitCode::from(err.exit_code())
}
