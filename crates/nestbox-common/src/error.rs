//! Unified error type for the nestbox bootstrap chain.
//!
//! Every variant is terminal: the bootstrap performs a short, strictly
//! ordered sequence of irreversible steps, so each error carries enough
//! context to name the step that failed and maps to a fixed exit status.

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{
    EXIT_BOOTSTRAP_FAILURE, EXIT_TARGET_NOT_EXECUTABLE, EXIT_TARGET_NOT_FOUND, EXIT_USAGE,
};

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum NestboxError {
    /// The command line could not be interpreted.
    #[error("usage error: {message}")]
    Usage {
        /// Description of the malformed input.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The confined child process could not be created or awaited.
    #[error("{step} failed: {source}")]
    Spawn {
        /// Process-creation step that failed (`clone`, `waitpid`, ...).
        step: &'static str,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Re-rooting the filesystem view failed.
    #[error("{step} to {path} failed: {source}")]
    Filesystem {
        /// Filesystem step that failed (`stat`, `chroot`, `chdir`).
        step: &'static str,
        /// Path the step operated on.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A mount operation failed.
    #[error("mount at {target} failed: {source}")]
    Mount {
        /// Mount point of the failed operation.
        target: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Setting the container hostname failed.
    #[error("sethostname({hostname}) failed: {source}")]
    Hostname {
        /// Hostname that was rejected.
        hostname: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The target program does not exist inside the confined root.
    #[error("{program}: command not found inside the container root")]
    TargetNotFound {
        /// Program as given on the command line.
        program: String,
    },

    /// The target program exists but cannot be executed.
    #[error("{program}: cannot execute: {source}")]
    TargetNotExecutable {
        /// Program as given on the command line.
        program: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Executing the target program failed for another reason.
    #[error("exec {program} failed: {source}")]
    TargetExec {
        /// Program as given on the command line.
        program: String,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

/// Coarse classification of a [`NestboxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized or missing phase selector, empty invocation.
    Usage,
    /// Invalid configuration value.
    Config,
    /// Namespace creation denied or re-execution image not runnable.
    ProcessCreation,
    /// Root directory missing, inaccessible, or not enterable.
    Filesystem,
    /// Process-information mount (or mount propagation change) failed.
    Mount,
    /// Hostname could not be applied inside the UTS namespace.
    Hostname,
    /// Target program could not be started inside the confined root.
    TargetExecution,
}

impl NestboxError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage { .. } => ErrorKind::Usage,
            Self::Config { .. } => ErrorKind::Config,
            Self::Spawn { .. } => ErrorKind::ProcessCreation,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Mount { .. } => ErrorKind::Mount,
            Self::Hostname { .. } => ErrorKind::Hostname,
            Self::TargetNotFound { .. }
            | Self::TargetNotExecutable { .. }
            | Self::TargetExec { .. } => ErrorKind::TargetExecution,
        }
    }

    /// Returns the process exit status reported for this error.
    ///
    /// Target failures use the shell conventions (126, 127) so they read
    /// as the target's own failure; every other bootstrap failure is 125.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Usage { .. } => EXIT_USAGE,
            Self::TargetNotFound { .. } => EXIT_TARGET_NOT_FOUND,
            Self::TargetNotExecutable { .. } => EXIT_TARGET_NOT_EXECUTABLE,
            _ => EXIT_BOOTSTRAP_FAILURE,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, NestboxError>;
