//! Bootstrap configuration shared by the launcher and confiner phases.

use std::path::PathBuf;

use crate::constants::{ENV_HOSTNAME, ENV_PRIVATE_MOUNTS, ENV_ROOTFS, HOSTNAME_MAX_LEN};
use crate::error::{NestboxError, Result};

/// Configuration for a single bootstrap run.
///
/// The root filesystem path has no default; it is always supplied by the
/// caller, either on the command line or through [`ENV_ROOTFS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestboxConfig {
    /// Host directory that becomes `/` for the confined process.
    pub rootfs: PathBuf,
    /// Hostname applied inside the private UTS namespace.
    pub hostname: Option<String>,
    /// Whether to also request a private mount namespace.
    pub private_mounts: bool,
}

impl NestboxConfig {
    /// Creates a configuration rooted at `rootfs` with no hostname and
    /// shared mounts.
    #[must_use]
    pub fn new(rootfs: impl Into<PathBuf>) -> Self {
        Self {
            rootfs: rootfs.into(),
            hostname: None,
            private_mounts: false,
        }
    }

    /// Sets the container hostname.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Enables or disables the private mount namespace.
    #[must_use]
    pub const fn with_private_mounts(mut self, private_mounts: bool) -> Self {
        self.private_mounts = private_mounts;
        self
    }

    /// Checks the values that can be rejected without touching the system.
    ///
    /// Existence of the root directory is checked separately when the root
    /// is bound, so a missing directory reports as a filesystem error.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the root path is empty or the
    /// hostname is empty, too long, or contains `/` or NUL.
    pub fn validate(&self) -> Result<()> {
        if self.rootfs.as_os_str().is_empty() {
            return Err(NestboxError::Config {
                message: "root filesystem path is empty".into(),
            });
        }
        if let Some(hostname) = &self.hostname {
            validate_hostname(hostname)?;
        }
        Ok(())
    }

    /// Returns the environment entries that carry this configuration into
    /// the re-executed confiner.
    ///
    /// Only set values are emitted; the caller is expected to drop any
    /// inherited `NESTBOX_*` entries first.
    #[must_use]
    pub fn to_env(&self) -> Vec<(&'static str, String)> {
        let mut env = vec![(ENV_ROOTFS, self.rootfs.to_string_lossy().into_owned())];
        if let Some(hostname) = &self.hostname {
            env.push((ENV_HOSTNAME, hostname.clone()));
        }
        if self.private_mounts {
            env.push((ENV_PRIVATE_MOUNTS, "true".to_string()));
        }
        env
    }

    /// Names of every environment variable [`Self::to_env`] may produce.
    #[must_use]
    pub const fn env_keys() -> [&'static str; 3] {
        [ENV_ROOTFS, ENV_HOSTNAME, ENV_PRIVATE_MOUNTS]
    }
}

fn validate_hostname(hostname: &str) -> Result<()> {
    let problem = if hostname.is_empty() {
        Some("hostname is empty")
    } else if hostname.len() > HOSTNAME_MAX_LEN {
        Some("hostname is longer than 64 bytes")
    } else if hostname.contains(['/', '\0']) {
        Some("hostname contains '/' or NUL")
    } else {
        None
    };
    match problem {
        Some(reason) => Err(NestboxError::Config {
            message: format!("{reason}: {hostname:?}"),
        }),
        None => Ok(()),
    }
}
