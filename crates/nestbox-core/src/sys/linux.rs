//! Host implementation of [`Syscalls`] backed by `nix`.

use std::convert::Infallible;
use std::ffi::CString;
use std::path::Path;

use nestbox_common::constants::PROC_FS_TYPE;
use nestbox_common::error::{NestboxError, Result};
use nestbox_common::types::Invocation;
use nix::errno::Errno;
use nix::mount::{MsFlags, mount};

use super::Syscalls;

/// Issues the confinement system calls against the running kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSyscalls;

impl HostSyscalls {
    /// Creates the host system-call backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Syscalls for HostSyscalls {
    fn set_hostname(&mut self, hostname: &str) -> Result<()> {
        nix::unistd::sethostname(hostname).map_err(|e| NestboxError::Hostname {
            hostname: hostname.to_string(),
            source: e.into(),
        })?;
        tracing::debug!(hostname, "hostname set");
        Ok(())
    }

    fn make_mounts_private(&mut self) -> Result<()> {
        mount(
            None::<&str>,
            "/",
            None::<&str>,
            MsFlags::MS_REC | MsFlags::MS_PRIVATE,
            None::<&str>,
        )
        .map_err(|e| NestboxError::Mount {
            target: "/".into(),
            source: e.into(),
        })?;
        tracing::debug!("mount propagation set to private");
        Ok(())
    }

    fn chroot(&mut self, root: &Path) -> Result<()> {
        nix::unistd::chroot(root).map_err(|e| NestboxError::Filesystem {
            step: "chroot",
            path: root.to_path_buf(),
            source: e.into(),
        })?;
        tracing::debug!(root = %root.display(), "chroot done");
        Ok(())
    }

    fn chdir(&mut self, dir: &Path) -> Result<()> {
        nix::unistd::chdir(dir).map_err(|e| NestboxError::Filesystem {
            step: "chdir",
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        tracing::debug!(dir = %dir.display(), "chdir done");
        Ok(())
    }

    fn mount_proc(&mut self, target: &Path) -> Result<()> {
        mount(
            Some(PROC_FS_TYPE),
            target,
            Some(PROC_FS_TYPE),
            MsFlags::MS_NOSUID | MsFlags::MS_NODEV | MsFlags::MS_NOEXEC,
            None::<&str>,
        )
        .map_err(|e| NestboxError::Mount {
            target: target.to_path_buf(),
            source: e.into(),
        })?;
        tracing::debug!(target = %target.display(), "proc mounted");
        Ok(())
    }

    fn exec(&mut self, invocation: &Invocation) -> Result<Infallible> {
        let argv = invocation
            .tokens()
            .iter()
            .map(|t| CString::new(t.as_bytes()))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| NestboxError::Usage {
                message: format!("argument contains a NUL byte: {e}"),
            })?;
        let program = &argv[0];

        tracing::info!(%invocation, "executing target");
        match nix::unistd::execvp(program, &argv) {
            Ok(never) => match never {},
            Err(errno) => Err(exec_error(invocation.program(), errno)),
        }
    }
}

/// Classifies an `execvp(3)` failure the way a shell would.
fn exec_error(program: &str, errno: Errno) -> NestboxError {
    let program = program.to_string();
    match errno {
        Errno::ENOENT | Errno::ENOTDIR => NestboxError::TargetNotFound { program },
        Errno::EACCES | Errno::EPERM | Errno::ENOEXEC => NestboxError::TargetNotExecutable {
            program,
            source: errno.into(),
        },
        _ => NestboxError::TargetExec {
            program,
            source: errno.into(),
        },
    }
}
