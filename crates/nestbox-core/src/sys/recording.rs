//! Recording [`Syscalls`] double used by unit tests.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use nestbox_common::error::{NestboxError, Result};
use nestbox_common::types::Invocation;

use super::Syscalls;

/// One recorded system call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetHostname(String),
    MakeMountsPrivate,
    Chroot(PathBuf),
    Chdir(PathBuf),
    MountProc(PathBuf),
    Exec(Vec<String>),
}

/// Step at which the recorder should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    SetHostname,
    MakeMountsPrivate,
    Chroot,
    Chdir,
    MountProc,
}

/// Records every call; `exec` always fails with "not found" because the
/// recorder cannot replace the test process.
#[derive(Debug, Default)]
pub struct RecordingSyscalls {
    pub calls: Vec<Call>,
    pub fail_at: Option<FailAt>,
}

impl RecordingSyscalls {
    pub fn failing_at(step: FailAt) -> Self {
        Self {
            calls: Vec::new(),
            fail_at: Some(step),
        }
    }

    fn should_fail(&self, step: FailAt) -> bool {
        self.fail_at == Some(step)
    }
}

fn eperm() -> std::io::Error {
    std::io::Error::from_raw_os_error(libc::EPERM)
}

impl Syscalls for RecordingSyscalls {
    fn set_hostname(&mut self, hostname: &str) -> Result<()> {
        self.calls.push(Call::SetHostname(hostname.to_string()));
        if self.should_fail(FailAt::SetHostname) {
            return Err(NestboxError::Hostname {
                hostname: hostname.to_string(),
                source: eperm(),
            });
        }
        Ok(())
    }

    fn make_mounts_private(&mut self) -> Result<()> {
        self.calls.push(Call::MakeMountsPrivate);
        if self.should_fail(FailAt::MakeMountsPrivate) {
            return Err(NestboxError::Mount {
                target: "/".into(),
                source: eperm(),
            });
        }
        Ok(())
    }

    fn chroot(&mut self, root: &Path) -> Result<()> {
        self.calls.push(Call::Chroot(root.to_path_buf()));
        if self.should_fail(FailAt::Chroot) {
            return Err(NestboxError::Filesystem {
                step: "chroot",
                path: root.to_path_buf(),
                source: eperm(),
            });
        }
        Ok(())
    }

    fn chdir(&mut self, dir: &Path) -> Result<()> {
        self.calls.push(Call::Chdir(dir.to_path_buf()));
        if self.should_fail(FailAt::Chdir) {
            return Err(NestboxError::Filesystem {
                step: "chdir",
                path: dir.to_path_buf(),
                source: eperm(),
            });
        }
        Ok(())
    }

    fn mount_proc(&mut self, target: &Path) -> Result<()> {
        self.calls.push(Call::MountProc(target.to_path_buf()));
        if self.should_fail(FailAt::MountProc) {
            return Err(NestboxError::Mount {
                target: target.to_path_buf(),
                source: std::io::Error::from_raw_os_error(libc::ENOENT),
            });
        }
        Ok(())
    }

    fn exec(&mut self, invocation: &Invocation) -> Result<Infallible> {
        self.calls.push(Call::Exec(invocation.tokens().to_vec()));
        Err(NestboxError::TargetNotFound {
            program: invocation.program().to_string(),
        })
    }
}
