//! Stub [`Syscalls`] for non-Linux platforms.
//!
//! Namespaces, `chroot`-based confinement, and procfs are Linux kernel
//! features; every call fails with a configuration error.

use std::convert::Infallible;
use std::path::Path;

use nestbox_common::error::{NestboxError, Result};
use nestbox_common::types::Invocation;

use super::Syscalls;

/// Host backend that rejects every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSyscalls;

impl HostSyscalls {
    /// Creates the host system-call backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn unsupported<T>() -> Result<T> {
    Err(NestboxError::Config {
        message: "Linux required for native container operations".into(),
    })
}

impl Syscalls for HostSyscalls {
    fn set_hostname(&mut self, _hostname: &str) -> Result<()> {
        unsupported()
    }

    fn make_mounts_private(&mut self) -> Result<()> {
        unsupported()
    }

    fn chroot(&mut self, _root: &Path) -> Result<()> {
        unsupported()
    }

    fn chdir(&mut self, _dir: &Path) -> Result<()> {
        unsupported()
    }

    fn mount_proc(&mut self, _target: &Path) -> Result<()> {
        unsupported()
    }

    fn exec(&mut self, _invocation: &Invocation) -> Result<Infallible> {
        unsupported()
    }
}
