//! System-call seam for the confinement steps.
//!
//! The confiner only talks to the kernel through [`Syscalls`]. The host
//! implementation issues the real calls; tests substitute a recorder that
//! captures the order of operations.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(test)]
pub(crate) mod recording;
#[cfg(not(target_os = "linux"))]
mod unsupported;

use std::convert::Infallible;
use std::path::Path;

use nestbox_common::error::Result;
use nestbox_common::types::Invocation;

#[cfg(target_os = "linux")]
pub use linux::HostSyscalls;
#[cfg(not(target_os = "linux"))]
pub use unsupported::HostSyscalls;

/// Kernel operations performed by the confine phase.
///
/// Each method maps its OS error onto the matching
/// [`NestboxError`](nestbox_common::error::NestboxError) variant.
pub trait Syscalls {
    /// Sets the hostname of the current UTS namespace.
    ///
    /// # Errors
    ///
    /// Returns a hostname error if `sethostname(2)` fails.
    fn set_hostname(&mut self, hostname: &str) -> Result<()>;

    /// Marks every mount below `/` as private so later mounts do not
    /// propagate back to the host.
    ///
    /// # Errors
    ///
    /// Returns a mount error if the propagation change is rejected.
    fn make_mounts_private(&mut self) -> Result<()>;

    /// Changes the root directory of the calling process.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if `chroot(2)` fails.
    fn chroot(&mut self, root: &Path) -> Result<()>;

    /// Changes the working directory of the calling process.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if `chdir(2)` fails.
    fn chdir(&mut self, dir: &Path) -> Result<()>;

    /// Mounts a fresh process-information filesystem at `target`.
    ///
    /// # Errors
    ///
    /// Returns a mount error if `mount(2)` fails.
    fn mount_proc(&mut self, target: &Path) -> Result<()>;

    /// Replaces the current process image with the invocation's program.
    ///
    /// Only returns on failure.
    ///
    /// # Errors
    ///
    /// Returns a target-execution error describing why `execvp(3)` failed.
    fn exec(&mut self, invocation: &Invocation) -> Result<Infallible>;
}
