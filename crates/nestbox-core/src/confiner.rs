//! Confine phase: runs inside the namespaces the launcher created.
//!
//! Steps, each a hard precondition for the next:
//!
//! 1. (optional) private mount propagation and container hostname;
//! 2. `chroot` into the root directory;
//! 3. `chdir("/")`;
//! 4. mount `proc` at `/proc` inside the new root;
//! 5. `execvp` the target, which inherits this process's PID (1) and
//!    standard streams.
//!
//! The first failure ends the phase. Nothing already applied is rolled
//! back; the kernel reclaims it when the process exits.

use std::convert::Infallible;

use nestbox_common::config::NestboxConfig;
use nestbox_common::error::Result;
use nestbox_common::types::Invocation;

use crate::filesystem::mount;
use crate::filesystem::root::RootBinding;
use crate::namespace::uts;
use crate::sys::Syscalls;

/// Confines the calling process and replaces it with the target program.
///
/// Returns only on failure.
///
/// # Errors
///
/// Returns the error of the first step that fails: a configuration or
/// filesystem error before any system call is made, then hostname,
/// filesystem, mount, or target-execution errors in step order.
pub fn confine_and_exec<S: Syscalls>(
    sys: &mut S,
    config: &NestboxConfig,
    invocation: &Invocation,
) -> Result<Infallible> {
    config.validate()?;
    let root = RootBinding::new(&config.rootfs)?;
    tracing::info!(
        root = %root.path().display(),
        pid = std::process::id(),
        %invocation,
        "confine phase started"
    );

    if config.private_mounts {
        mount::make_private(sys)?;
    }
    uts::apply_hostname(sys, config.hostname.as_deref())?;

    let confined = root.enter(sys)?;
    mount::mount_proc(sys, &confined)?;

    sys.exec(invocation)
}
