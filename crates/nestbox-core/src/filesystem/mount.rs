//! Mount utilities for the confined filesystem view.
//!
//! Handles the `/proc` mount inside the new root and the optional switch
//! to private mount propagation.
//!
//! Nothing here unmounts. Without a private mount namespace, overlapping
//! containers on one root stack their `/proc` mounts on the same host path,
//! and no launcher can tell which one is its own.

use nestbox_common::constants::PROC_MOUNT_POINT;
use nestbox_common::error::Result;

use super::root::ConfinedRoot;
use crate::sys::Syscalls;

/// Mounts the process-information filesystem at `/proc` inside the
/// confined root.
///
/// The mount point must already exist in the root image.
///
/// # Errors
///
/// Returns a mount error if `mount(2)` fails.
pub fn mount_proc<S: Syscalls>(sys: &mut S, root: &ConfinedRoot) -> Result<()> {
    let target = root.resolve(PROC_MOUNT_POINT);
    sys.mount_proc(&target)?;
    tracing::info!(
        target = %target.display(),
        root = %root.host_path().display(),
        "proc mounted in confined root"
    );
    Ok(())
}

/// Stops mounts made by this process from propagating to the host.
///
/// Only meaningful inside a private mount namespace.
///
/// # Errors
///
/// Returns a mount error if the propagation change is rejected.
pub fn make_private<S: Syscalls>(sys: &mut S) -> Result<()> {
    sys.make_mounts_private()
}
