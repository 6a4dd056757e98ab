//! UTS namespace setup.
//!
//! The confined child owns its hostname; changing it here never touches
//! the host.

use nestbox_common::error::Result;

use crate::sys::Syscalls;

/// Applies the configured hostname inside the child's UTS namespace.
///
/// Does nothing when no hostname is configured, leaving the copy of the
/// host's name the namespace started with.
///
/// # Errors
///
/// Returns a hostname error if `sethostname(2)` fails.
pub fn apply_hostname<S: Syscalls>(sys: &mut S, hostname: Option<&str>) -> Result<()> {
    let Some(hostname) = hostname else {
        return Ok(());
    };
    sys.set_hostname(hostname)?;
    tracing::debug!(hostname, "container hostname applied");
    Ok(())
}
