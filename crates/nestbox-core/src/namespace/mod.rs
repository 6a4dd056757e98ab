//! Linux namespace selection for the confined child.
//!
//! Namespaces are requested as `clone(2)` flags when the child is created;
//! they cannot be applied to an existing process after the fact.

pub mod uts;

use nestbox_common::config::NestboxConfig;

/// Which isolation domains the confined child gets privately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceSet {
    /// Isolate process IDs; the child becomes PID 1.
    pub pid: bool,
    /// Isolate hostname and domain name.
    pub uts: bool,
    /// Isolate the mount table.
    pub mount: bool,
}

impl Default for NamespaceSet {
    fn default() -> Self {
        Self {
            pid: true,
            uts: true,
            mount: false,
        }
    }
}

impl NamespaceSet {
    /// Derives the namespace set for a bootstrap run.
    #[must_use]
    pub fn for_config(config: &NestboxConfig) -> Self {
        Self {
            mount: config.private_mounts,
            ..Self::default()
        }
    }

    /// Converts the set into `clone(2)` flags.
    #[cfg(target_os = "linux")]
    #[must_use]
    pub fn clone_flags(self) -> nix::sched::CloneFlags {
        use nix::sched::CloneFlags;

        let mut flags = CloneFlags::empty();
        if self.pid {
            flags |= CloneFlags::CLONE_NEWPID;
        }
        if self.uts {
            flags |= CloneFlags::CLONE_NEWUTS;
        }
        if self.mount {
            flags |= CloneFlags::CLONE_NEWNS;
        }
        flags
    }
}
