//! The two lifecycle phases of the nestbox binary.
//!
//! Namespace flags only apply when a process is created, so entering the
//! container means re-executing this binary. The phase selector is the
//! first argument of every invocation and is the only contract between the
//! launcher and its re-executed image.

use std::fmt;

/// Lifecycle phase selected by the first command-line argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// User-facing entry point: create namespaces and re-execute.
    Launch,
    /// Internal re-execution target: re-root, mount `/proc`, exec.
    Confine,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Self; 2] = [Self::Launch, Self::Confine];

    /// Returns the stable selector string for this phase.
    #[must_use]
    pub const fn selector(self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Confine => "confine",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}
