//! Re-rooting the confined process with `chroot(2)`.
//!
//! `chroot` alone leaves the working directory outside the new root, which
//! lets relative paths walk back out. Entering a root therefore always
//! pairs `chroot(root)` with `chdir("/")`, and only that pair produces a
//! [`ConfinedRoot`].

use std::io;
use std::path::{Path, PathBuf};

use nestbox_common::constants::CONFINED_WORKDIR;
use nestbox_common::error::{NestboxError, Result};

use crate::sys::Syscalls;

/// A host directory checked to be usable as a new root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootBinding {
    path: PathBuf,
}

impl RootBinding {
    /// Binds `path` as the future root after checking it is a directory.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the path does not exist, cannot be
    /// inspected, or is not a directory.
    pub fn new(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| NestboxError::Filesystem {
            step: "stat",
            path: path.to_path_buf(),
            source: e,
        })?;
        if !meta.is_dir() {
            return Err(NestboxError::Filesystem {
                step: "stat",
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotADirectory),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Returns the host path of the root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Changes the process root to this directory, then moves the working
    /// directory to the new `/`.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if either `chroot(2)` or `chdir(2)`
    /// fails. No attempt is made to undo a successful `chroot`.
    pub fn enter<S: Syscalls>(self, sys: &mut S) -> Result<ConfinedRoot> {
        sys.chroot(&self.path)?;
        sys.chdir(Path::new(CONFINED_WORKDIR))?;
        tracing::info!(root = %self.path.display(), "entered confined root");
        Ok(ConfinedRoot {
            host_path: self.path,
        })
    }
}

/// Evidence that the calling process has been re-rooted and sits at `/`.
///
/// Paths built through [`ConfinedRoot::resolve`] are only meaningful after
/// the switch, which is why mounting inside the root requires one.
#[derive(Debug)]
pub struct ConfinedRoot {
    host_path: PathBuf,
}

impl ConfinedRoot {
    /// Returns the host path the root was bound from.
    #[must_use]
    pub fn host_path(&self) -> &Path {
        &self.host_path
    }

    /// Resolves `path` inside the confined view.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        Path::new(CONFINED_WORKDIR).join(path.trim_start_matches('/'))
    }
}
