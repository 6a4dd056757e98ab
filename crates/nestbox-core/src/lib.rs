//! # nestbox-core
//!
//! Linux isolation primitives and the two-phase bootstrap that turns an
//! ordinary host process into a confined one.
//!
//! - **Launcher** ([`launcher`]): clones a child into fresh PID and UTS
//!   namespaces that re-executes this binary in the confine phase.
//! - **Confiner** ([`confiner`]): re-roots into the prepared directory,
//!   mounts `/proc`, and replaces itself with the target program.
//!
//! Every system call goes through the [`sys::Syscalls`] seam so the step
//! ordering can be exercised without privileges. All unsafe calls are
//! encapsulated in safe wrappers with `// SAFETY:` documentation.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod confiner;
pub mod filesystem;
pub mod launcher;
pub mod namespace;
pub mod phase;
pub mod sys;
