//! Filesystem confinement for the confine phase.
//!
//! Re-roots the process into the prepared directory and mounts the
//! process-information filesystem inside it.

pub mod mount;
pub mod root;
