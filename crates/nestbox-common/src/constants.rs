//! System-wide constants, well-known paths, and exit statuses.

/// Application name used in diagnostics.
pub const APP_NAME: &str = "nestbox";

/// Binary name for the CLI. Also used as `argv[0]` of the re-executed image.
pub const BIN_NAME: &str = "nestbox";

/// Path through which a process can re-execute its own image.
pub const SELF_EXE: &str = "/proc/self/exe";

/// Mount point of the process-information filesystem inside the new root.
pub const PROC_MOUNT_POINT: &str = "/proc";

/// Source and filesystem type of the process-information mount.
pub const PROC_FS_TYPE: &str = "proc";

/// Directory the confined process changes into after re-rooting.
pub const CONFINED_WORKDIR: &str = "/";

/// Environment variable holding the root filesystem directory.
pub const ENV_ROOTFS: &str = "NESTBOX_ROOTFS";

/// Environment variable holding the container hostname.
pub const ENV_HOSTNAME: &str = "NESTBOX_HOSTNAME";

/// Environment variable requesting a private mount namespace.
pub const ENV_PRIVATE_MOUNTS: &str = "NESTBOX_PRIVATE_MOUNTS";

/// Environment variable holding the log filter directive.
pub const ENV_LOG: &str = "NESTBOX_LOG";

/// Log filter used when neither `NESTBOX_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Maximum hostname length accepted by `sethostname(2)` on Linux.
pub const HOSTNAME_MAX_LEN: usize = 64;

/// Stack size handed to `clone(2)` for the confined child.
pub const CHILD_STACK_SIZE: usize = 1024 * 1024;

/// Exit status for command-line usage errors.
pub const EXIT_USAGE: u8 = 2;

/// Exit status when any bootstrap step fails before the target runs.
pub const EXIT_BOOTSTRAP_FAILURE: u8 = 125;

/// Exit status when the target exists but cannot be executed.
pub const EXIT_TARGET_NOT_EXECUTABLE: u8 = 126;

/// Exit status when the target cannot be found inside the root.
pub const EXIT_TARGET_NOT_FOUND: u8 = 127;

/// Base added to a signal number when a process is killed by it.
pub const SIGNAL_EXIT_BASE: i32 = 128;
