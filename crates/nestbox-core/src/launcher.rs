//! Launch phase: creates the confined child and waits for it.
//!
//! The child is created with `clone(2)` so the namespace flags apply to it
//! from its first instruction, then immediately re-executes this binary
//! (`/proc/self/exe`) in the confine phase. Standard streams are inherited
//! through the clone and the exec untouched.
//!
//! The child asks the kernel for `SIGKILL` when the launcher dies, so a
//! killed launcher never leaves the container running. The request
//! survives both execs.

use std::ffi::{CStr, CString, OsString};
use std::os::unix::ffi::OsStrExt;

use nestbox_common::config::NestboxConfig;
use nestbox_common::constants::{BIN_NAME, EXIT_BOOTSTRAP_FAILURE, SELF_EXE, SIGNAL_EXIT_BASE};
use nestbox_common::error::{NestboxError, Result};
use nestbox_common::types::Invocation;

use crate::filesystem::root::RootBinding;
use crate::namespace::NamespaceSet;
use crate::phase::Phase;

/// How the confined child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The child exited with this status.
    Exited(i32),
    /// The child was killed by this signal number.
    Signaled(i32),
}

impl ExitOutcome {
    /// Returns the shell-style status: the exit code, or `128 + signal`.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signo) => SIGNAL_EXIT_BASE + signo,
        }
    }

    /// Returns the status as a process exit code.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        u8::try_from(self.code()).unwrap_or(EXIT_BOOTSTRAP_FAILURE)
    }

    /// Interprets a `waitpid(2)` result, ignoring non-terminal states.
    #[cfg(target_os = "linux")]
    #[must_use]
    pub fn from_wait_status(status: nix::sys::wait::WaitStatus) -> Option<Self> {
        use nix::sys::wait::WaitStatus;

        match status {
            WaitStatus::Exited(_, code) => Some(Self::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Self::Signaled(signal as i32)),
            _ => None,
        }
    }
}

/// The re-execution of this binary that runs in the confine phase.
///
/// `argv` is `nestbox confine <program> [args...]`; the configuration
/// travels in `NESTBOX_*` environment variables so the argument vector is
/// exactly the phase selector followed by the original invocation.
#[derive(Debug, Clone)]
pub struct ReExec {
    image: CString,
    argv: Vec<CString>,
    envp: Vec<CString>,
}

impl ReExec {
    /// Builds the confine-phase re-execution from the current environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument or environment entry contains a
    /// NUL byte.
    pub fn confine(config: &NestboxConfig, invocation: &Invocation) -> Result<Self> {
        Self::confine_with_env(config, invocation, std::env::vars_os())
    }

    /// Builds the confine-phase re-execution on top of `base_env`.
    ///
    /// Inherited `NESTBOX_*` configuration entries are replaced by the
    /// values from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if any argument or environment entry contains a
    /// NUL byte.
    pub fn confine_with_env<I>(
        config: &NestboxConfig,
        invocation: &Invocation,
        base_env: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let image = c_string(SELF_EXE.as_bytes().to_vec())?;

        let mut argv = Vec::with_capacity(invocation.tokens().len() + 2);
        argv.push(c_string(BIN_NAME.as_bytes().to_vec())?);
        argv.push(c_string(Phase::Confine.selector().as_bytes().to_vec())?);
        for token in invocation.tokens() {
            argv.push(c_string(token.as_bytes().to_vec())?);
        }

        let overridden = NestboxConfig::env_keys();
        let mut envp = Vec::new();
        for (key, value) in base_env {
            if overridden.iter().any(|k| key.as_bytes() == k.as_bytes()) {
                continue;
            }
            envp.push(env_entry(key.as_bytes(), value.as_bytes())?);
        }
        for (key, value) in config.to_env() {
            envp.push(env_entry(key.as_bytes(), value.as_bytes())?);
        }

        Ok(Self { image, argv, envp })
    }

    /// Path of the image to execute.
    #[must_use]
    pub fn image(&self) -> &CStr {
        &self.image
    }

    /// Argument vector, `argv[0]` first.
    #[must_use]
    pub fn argv(&self) -> &[CString] {
        &self.argv
    }

    /// `KEY=VALUE` environment entries.
    #[must_use]
    pub fn envp(&self) -> &[CString] {
        &self.envp
    }
}

fn c_string(bytes: Vec<u8>) -> Result<CString> {
    CString::new(bytes).map_err(|e| NestboxError::Config {
        message: format!("value contains a NUL byte at offset {}", e.nul_position()),
    })
}

fn env_entry(key: &[u8], value: &[u8]) -> Result<CString> {
    let mut entry = Vec::with_capacity(key.len() + value.len() + 1);
    entry.extend_from_slice(key);
    entry.push(b'=');
    entry.extend_from_slice(value);
    c_string(entry)
}

/// Runs `invocation` inside a new confined child and waits for it.
///
/// The root directory is checked before any process is created, so a
/// missing root fails without side effects. The `/proc` mount the child
/// makes is left alone: inside a private mount namespace the kernel drops
/// it with the namespace, and on the shared mount table it may be stacked
/// with the mounts of other containers still running on the same root.
///
/// # Errors
///
/// Returns a configuration or filesystem error for an unusable
/// configuration, or a spawn error if `clone(2)` or `waitpid(2)` fails.
/// Failures inside the child are reported through its exit status.
pub fn launch(config: &NestboxConfig, invocation: &Invocation) -> Result<ExitOutcome> {
    config.validate()?;
    let root = RootBinding::new(&config.rootfs)?;
    let namespaces = NamespaceSet::for_config(config);
    let reexec = ReExec::confine(config, invocation)?;

    tracing::info!(
        root = %root.path().display(),
        namespaces = ?namespaces,
        %invocation,
        "launching confined child"
    );
    let outcome = run_confined(&reexec, namespaces)?;
    tracing::info!(status = outcome.code(), "confined child exited");
    Ok(outcome)
}

#[cfg(target_os = "linux")]
fn run_confined(reexec: &ReExec, namespaces: NamespaceSet) -> Result<ExitOutcome> {
    use nix::sched::clone;

    let mut stack = vec![0_u8; nestbox_common::constants::CHILD_STACK_SIZE];
    let child_main = Box::new(|| -> isize {
        if let Err(errno) = bind_to_launcher() {
            tracing::error!(%errno, "could not tie confined child to launcher");
            return isize::from(EXIT_BOOTSTRAP_FAILURE);
        }
        match nix::unistd::execve(reexec.image(), reexec.argv(), reexec.envp()) {
            Ok(never) => match never {},
            Err(errno) => {
                tracing::error!(%errno, image = ?reexec.image(), "re-exec into confine phase failed");
                isize::from(EXIT_BOOTSTRAP_FAILURE)
            }
        }
    });

    // SAFETY: without CLONE_VM the child runs on its own copy of the
    // address space and only calls execve; `stack` outlives the call.
    let child = unsafe {
        clone(
            child_main,
            &mut stack,
            namespaces.clone_flags(),
            Some(libc::SIGCHLD),
        )
    }
    .map_err(|e| NestboxError::Spawn {
        step: "clone",
        source: e.into(),
    })?;
    tracing::debug!(child = child.as_raw(), "confined child created");

    wait_for_exit(child)
}

/// Makes the kernel kill the calling process when its parent thread exits.
///
/// The setting is kept across `execve(2)` of non-setuid images, so it
/// reaches the target through the confine phase.
#[cfg(target_os = "linux")]
fn bind_to_launcher() -> nix::Result<()> {
    use nix::sys::prctl;
    use nix::sys::signal::Signal;

    prctl::set_pdeathsig(Signal::SIGKILL)
}

#[cfg(target_os = "linux")]
fn wait_for_exit(child: nix::unistd::Pid) -> Result<ExitOutcome> {
    use nix::errno::Errno;
    use nix::sys::wait::waitpid;

    loop {
        match waitpid(child, None) {
            Ok(status) => {
                if let Some(outcome) = ExitOutcome::from_wait_status(status) {
                    return Ok(outcome);
                }
            }
            Err(Errno::EINTR) => {}
            Err(e) => {
                return Err(NestboxError::Spawn {
                    step: "waitpid",
                    source: e.into(),
                });
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn run_confined(_reexec: &ReExec, _namespaces: NamespaceSet) -> Result<ExitOutcome> {
    Err(NestboxError::Config {
        message: "Linux required for native container operations".into(),
    })
}
