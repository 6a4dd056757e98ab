//! End-to-end tests for the `nestbox` binary.
//!
//! The first group needs no privileges: it covers usage errors and the
//! fail-fast paths that stop before any namespace is created.
//!
//! The second group actually creates namespaces, so it is `#[ignore]`d by
//! default. Run it as root with a prepared root filesystem (containing at
//! least `/bin/sh`, `/bin/sleep`, `ls`, `hostname`, and an empty `/proc`
//! directory). They share that root's `/proc` mount point, so run them on
//! one thread:
//!
//! ```text
//! NESTBOX_TEST_ROOTFS=/srv/alpine sudo -E cargo test -p nestbox-cli -- --ignored --test-threads=1
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const BIN: &str = env!("CARGO_BIN_EXE_nestbox");

/// A `nestbox` command with no inherited `NESTBOX_*` configuration.
fn nestbox() -> Command {
    let mut cmd = Command::new(BIN);
    for key in [
        "NESTBOX_ROOTFS",
        "NESTBOX_HOSTNAME",
        "NESTBOX_PRIVATE_MOUNTS",
        "NESTBOX_LOG",
    ] {
        let _ = cmd.env_remove(key);
    }
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run nestbox binary")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ── Dispatch ─────────────────────────────────────────────────────────

#[test]
fn unknown_phase_selector_is_usage_error() {
    let out = run(nestbox().args(["--rootfs", "/", "frobnicate", "/bin/true"]));
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("frobnicate"), "{}", stderr(&out));
}

#[test]
fn missing_phase_selector_is_usage_error() {
    let out = run(nestbox().args(["--rootfs", "/"]));
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn missing_rootfs_option_is_usage_error() {
    let out = run(nestbox().args(["launch", "/bin/true"]));
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("--rootfs"), "{}", stderr(&out));
}

#[test]
fn rootfs_can_come_from_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent");
    let out = run(nestbox()
        .env("NESTBOX_ROOTFS", &missing)
        .args(["launch", "/bin/true"]));
    // Parsed fine; fails on the missing directory instead of on usage.
    assert_eq!(out.status.code(), Some(125));
}

#[test]
fn options_are_accepted_after_the_selector() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent");
    let out = run(nestbox()
        .arg("launch")
        .arg("--rootfs")
        .arg(&missing)
        .arg("/bin/true"));
    // Parsed fine; fails on the missing directory instead of on usage.
    assert_eq!(out.status.code(), Some(125), "{}", stderr(&out));
    assert!(stderr(&out).contains(&missing.display().to_string()));
}

// ── Fail-fast bootstrap errors ───────────────────────────────────────

#[test]
fn launch_with_missing_root_fails_before_spawning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent");
    let out = run(nestbox()
        .arg("--rootfs")
        .arg(&missing)
        .args(["launch", "/bin/true"]));

    assert_eq!(out.status.code(), Some(125));
    let err = stderr(&out);
    assert!(err.contains("nestbox launch"), "{err}");
    assert!(err.contains(&missing.display().to_string()), "{err}");
}

#[test]
fn confine_with_missing_root_never_runs_target() {
    let dir = tempfile::tempdir().expect("tempdir");
    let marker = dir.path().join("ran");
    let script = format!("touch {}", marker.display());
    let out = run(nestbox()
        .arg("--rootfs")
        .arg(dir.path().join("absent"))
        .args(["confine", "/bin/sh", "-c", &script]));

    assert_eq!(out.status.code(), Some(125));
    assert!(stderr(&out).contains("nestbox confine"));
    assert!(!marker.exists(), "target program must not have started");
}

#[test]
fn root_that_is_a_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("rootfs.tar");
    std::fs::write(&file, b"archive").expect("write");
    let out = run(nestbox()
        .arg("--rootfs")
        .arg(&file)
        .args(["launch", "/bin/true"]));
    assert_eq!(out.status.code(), Some(125));
}

#[test]
fn invalid_hostname_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = run(nestbox()
        .arg("--rootfs")
        .arg(dir.path())
        .args(["--hostname", "a/b", "launch", "/bin/true"]));
    assert_eq!(out.status.code(), Some(125));
    assert!(stderr(&out).contains("hostname"), "{}", stderr(&out));
}

// ── Privileged end-to-end ────────────────────────────────────────────

fn test_rootfs() -> PathBuf {
    std::env::var_os("NESTBOX_TEST_ROOTFS")
        .map(PathBuf::from)
        .expect("set NESTBOX_TEST_ROOTFS to a prepared root filesystem")
}

fn launch_in_root(extra: &[&str], program: &[&str]) -> Output {
    let mut cmd = nestbox();
    let _ = cmd.arg("--rootfs").arg(test_rootfs()).args(extra).arg("launch");
    run(cmd.args(program))
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn target_sees_itself_as_pid_one() {
    let out = launch_in_root(&[], &["/bin/sh", "-c", "echo $$"]);
    assert_eq!(out.status.code(), Some(0), "{}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "1");
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn target_exit_status_is_propagated() {
    let out = launch_in_root(&[], &["/bin/sh", "-c", "exit 7"]);
    assert_eq!(out.status.code(), Some(7));
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn proc_reflects_only_the_container() {
    let out = launch_in_root(&[], &["/bin/sh", "-c", "ls -d /proc/[0-9]*"]);
    assert_eq!(out.status.code(), Some(0), "{}", stderr(&out));
    let pids: Vec<_> = stdout(&out).lines().map(str::to_string).collect();
    assert!(pids.contains(&"/proc/1".to_string()), "{pids:?}");
    assert!(pids.len() <= 3, "host processes leaked into /proc: {pids:?}");
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn relative_traversal_cannot_leave_the_root() {
    let host_dir = tempfile::tempdir().expect("tempdir");
    let marker = host_dir.path().join("outside-marker");
    std::fs::write(&marker, b"host only").expect("write marker");

    let escape = format!("cat ../../../../../..{}", marker.display());
    let out = launch_in_root(&[], &["/bin/sh", "-c", &escape]);
    assert_ne!(out.status.code(), Some(0));
    assert!(!stdout(&out).contains("host only"));
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn missing_target_reports_command_not_found() {
    let out = launch_in_root(&[], &["/definitely/not/here"]);
    assert_eq!(out.status.code(), Some(127));
    assert!(stderr(&out).contains("not found"), "{}", stderr(&out));
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn launches_do_not_share_hostnames() {
    let host_before = std::fs::read_to_string("/proc/sys/kernel/hostname").expect("hostname");

    let alpha = launch_in_root(&["--hostname", "alpha"], &["hostname"]);
    let beta = launch_in_root(&["--hostname", "beta"], &["hostname"]);
    assert_eq!(stdout(&alpha).trim(), "alpha");
    assert_eq!(stdout(&beta).trim(), "beta");

    let host_after = std::fs::read_to_string("/proc/sys/kernel/hostname").expect("hostname");
    assert_eq!(host_before, host_after);
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn concurrent_launches_each_get_their_own_pid_namespace() {
    let spawn = |name: &str| {
        let mut cmd = nestbox();
        let _ = cmd
            .arg("--rootfs")
            .arg(test_rootfs())
            .args(["--hostname", name, "--private-mounts", "launch"])
            .args(["/bin/sh", "-c", "sleep 1; echo $$ $(hostname)"]);
        cmd.output()
    };
    let first = std::thread::spawn(move || spawn("first"));
    let second = spawn("second").expect("second launch");
    let first = first.join().expect("join").expect("first launch");

    assert_eq!(stdout(&first).trim(), "1 first");
    assert_eq!(stdout(&second).trim(), "1 second");
}

/// Host PIDs whose command line is exactly `argv`.
fn host_pids_running(argv: &[&str]) -> Vec<u32> {
    let wanted: Vec<u8> = argv.iter().flat_map(|a| a.bytes().chain([0])).collect();
    std::fs::read_dir("/proc")
        .expect("read /proc")
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let pid = entry.file_name().to_str()?.parse::<u32>().ok()?;
            let cmdline = std::fs::read(entry.path().join("cmdline")).ok()?;
            (cmdline == wanted).then_some(pid)
        })
        .collect()
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    done()
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn overlapping_launches_on_one_root_keep_their_own_proc() {
    let short = thread::spawn(|| launch_in_root(&[], &["/bin/sh", "-c", "sleep 1"]));
    thread::sleep(Duration::from_millis(300));
    let long = launch_in_root(
        &[],
        &[
            "/bin/sh",
            "-c",
            "ls -d /proc/[0-9]* && sleep 2 && ls -d /proc/[0-9]*",
        ],
    );
    let short = short.join().expect("join");

    assert_eq!(short.status.code(), Some(0), "{}", stderr(&short));
    assert_eq!(long.status.code(), Some(0), "{}", stderr(&long));
    let listings: Vec<_> = stdout(&long)
        .lines()
        .filter(|l| *l == "/proc/1")
        .map(str::to_string)
        .collect();
    assert_eq!(listings.len(), 2, "{}", stdout(&long));
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn container_does_not_outlive_its_launcher() {
    let target = ["/bin/sleep", "4242"];
    let mut launcher = nestbox()
        .arg("--rootfs")
        .arg(test_rootfs())
        .arg("launch")
        .args(target)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn launcher");

    assert!(
        wait_until(Duration::from_secs(5), || !host_pids_running(&target).is_empty()),
        "container target never started"
    );
    launcher.kill().expect("kill launcher");
    let _ = launcher.wait().expect("reap launcher");

    assert!(
        wait_until(Duration::from_secs(5), || host_pids_running(&target).is_empty()),
        "container kept running without its launcher"
    );
}

#[test]
#[ignore = "requires root and NESTBOX_TEST_ROOTFS"]
fn private_mounts_leave_no_proc_mount_on_the_host() {
    let proc_dir = test_rootfs().join("proc").display().to_string();
    // Earlier launches on the shared mount table may have left theirs.
    let proc_mounts = || {
        std::fs::read_to_string("/proc/self/mountinfo")
            .expect("mountinfo")
            .lines()
            .filter(|l| l.split(' ').nth(4) == Some(proc_dir.as_str()))
            .count()
    };
    let before = proc_mounts();

    let out = launch_in_root(&["--private-mounts"], &["/bin/true"]);
    assert_eq!(out.status.code(), Some(0), "{}", stderr(&out));
    assert_eq!(proc_mounts(), before, "proc mount leaked to the host at {proc_dir}");
}
