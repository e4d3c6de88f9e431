//! Tests that run the `fabric` binary as a separate process.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

struct Exit {
    code: Option<i32>,
    stderr: String,
    elapsed: Duration,
}

/// Runs the binary with a clean logging environment, killing it if it has
/// not exited after `limit`.
fn run_fabric(args: &[&str], limit: Duration) -> Exit {
    let start = Instant::now();
    let mut child = Command::new(env!("CARGO_BIN_EXE_fabric"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("FABRIC_TIMEOUT_MS")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if start.elapsed() > limit {
            child.kill().unwrap();
            child.wait().unwrap();
            panic!("fabric {args:?} still running after {limit:?}");
        }
        thread::sleep(Duration::from_millis(20));
    };

    let mut stderr = String::new();
    child
        .stderr
        .take()
        .unwrap()
        .read_to_string(&mut stderr)
        .unwrap();
    Exit {
        code: status.code(),
        stderr,
        elapsed: start.elapsed(),
    }
}

/// Creates a FIFO whose pipe buffer is already full, so the binary's write
/// of a command blocks until the test reads from it.
#[cfg(target_os = "linux")]
fn full_fifo(dir: &Path) -> (PathBuf, std::fs::File) {
    use std::ffi::CString;
    use std::io::Write;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::fs::OpenOptionsExt;

    let path = dir.join("switchtec0");
    let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
    assert_eq!(unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) }, 0);

    let mut fifo = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(&path)
        .unwrap();
    for chunk in [4096usize, 1] {
        let buf = vec![0u8; chunk];
        loop {
            match fifo.write(&buf) {
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => panic!("filling fifo: {e}"),
            }
        }
    }
    (path, fifo)
}

#[cfg(target_os = "linux")]
#[test]
fn test_hung_device_exits_after_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _fifo) = full_fifo(dir.path());

    let exit = run_fabric(
        &[
            "--timeout-ms",
            "300",
            "portcfg_show",
            path.to_str().unwrap(),
            "-p",
            "0",
        ],
        Duration::from_secs(10),
    );

    assert_eq!(exit.code, Some(3));
    assert!(exit.elapsed < Duration::from_secs(5), "{:?}", exit.elapsed);
    assert_eq!(
        exit.stderr,
        "portcfg_show: MRPC_PORT_CONFIG timed out after 300ms\n"
    );
}

#[test]
fn test_failure_prints_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("switchtec9");

    let exit = run_fabric(
        &["portcfg_show", missing.to_str().unwrap(), "-p", "0"],
        Duration::from_secs(10),
    );

    assert_eq!(exit.code, Some(3));
    assert_eq!(exit.stderr.lines().count(), 1, "{}", exit.stderr);
    assert!(
        exit.stderr.starts_with("portcfg_show: Failed to open device"),
        "{}",
        exit.stderr
    );
    assert!(!exit.stderr.contains('\u{1b}'), "{}", exit.stderr);
}

#[test]
fn test_help_exits_zero() {
    let exit = run_fabric(&["--help"], Duration::from_secs(10));
    assert_eq!(exit.code, Some(0));
}
