//! External helper-tool execution.
//!
//! Every helper (xdotool, wl-copy, osascript, aplay, ...) is launched through
//! `CommandRunner`. `run` is bounded by a timeout: a child that outlives it is
//! killed and reaped, and the attempt counts as failed. `spawn_detached`
//! starts a child without waiting for it (sound playback).

use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use super::PlatformError;

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// A helper-tool command line plus optional stdin payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg:?}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Runner trait
// ---------------------------------------------------------------------------

pub trait CommandRunner: Send + Sync {
    /// Runs to completion. Non-zero exit and timeout are errors.
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<(), PlatformError>;

    /// Starts the child with stdio discarded and returns immediately.
    fn spawn_detached(&self, invocation: &Invocation) -> Result<(), PlatformError>;
}

/// Runs commands on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<(), PlatformError> {
        let mut cmd = invocation.command();
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        cmd.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let mut child = spawn(&mut cmd, &invocation.program)?;
        feed_stdin(&mut child, invocation);
        wait_bounded(&mut child, &invocation.program, timeout)
    }

    fn spawn_detached(&self, invocation: &Invocation) -> Result<(), PlatformError> {
        let mut cmd = invocation.command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // The child is never waited on; it is reparented when we exit.
        spawn(&mut cmd, &invocation.program).map(drop)
    }
}

/// Runs `invocation` and returns its stdout.
pub fn capture_stdout(invocation: &Invocation, timeout: Duration) -> Result<String, PlatformError> {
    let mut cmd = invocation.command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    let mut child = spawn(&mut cmd, &invocation.program)?;

    // Drained concurrently so a chatty child cannot fill the pipe and stall.
    let (tx, rx) = mpsc::channel();
    if let Some(mut stdout) = child.stdout.take() {
        thread::spawn(move || {
            let mut out = String::new();
            let _ = tx.send(stdout.read_to_string(&mut out).map(|_| out));
        });
    }
    wait_bounded(&mut child, &invocation.program, timeout)?;

    match rx.recv_timeout(timeout) {
        Ok(read) => Ok(read?),
        Err(_) => Err(PlatformError::Timeout {
            program: invocation.program.clone(),
            timeout,
        }),
    }
}

fn spawn(cmd: &mut Command, program: &str) -> Result<Child, PlatformError> {
    cmd.spawn().map_err(|source| PlatformError::Spawn {
        program: program.to_owned(),
        source,
    })
}

/// Writes the payload on its own thread so `wait_bounded` covers a child that
/// stops reading. The writer ends with a broken pipe once the child exits or
/// is killed; it is never joined.
fn feed_stdin(child: &mut Child, invocation: &Invocation) {
    let (Some(input), Some(mut stdin)) = (invocation.stdin.clone(), child.stdin.take()) else {
        return;
    };
    let program = invocation.program.clone();
    let writer = thread::Builder::new()
        .name("stdin-feed".into())
        .spawn(move || {
            // Dropping stdin at the end closes the pipe so the tool sees EOF.
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                log::debug!("process: writing stdin of {program}: {e}");
            }
        });
    if let Err(e) = writer {
        log::debug!("process: cannot start stdin writer: {e}");
    }
}

fn wait_bounded(child: &mut Child, program: &str, timeout: Duration) -> Result<(), PlatformError> {
    match child.wait_timeout(timeout) {
        Ok(Some(status)) if status.success() => Ok(()),
        Ok(Some(status)) => Err(PlatformError::ExitStatus {
            program: program.to_owned(),
            status,
        }),
        Ok(None) => {
            log::debug!("process: {program} still running after {timeout:?}, killing it");
            let _ = child.kill();
            let _ = child.wait();
            Err(PlatformError::Timeout {
                program: program.to_owned(),
                timeout,
            })
        }
        Err(e) => {
            let _ = child.kill();
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Executable lookup
// ---------------------------------------------------------------------------

/// Locates `name` on `PATH`, the way `which` does.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in(name, std::env::split_paths(&path))
}

fn find_in(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    let extensions = executable_extensions();
    dirs.into_iter().find_map(|dir| {
        extensions.iter().find_map(|ext| {
            let candidate = if ext.is_empty() {
                dir.join(name)
            } else {
                dir.join(format!("{name}{ext}"))
            };
            is_executable(&candidate).then_some(candidate)
        })
    })
}

#[cfg(windows)]
fn executable_extensions() -> Vec<String> {
    let pathext = std::env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".into());
    std::iter::once(String::new())
        .chain(pathext.split(';').filter(|e| !e.is_empty()).map(str::to_owned))
        .collect()
}

#[cfg(not(windows))]
fn executable_extensions() -> Vec<String> {
    vec![String::new()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn invocation_display_quotes_args() {
        let inv = Invocation::new("xte", ["key Shift_L Insert"]);
        assert_eq!(inv.to_string(), "xte \"key Shift_L Insert\"");
    }

    #[test]
    fn stdin_is_attached() {
        let inv = Invocation::new("wl-copy", Vec::<String>::new()).with_stdin("hi");
        assert_eq!(inv.stdin.as_deref(), Some("hi"));
        assert!(inv.args.is_empty());
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let inv = Invocation::new("pastebridge-no-such-tool", Vec::<String>::new());
        let err = SystemRunner.run(&inv, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, PlatformError::Spawn { .. }));
    }

    #[test]
    fn find_in_skips_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_in("nothing-here", [dir.path().to_path_buf()]).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn find_in_requires_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("xclip");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(find_in("xclip", [dir.path().to_path_buf()]).is_none());

        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_in("xclip", [dir.path().to_path_buf()]), Some(tool));
    }

    #[cfg(unix)]
    #[test]
    fn run_reports_exit_status_and_timeout() {
        let fail = Invocation::new("sh", ["-c", "exit 3"]);
        assert!(matches!(
            SystemRunner.run(&fail, Duration::from_secs(5)),
            Err(PlatformError::ExitStatus { .. })
        ));

        let slow = Invocation::new("sh", ["-c", "sleep 5"]);
        assert!(matches!(
            SystemRunner.run(&slow, Duration::from_millis(50)),
            Err(PlatformError::Timeout { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn run_feeds_stdin() {
        let inv = Invocation::new("sh", ["-c", "read line; test \"$line\" = hi"]).with_stdin("hi\n");
        assert!(SystemRunner.run(&inv, Duration::from_secs(5)).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn timeout_covers_a_child_that_ignores_stdin() {
        let inv = Invocation::new("sleep", ["3"]).with_stdin("x".repeat(1 << 20));
        let started = Instant::now();
        let result = SystemRunner.run(&inv, Duration::from_millis(200));
        let elapsed = started.elapsed();
        assert!(matches!(result, Err(PlatformError::Timeout { .. })), "{result:?}");
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[cfg(unix)]
    #[test]
    fn large_stdin_reaches_the_child() {
        let payload = "y".repeat(1 << 20);
        let check = format!("test $(wc -c) -eq {}", payload.len());
        let inv = Invocation::new("sh", ["-c".to_owned(), check]).with_stdin(payload);
        assert!(SystemRunner.run(&inv, Duration::from_secs(10)).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn capture_stdout_handles_output_larger_than_a_pipe() {
        let inv = Invocation::new("sh", ["-c", "head -c 200000 /dev/zero | tr '\\000' a"]);
        let out = capture_stdout(&inv, Duration::from_secs(5)).unwrap();
        assert_eq!(out.len(), 200_000);
        assert!(out.bytes().all(|b| b == b'a'));
    }

    #[cfg(unix)]
    #[test]
    fn capture_stdout_returns_output() {
        let inv = Invocation::new("sh", ["-c", "echo 14.5"]);
        assert_eq!(capture_stdout(&inv, Duration::from_secs(5)).unwrap().trim(), "14.5");
    }
}
