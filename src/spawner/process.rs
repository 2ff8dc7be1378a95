//! Process management for engine and AI children
//!
//! Handles spawning, the blocking line round trip, and termination.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use super::types::{ChildRole, ProgramSpec};
use crate::error::{ArenaError, Result};

/// One spawned executable speaking a line protocol on stdin/stdout
pub struct ChildHandle {
    role: ChildRole,
    /// Program path, kept for error messages
    program: String,
    child: Child,
    /// Dropped on terminate so a well-behaved child sees EOF
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    /// Taken once by the log relay
    stderr: Option<ChildStderr>,
    /// Bounded wait for a single request/reply exchange
    reply_timeout: Duration,
    terminated: bool,
}

impl ChildHandle {
    /// Launch `spec` with piped stdin/stdout (and stderr for the AI)
    pub fn start(role: ChildRole, spec: &ProgramSpec, reply_timeout: Duration) -> Result<Self> {
        let program = spec.program().display().to_string();

        let mut cmd = Command::new(spec.program());
        cmd.args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true);

        if role.captures_diagnostics() {
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stderr(Stdio::inherit());
        }

        let mut child = cmd.spawn().map_err(|source| ArenaError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().ok_or_else(|| ArenaError::Spawn {
            program: program.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;
        let stderr = child.stderr.take();

        debug!(role = role.as_str(), program = %program, pid = ?child.id(), "Spawned child process");

        Ok(Self {
            role,
            program,
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr,
            reply_timeout,
            terminated: false,
        })
    }

    /// Hand the diagnostic stream to its single consumer
    pub fn take_diagnostics(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Write `line` plus a newline, then read exactly one reply line.
    ///
    /// Broken pipes, end-of-stream and an expired wait all map to
    /// [`ArenaError::Protocol`]. After a timeout the stream position is
    /// unknown, so the child should be considered desynced.
    pub async fn request(&mut self, line: &str) -> Result<String> {
        let role = self.role.as_str();
        if self.terminated {
            return Err(ArenaError::protocol(format!("{role} process already terminated")));
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ArenaError::protocol(format!("{role} stdin not available")))?;
        let stdout = &mut self.stdout;
        let payload = format!("{line}\n");

        let exchange = async move {
            stdin
                .write_all(payload.as_bytes())
                .await
                .map_err(|e| ArenaError::protocol(format!("write to {role} failed: {e}")))?;
            stdin
                .flush()
                .await
                .map_err(|e| ArenaError::protocol(format!("flush to {role} failed: {e}")))?;

            let mut reply = String::new();
            let n = stdout
                .read_line(&mut reply)
                .await
                .map_err(|e| ArenaError::protocol(format!("read from {role} failed: {e}")))?;
            if n == 0 {
                return Err(ArenaError::protocol(format!("{role} closed its output")));
            }
            Ok(reply)
        };

        match timeout(self.reply_timeout, exchange).await {
            Ok(Ok(reply)) => {
                debug!(role, request = %line, reply = %reply.trim_end(), "Child exchange");
                Ok(reply)
            }
            Ok(Err(e)) => {
                warn!(role, program = %self.program, error = %e, "Child exchange failed");
                Err(e)
            }
            Err(_) => {
                warn!(role, program = %self.program, timeout = ?self.reply_timeout, "Child did not reply in time");
                Err(ArenaError::protocol(format!(
                    "{role} did not reply within {:?}",
                    self.reply_timeout
                )))
            }
        }
    }

    /// Signal the process to stop without waiting for it to exit.
    ///
    /// Idempotent and infallible; if the process ignores SIGTERM it is killed
    /// when the handle is dropped.
    pub fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.stdin.take();

        let Some(pid) = self.child.id() else {
            // Already reaped
            return;
        };

        if !send_sigterm(pid) {
            if let Err(e) = self.child.start_kill() {
                debug!(role = self.role.as_str(), pid, error = %e, "Kill after failed SIGTERM also failed");
            }
        }
        debug!(role = self.role.as_str(), pid, "Terminated child process");
    }
}

#[cfg(unix)]
fn send_sigterm(pid: u32) -> bool {
    // SAFETY: kill(2) has no memory-safety preconditions
    unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) == 0 }
}

#[cfg(not(unix))]
fn send_sigterm(_pid: u32) -> bool {
    false
}
