//! Subprocess execution for analysis tools.
//!
//! Every tool runs with piped output, `kill_on_drop`, and (on unix) in its own
//! process group. When the timeout fires the child is dropped, which kills
//! it, and the rest of its process group is sent SIGKILL so helper processes
//! spawned by the tool do not outlive the request.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use super::error::ToolError;

/// Captured result of a finished tool process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// None when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

/// Run `program args.. file` and wait at most `timeout` for it to exit.
pub async fn run_tool_process(
    tool: &str,
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<ProcessOutput, ToolError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    debug!(tool, "$ {} {}", program, args.join(" "));

    let child = command.spawn().map_err(|source| ToolError::Crash {
        tool: tool.to_string(),
        source,
    })?;
    // Armed until the process has been waited on; covers both our own
    // timeout and the caller dropping this future.
    let mut group = GroupKillGuard { pid: child.id() };

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            group.disarm();
            output
        }
        Ok(Err(source)) => {
            return Err(ToolError::Crash {
                tool: tool.to_string(),
                source,
            });
        }
        Err(_) => {
            warn!(tool, "process exceeded {}s, killing", timeout.as_secs_f32());
            return Err(ToolError::Timeout {
                tool: tool.to_string(),
                after: timeout,
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    debug!(
        tool,
        exit = ?output.status.code(),
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "process finished"
    );

    Ok(ProcessOutput {
        stdout,
        stderr,
        exit_code: output.status.code(),
    })
}

struct GroupKillGuard {
    pid: Option<u32>,
}

impl GroupKillGuard {
    fn disarm(&mut self) {
        self.pid = None;
    }
}

impl Drop for GroupKillGuard {
    fn drop(&mut self) {
        kill_process_group(self.pid.take());
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else { return };
    let Ok(pgid) = libc::pid_t::try_from(pid) else { return };
    // The group leader was already killed on drop; ESRCH here just means
    // nothing else was left in the group.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        debug!("killpg({}) returned {}", pgid, std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let out = run_tool_process("echo", "sh", &sh("echo hello; exit 3"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_captures_stderr() {
        let out = run_tool_process("warn", "sh", &sh("echo oops >&2"), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(out.stdout.is_empty());
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let start = std::time::Instant::now();
        let err = run_tool_process("sleepy", "sh", &sh("sleep 10"), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
        assert_eq!(err.to_string(), "sleepy timed out");
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_program_is_crash() {
        let err = run_tool_process(
            "ghost",
            "definitely-not-a-real-binary-4f1c",
            &[],
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::Crash { .. }));
        assert!(err.to_string().starts_with("ghost failed: "));
    }
}
