//! Process executor built on `tokio::process`.

use crate::launcher::ports::{
    ProcessCompletion, ProcessExecutionError, ProcessExecutionResult, ProcessExecutor,
    ProcessInvocation,
};
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Default wall-clock budget for one run.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest number of bytes kept per captured stream (10 MiB).
pub const MAX_CAPTURE_BYTES: u64 = 10 * 1024 * 1024;

const STREAM_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Runs each invocation as the leader of a new process group.
///
/// On timeout the whole group is sent `SIGKILL`, so descendants the
/// entrypoint started die with it. The group is also killed after the
/// leader exits normally to release pipes held by stray descendants.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessExecutor;

impl TokioProcessExecutor {
    /// Creates an executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn execute(
        &self,
        invocation: &ProcessInvocation,
    ) -> ProcessExecutionResult<ProcessCompletion> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(invocation.working_dir.as_std_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        configure_process_group(&mut command);

        let mut child = command
            .spawn()
            .map_err(|err| ProcessExecutionError::spawn(invocation.program.as_str(), err))?;
        let pid = child.id();
        tracing::debug!(
            program = %invocation.program,
            pid,
            cwd = %invocation.working_dir,
            "spawned server process"
        );

        let stdout_task = tokio::spawn(capture(child.stdout.take()));
        let stderr_task = tokio::spawn(capture(child.stderr.take()));

        match tokio::time::timeout(invocation.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                kill_process_group(pid);
                let stdout = join_capture(stdout_task).await;
                let stderr = join_capture(stderr_task).await;
                Ok(ProcessCompletion::Exited {
                    code: exit_code(status),
                    stdout,
                    stderr,
                })
            }
            Ok(Err(err)) => {
                kill_process_group(pid);
                Err(ProcessExecutionError::supervise(err))
            }
            Err(_) => {
                tracing::warn!(
                    program = %invocation.program,
                    pid,
                    timeout = ?invocation.timeout,
                    "server process timed out; killing process group"
                );
                kill_process_group(pid);
                if let Err(err) = child.kill().await {
                    tracing::warn!(pid, error = %err, "failed to reap timed-out process");
                }
                let stdout = join_capture(stdout_task).await;
                let stderr = join_capture(stderr_task).await;
                Ok(ProcessCompletion::TimedOut { stdout, stderr })
            }
        }
    }
}

/// Reads up to [`MAX_CAPTURE_BYTES`] and discards the rest so the child never
/// blocks on a full pipe.
async fn capture<R: AsyncRead + Unpin>(stream: Option<R>) -> Vec<u8> {
    let mut buffer = Vec::new();
    let Some(mut reader) = stream else {
        return buffer;
    };
    if let Err(err) = (&mut reader)
        .take(MAX_CAPTURE_BYTES)
        .read_to_end(&mut buffer)
        .await
    {
        tracing::debug!(error = %err, "stopped reading child stream");
        return buffer;
    }
    if let Err(err) = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await {
        tracing::debug!(error = %err, "stopped draining child stream");
    }
    buffer
}

async fn join_capture(task: JoinHandle<Vec<u8>>) -> String {
    match tokio::time::timeout(STREAM_DRAIN_GRACE, task).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "stream capture task failed");
            String::new()
        }
        Err(_) => {
            tracing::warn!("child stream still open after exit; output discarded");
            String::new()
        }
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(unix)]
fn configure_process_group(command: &mut Command) {
    command.process_group(0);
}

#[cfg(not(unix))]
fn configure_process_group(_command: &mut Command) {}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(raw) = pid.and_then(|value| i32::try_from(value).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => tracing::warn!(pid = raw, error = %err, "failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
