//! Render worker supervision.
//!
//! Each launched job gets its own task that spawns the worker, streams both
//! output channels into the job log and appends the exit marker. stdout and
//! stderr are read by two producer tasks that push raw chunks into a bounded
//! channel; a single consumer task owns the log file, so the file never has
//! two writers.

use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::command::RenderCommand;
use super::marker::ExitMarker;
use crate::job::JobId;
use crate::workspace::JobWorkspace;

/// Chunks buffered between the output readers and the log writer.
pub const LOG_CHANNEL_CAPACITY: usize = 64;

/// Size of a single read from a worker output pipe.
const READ_CHUNK_BYTES: usize = 8 * 1024;

/// How long output readers may keep running after the worker is gone.
///
/// A worker that forks helpers can leave its pipes open after it exits or
/// is killed; readers still running after this are abandoned.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Launches render workers and tracks their supervision tasks.
pub struct RenderSupervisor {
    command: RenderCommand,
    timeout: Duration,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl RenderSupervisor {
    /// `timeout` is the wall-clock budget of a single worker run.
    pub fn new(command: RenderCommand, timeout: Duration) -> Self {
        Self {
            command,
            timeout,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    pub fn command(&self) -> &RenderCommand {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start rendering `workspace` in the background and return immediately.
    ///
    /// The outcome is only observable through the job log.
    pub fn launch(&self, workspace: JobWorkspace) {
        let command = self.command.clone();
        let timeout = self.timeout;
        let cancel = self.cancel.child_token();

        self.tracker.spawn(async move {
            let marker = supervise(&command, &workspace, timeout, cancel).await;
            tracing::info!(job_id = %workspace.id, outcome = %marker, "Render job finished");
        });
    }

    /// Number of jobs whose worker or log writer is still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Cancel every running job and wait up to `grace` for their exit
    /// markers to be written.
    ///
    /// Returns `false` if some jobs were still finishing when `grace`
    /// elapsed.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        let pending = self.tracker.len();
        tracing::info!(pending, "Cancelling in-flight render jobs");
        self.cancel.cancel();
        self.tracker.close();
        tokio::time::timeout(grace, self.tracker.wait()).await.is_ok()
    }
}

/// Run one worker to completion and record its outcome in the job log.
///
/// Never fails: every problem ends up as an [`ExitMarker`] in the log, or,
/// if the log itself cannot be opened, in the service log.
pub async fn supervise(
    command: &RenderCommand,
    workspace: &JobWorkspace,
    timeout: Duration,
    cancel: CancellationToken,
) -> ExitMarker {
    let job_id = &workspace.id;

    let log = match open_log(&workspace.log_path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Cannot open render log, job not started");
            return ExitMarker::SpawnFailed(format!("cannot open render log: {e}"));
        }
    };

    let mut child = match command.build(workspace).spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::error!(
                job_id = %job_id,
                program = %command.program,
                error = %e,
                "Failed to spawn render worker",
            );
            let marker = ExitMarker::SpawnFailed(e.to_string());
            finish_log(Some(log), &workspace.log_path, &marker, job_id).await;
            return marker;
        }
    };
    tracing::info!(job_id = %job_id, pid = ?child.id(), "Render worker started");

    let (tx, rx) = mpsc::channel(LOG_CHANNEL_CAPACITY);
    let stdout_pump = child
        .stdout
        .take()
        .map(|out| tokio::spawn(pump(out, tx.clone(), job_id.clone(), "stdout")));
    let stderr_pump = child
        .stderr
        .take()
        .map(|err| tokio::spawn(pump(err, tx, job_id.clone(), "stderr")));
    let writer = tokio::spawn(write_log(log, rx, job_id.clone()));

    let marker = wait_for_exit(&mut child, timeout, &cancel, job_id).await;

    drain(stdout_pump, job_id).await;
    drain(stderr_pump, job_id).await;

    let log = match writer.await {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Render log writer failed");
            None
        }
    };
    finish_log(log, &workspace.log_path, &marker, job_id).await;
    marker
}

enum Wake {
    Exited(io::Result<ExitStatus>),
    Deadline,
    Cancelled,
}

/// Wait for the worker, killing it on deadline expiry or cancellation.
async fn wait_for_exit(
    child: &mut Child,
    timeout: Duration,
    cancel: &CancellationToken,
    job_id: &JobId,
) -> ExitMarker {
    let wake = tokio::select! {
        status = child.wait() => Wake::Exited(status),
        _ = tokio::time::sleep(timeout) => Wake::Deadline,
        _ = cancel.cancelled() => Wake::Cancelled,
    };

    match wake {
        Wake::Exited(Ok(status)) => status
            .code()
            .map_or(ExitMarker::Signalled, ExitMarker::Exited),
        Wake::Exited(Err(e)) => {
            tracing::error!(job_id = %job_id, error = %e, "Failed to wait on render worker");
            kill(child, job_id).await;
            ExitMarker::Exited(-1)
        }
        Wake::Deadline => {
            let secs = whole_secs(timeout);
            tracing::warn!(
                job_id = %job_id,
                timeout_secs = secs,
                "Render worker exceeded its deadline, killing it",
            );
            kill(child, job_id).await;
            ExitMarker::TimedOut { secs }
        }
        Wake::Cancelled => {
            tracing::info!(job_id = %job_id, "Render job cancelled, killing worker");
            kill(child, job_id).await;
            ExitMarker::Cancelled
        }
    }
}

/// `d` in whole seconds, rounded up so a sub-second deadline never reads 0.
fn whole_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

async fn kill(child: &mut Child, job_id: &JobId) {
    if let Err(e) = child.kill().await {
        tracing::warn!(job_id = %job_id, error = %e, "Failed to kill render worker");
    }
}

/// Forward raw chunks from one worker output channel to the log writer.
async fn pump<R: AsyncRead + Unpin>(
    mut reader: R,
    tx: mpsc::Sender<Vec<u8>>,
    job_id: JobId,
    stream: &'static str,
) {
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                tracing::trace!(job_id = %job_id, stream, bytes = n, "Worker output");
                if tx.send(buf[..n].to_vec()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, stream, error = %e, "Failed to read worker output");
                break;
            }
        }
    }
}

/// Sole writer of the job log while the worker runs.
///
/// Each chunk is appended and flushed as it arrives so concurrent status
/// reads see it. Write errors are logged and the channel keeps draining, so
/// the readers never block on a dead writer.
async fn write_log(mut file: File, mut rx: mpsc::Receiver<Vec<u8>>, job_id: JobId) -> File {
    while let Some(chunk) = rx.recv().await {
        let written = match file.write_all(&chunk).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to append to render log");
        }
    }
    file
}

async fn drain(pump: Option<JoinHandle<()>>, job_id: &JobId) {
    let Some(mut handle) = pump else {
        return;
    };
    if tokio::time::timeout(DRAIN_GRACE, &mut handle).await.is_err() {
        tracing::warn!(job_id = %job_id, "Worker output still open after exit, abandoning reader");
        handle.abort();
    }
}

/// Append the exit marker and close the log.
async fn finish_log(file: Option<File>, path: &Path, marker: &ExitMarker, job_id: &JobId) {
    let file = match file {
        Some(file) => Ok(file),
        None => open_log(path).await,
    };
    let result = match file {
        Ok(mut file) => match file.write_all(marker.to_log_line().as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::error!(job_id = %job_id, error = %e, marker = %marker, "Failed to write exit marker");
    }
}

async fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path).await
}
