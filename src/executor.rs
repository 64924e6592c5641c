use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::command::ConversionCommand;
use crate::error::ExecutionError;
use crate::progress::ProgressTracker;

/// One line from either captured stream of the encoder process. Both streams
/// funnel into a single channel so one consumer owns the progress state and
/// no lock is needed.
enum StreamLine {
    Diagnostic(String),
    Progress(String),
}

/// Owns the lifecycle of one encoder process per call: spawn, wire both
/// output streams through a [`ProgressTracker`], wait for the exit status,
/// translate the outcome. Instances are cheap and carry no per-conversion
/// state, so concurrent conversions each get an independent process and
/// tracker.
pub struct ConversionExecutor {
    binary_path: String,
}

impl ConversionExecutor {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Run a conversion to completion. A single attempt, no retry.
    pub async fn execute(&self, command: &ConversionCommand) -> Result<PathBuf, ExecutionError> {
        self.run(command, None, None).await
    }

    /// Run a conversion, surfacing percentage updates over `progress`.
    /// Updates are sent non-blocking; a slow receiver loses intermediate
    /// values rather than stalling the stream readers.
    pub async fn execute_with_progress(
        &self,
        command: &ConversionCommand,
        progress: mpsc::Sender<f64>,
    ) -> Result<PathBuf, ExecutionError> {
        self.run(command, Some(progress), None).await
    }

    /// Like [`execute_with_progress`](Self::execute_with_progress), but the
    /// conversion can be aborted: completing `abort` kills the encoder
    /// process and resolves with [`ExecutionError::Cancelled`].
    pub async fn execute_with_abort(
        &self,
        command: &ConversionCommand,
        progress: mpsc::Sender<f64>,
        abort: oneshot::Receiver<()>,
    ) -> Result<PathBuf, ExecutionError> {
        self.run(command, Some(progress), Some(abort)).await
    }

    async fn run(
        &self,
        command: &ConversionCommand,
        progress_tx: Option<mpsc::Sender<f64>>,
        abort: Option<oneshot::Receiver<()>>,
    ) -> Result<PathBuf, ExecutionError> {
        info!(
            "Executing encoder command: {} {}",
            self.binary_path,
            command.args().join(" ")
        );

        let mut child = Command::new(&self.binary_path)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed {
                detail: e.to_string(),
            })?;

        let stdout = child.stdout.take().expect("stdout was requested piped");
        let stderr = child.stderr.take().expect("stderr was requested piped");

        // stderr carries diagnostics (including the duration announcement),
        // stdout carries the machine-readable -progress stream.
        let (line_tx, mut line_rx) = mpsc::channel::<StreamLine>(64);
        let diag_tx = line_tx.clone();
        let stderr_task = tokio::spawn(forward_lines(stderr, diag_tx, StreamLine::Diagnostic));
        let stdout_task = tokio::spawn(forward_lines(stdout, line_tx, StreamLine::Progress));

        let result = match abort {
            Some(mut abort_rx) => {
                tokio::select! {
                    res = supervise(&mut child, &mut line_rx, progress_tx) => res,
                    _ = &mut abort_rx => {
                        child.kill().await?;
                        let _ = child.wait().await;
                        Err(ExecutionError::Cancelled)
                    }
                }
            }
            None => supervise(&mut child, &mut line_rx, progress_tx).await,
        };

        // The readers end once the child's pipes close; join them so no
        // trailing lines are lost before the outcome is reported. Dropping
        // the receiver first unblocks a reader stuck on a full channel
        // after an abort.
        drop(line_rx);
        let _ = stderr_task.await;
        let _ = stdout_task.await;

        result.map(|_| command.output.clone())
    }
}

async fn forward_lines<R>(
    stream: R,
    tx: mpsc::Sender<StreamLine>,
    wrap: fn(String) -> StreamLine,
) where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(wrap(line)).await.is_err() {
            break;
        }
    }
}

/// Drain both streams into the tracker, then join the exit status. The
/// channel closes only after both readers hit end-of-input, so the status
/// is never produced with progress lines still in flight.
async fn supervise(
    child: &mut Child,
    line_rx: &mut mpsc::Receiver<StreamLine>,
    progress_tx: Option<mpsc::Sender<f64>>,
) -> Result<(), ExecutionError> {
    let mut tracker = ProgressTracker::new();

    while let Some(line) = line_rx.recv().await {
        match line {
            StreamLine::Diagnostic(line) => {
                debug!("{}", line);
                tracker.observe_diagnostic(&line);
            }
            StreamLine::Progress(line) => {
                if let Some(percentage) = tracker.observe_progress(&line) {
                    if let Some(tx) = &progress_tx {
                        let _ = tx.try_send(percentage);
                    }
                }
            }
        }
    }

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(ExecutionError::NonZeroExit {
            code: status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn shell_command(script: &str) -> ConversionCommand {
        ConversionCommand {
            args: vec!["-c".to_string(), script.to_string()],
            output: PathBuf::from("/tmp/out.mp4"),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let executor = ConversionExecutor::new("hevconv-no-such-binary");
        let command = shell_command("exit 0");
        let err = executor.execute(&command).await.unwrap_err();
        assert!(matches!(err, ExecutionError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let executor = ConversionExecutor::new("sh");
        let command = shell_command("exit 3");
        let err = executor.execute(&command).await.unwrap_err();
        assert!(matches!(err, ExecutionError::NonZeroExit { code: 3 }));
    }

    #[tokio::test]
    async fn test_success_returns_output_path() {
        let executor = ConversionExecutor::new("sh");
        let command = shell_command("exit 0");
        let output = executor.execute(&command).await.unwrap();
        assert_eq!(output, PathBuf::from("/tmp/out.mp4"));
    }

    #[tokio::test]
    async fn test_progress_updates_from_both_streams() {
        let executor = ConversionExecutor::new("sh");
        // Duration on stderr, position markers on stdout, as ffmpeg does.
        let command = shell_command(
            "echo 'Duration: 00:01:40.00, start: 0.000000' >&2; \
             sleep 0.1; \
             echo out_time_ms=50000000; \
             echo out_time_ms=100000000",
        );

        let (tx, mut rx) = mpsc::channel(16);
        let output = executor
            .execute_with_progress(&command, tx)
            .await
            .unwrap();
        assert_eq!(output, PathBuf::from("/tmp/out.mp4"));

        let mut updates = Vec::new();
        while let Some(pct) = rx.recv().await {
            updates.push(pct);
        }
        assert_eq!(updates, vec![50.0, 100.0]);
    }

    #[tokio::test]
    async fn test_marker_without_duration_produces_no_update() {
        let executor = ConversionExecutor::new("sh");
        let command = shell_command("echo out_time_ms=50000000");

        let (tx, mut rx) = mpsc::channel(16);
        executor.execute_with_progress(&command, tx).await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_abort_kills_process() {
        let executor = ConversionExecutor::new("sh");
        let command = shell_command("sleep 30");

        let (progress_tx, _progress_rx) = mpsc::channel(16);
        let (abort_tx, abort_rx) = oneshot::channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = abort_tx.send(());
        });

        let started = std::time::Instant::now();
        let err = executor
            .execute_with_abort(&command, progress_tx, abort_rx)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
