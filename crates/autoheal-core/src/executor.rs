use crate::error::{AutohealError, Result};
use crate::registry::ActionDescriptor;
use std::future::Future;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Appended to a captured stream when it exceeded the capture ceiling.
pub const TRUNCATION_MARKER: &str = "[output truncated]";

/// How long to wait for the stream readers to drain after the child exits.
/// A killed child can leave a grandchild holding the pipe open; without this
/// bound we would wait for the grandchild instead of the child.
const READER_GRACE: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// ExecutionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// None when the process was killed (timeout or signal).
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// Remediator
// ---------------------------------------------------------------------------

/// Seam between the dispatch coordinator and process execution. Tests use a
/// recording fake; production uses [`ProcessExecutor`].
pub trait Remediator {
    fn execute(
        &self,
        action: &ActionDescriptor,
    ) -> impl Future<Output = Result<ExecutionResult>> + Send;
}

// ---------------------------------------------------------------------------
// ProcessExecutor
// ---------------------------------------------------------------------------

/// Runs the configured argv as a child process with a wall-clock timeout and
/// bounded output capture. A non-zero exit is a normal result, not an error;
/// only spawn/wait failures surface as `Err`.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    max_capture_bytes: usize,
}

impl ProcessExecutor {
    pub fn new(max_capture_bytes: usize) -> Self {
        Self { max_capture_bytes }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

impl Remediator for ProcessExecutor {
    /// Execution is detached onto its own task: dropping the returned future
    /// (a webhook client that disconnected mid-request) leaves the child
    /// running to completion. Only the timeout path kills it.
    async fn execute(&self, action: &ActionDescriptor) -> Result<ExecutionResult> {
        let task = tokio::spawn(run_command(action.clone(), self.max_capture_bytes));
        match task.await {
            Ok(result) => result,
            Err(e) => Err(AutohealError::SpawnFailed(format!(
                "execution task failed: {e}"
            ))),
        }
    }
}

async fn run_command(action: ActionDescriptor, max_capture_bytes: usize) -> Result<ExecutionResult> {
    let (program, args) = action
        .command
        .split_first()
        .ok_or_else(|| AutohealError::EmptyCommand(action.alert_name.clone()))?;

    let start = Instant::now();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| AutohealError::SpawnFailed(format!("'{program}': {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AutohealError::SpawnFailed("stdout not captured".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| AutohealError::SpawnFailed("stderr not captured".into()))?;

    let stdout_buf = Arc::new(Mutex::new(CaptureBuf::new(max_capture_bytes)));
    let stderr_buf = Arc::new(Mutex::new(CaptureBuf::new(max_capture_bytes)));
    let stdout_task = spawn_reader(stdout, Arc::clone(&stdout_buf));
    let stderr_task = spawn_reader(stderr, Arc::clone(&stderr_buf));

    let status = match tokio::time::timeout(action.timeout, child.wait()).await {
        Ok(waited) => {
            Some(waited.map_err(|e| AutohealError::SpawnFailed(format!("wait failed: {e}")))?)
        }
        Err(_) => {
            tracing::warn!(
                alert = %action.alert_name,
                timeout_ms = action.timeout.as_millis() as u64,
                "remediation timed out, killing child"
            );
            let _ = child.kill().await;
            None
        }
    };

    // Drain whatever the readers can still get, then take the buffers.
    // The grace period bounds us when something downstream keeps the
    // pipe open past the child's death.
    let _ = tokio::time::timeout(READER_GRACE, async {
        let _ = tokio::join!(stdout_task, stderr_task);
    })
    .await;

    Ok(ExecutionResult {
        exit_code: status.as_ref().and_then(|s| s.code()),
        stdout: take_capture(&stdout_buf),
        stderr: take_capture(&stderr_buf),
        timed_out: status.is_none(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

// ---------------------------------------------------------------------------
// Capped stream capture
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CaptureBuf {
    data: String,
    cap: usize,
    truncated: bool,
}

impl CaptureBuf {
    fn new(cap: usize) -> Self {
        Self {
            data: String::new(),
            cap,
            truncated: false,
        }
    }

    fn push_line(&mut self, line: &str) {
        if self.truncated || self.data.len() + line.len() + 1 > self.cap {
            self.truncated = true;
            return;
        }
        self.data.push_str(line);
        self.data.push('\n');
    }

    fn take(&mut self) -> String {
        let mut out = std::mem::take(&mut self.data);
        if self.truncated {
            out.push_str(TRUNCATION_MARKER);
            out.push('\n');
        }
        out
    }
}

/// Read a stream line by line into the shared capped buffer. Past the cap,
/// lines are dropped but reading continues so the child never blocks on a
/// full pipe.
fn spawn_reader<R: AsyncRead + Unpin + Send + 'static>(
    reader: R,
    buf: Arc<Mutex<CaptureBuf>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Ok(mut b) = buf.lock() {
                b.push_line(&line);
            }
        }
    })
}

fn take_capture(buf: &Arc<Mutex<CaptureBuf>>) -> String {
    buf.lock().map(|mut b| b.take()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
