//! Per-call execution options and the outcome of one execution.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Destination for a child's output stream.
///
/// When set on [`ExecOptions`], output is forwarded here as it arrives and
/// the corresponding [`ExecResult`] field stays empty.
#[derive(Clone)]
pub struct OutputSink(Arc<Mutex<dyn Write + Send>>);

impl OutputSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self(Arc::new(Mutex::new(writer)))
    }

    /// Wrap a writer the caller keeps a handle to, e.g. `Arc<Mutex<Vec<u8>>>`.
    pub fn shared<W: Write + Send + 'static>(writer: Arc<Mutex<W>>) -> Self {
        Self(writer)
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    pub(crate) fn write_all(&self, buf: &[u8]) -> std::io::Result<()> {
        let mut writer = self.0.lock().unwrap_or_else(|poison| poison.into_inner());
        writer.write_all(buf)?;
        writer.flush()
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OutputSink")
    }
}

/// Options for a single `build_command` / `execute` call.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Run headless: append the agent's autonomous flag and env.
    pub autonomous: bool,

    /// Kill the process when it runs longer than this. `None` or zero
    /// leaves cancellation to the caller's context.
    pub timeout: Option<Duration>,

    /// Working directory; inherited when `None`.
    pub work_dir: Option<PathBuf>,

    /// Appended after everything else.
    pub extra_args: Vec<String>,

    /// Overlaid last on the process environment.
    pub env: BTreeMap<String, String>,

    pub stdout: Option<OutputSink>,
    pub stderr: Option<OutputSink>,
}

impl ExecOptions {
    pub(crate) fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }
}

/// Outcome of a process that started and ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub exit_code: i32,
    /// Captured output; empty when a stdout sink was supplied.
    pub stdout: String,
    /// Captured output; empty when a stderr sink was supplied.
    pub stderr: String,
    pub duration: Duration,
}

impl ExecResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}
