//! Process executor for synthesized agent commands.
//!
//! Runs one child process under an [`ExecContext`], with an optional per-call
//! timeout, and either captures or streams its output.
//!
//! # Lifecycle
//!
//! - The child is started in its own process group (Unix) with stdin closed.
//! - Two reader threads drain stdout/stderr into memory or into the caller's
//!   sinks, so a chatty child never blocks on a full pipe.
//! - The calling thread waits on the child in short ticks and checks the
//!   context between ticks. When the context is done the whole process group
//!   is killed and the child is reaped before an error is returned.
//! - A non-zero exit code is data in [`ExecResult::exit_code`], not an error.

use super::options::{ExecOptions, ExecResult, OutputSink};
use super::synthesizer::AgentCommand;
use crate::context::{DoneReason, ExecContext};
use crate::error::{AgentError, Result};
use std::io::{self, Read};
use std::process::{Child, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Upper bound between two cancellation checks.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

type OutputReader = Option<JoinHandle<io::Result<Vec<u8>>>>;

/// Start `command` and wait for it under `ctx` and `opts.timeout`.
pub fn run(ctx: &ExecContext, command: &AgentCommand, opts: &ExecOptions) -> Result<ExecResult> {
    let ctx = match opts.effective_timeout() {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx.clone(),
    };

    if let Some(reason) = ctx.done() {
        return Err(done_error(reason, Duration::ZERO));
    }

    let mut process = command.to_process();
    process
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        process.process_group(0);
    }

    let start = Instant::now();
    let mut child = process.spawn().map_err(|source| AgentError::Spawn {
        program: command.program.clone(),
        source,
    })?;
    let pid = child.id();
    tracing::debug!(pid, program = %command.program, "started agent process");

    let stdout = spawn_reader(child.stdout.take(), opts.stdout.clone());
    let stderr = spawn_reader(child.stderr.take(), opts.stderr.clone());

    let status = match wait_or_cancel(&mut child, &ctx) {
        Ok(status) => status,
        Err(Interrupted::Done(reason)) => {
            let elapsed = start.elapsed();
            tracing::warn!(pid, ?reason, elapsed_ms = elapsed.as_millis() as u64, "killed agent process");
            return Err(done_error(reason, elapsed));
        }
        Err(Interrupted::Wait(err)) => return Err(AgentError::Io(err)),
    };

    // Descendants may still hold the pipes after the child itself exits.
    if let Some(reason) = wait_for_readers(&[&stdout, &stderr], &ctx, pid) {
        return Err(done_error(reason, start.elapsed()));
    }

    let duration = start.elapsed();
    let stdout = collect(stdout)?;
    let stderr = collect(stderr)?;

    let exit_code = exit_code(status)?;
    tracing::debug!(
        pid,
        exit_code,
        duration_ms = duration.as_millis() as u64,
        "agent process exited"
    );

    Ok(ExecResult {
        exit_code,
        stdout,
        stderr,
        duration,
    })
}

enum Interrupted {
    Done(DoneReason),
    Wait(io::Error),
}

/// Wait for the child, checking the context every tick.
///
/// On every error path the child has been killed and reaped.
fn wait_or_cancel(child: &mut Child, ctx: &ExecContext) -> std::result::Result<ExitStatus, Interrupted> {
    loop {
        if let Some(reason) = ctx.done() {
            terminate(child);
            return Err(Interrupted::Done(reason));
        }

        let tick = ctx
            .remaining()
            .map_or(POLL_INTERVAL, |left| left.min(POLL_INTERVAL));

        match child.wait_timeout(tick) {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => continue,
            Err(err) => {
                terminate(child);
                return Err(Interrupted::Wait(err));
            }
        }
    }
}

fn wait_for_readers(readers: &[&OutputReader], ctx: &ExecContext, pid: u32) -> Option<DoneReason> {
    loop {
        let pending = readers
            .iter()
            .any(|reader| reader.as_ref().is_some_and(|handle| !handle.is_finished()));
        if !pending {
            return None;
        }
        if let Some(reason) = ctx.done() {
            kill_process_group(pid);
            return Some(reason);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child and its process group, then reap the child.
fn terminate(child: &mut Child) {
    kill_process_group(child.id());
    if let Err(err) = child.kill() {
        tracing::debug!(error = %err, "kill after group signal failed");
    }
    if let Err(err) = child.wait() {
        tracing::warn!(error = %err, "failed to reap killed agent process");
    }
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) takes no pointers; the group was created for this child.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

fn spawn_reader<R>(pipe: Option<R>, sink: Option<OutputSink>) -> OutputReader
where
    R: Read + Send + 'static,
{
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut captured = Vec::new();
        let mut sink = sink;
        let mut sink_error = None;
        let mut buf = [0u8; 8192];

        loop {
            let n = match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            match &sink {
                Some(target) => {
                    // Keep draining after a failed write so the child never blocks.
                    if let Err(err) = target.write_all(&buf[..n]) {
                        sink_error = Some(err);
                        sink = None;
                    }
                }
                None if sink_error.is_none() => captured.extend_from_slice(&buf[..n]),
                None => {}
            }
        }

        match sink_error {
            Some(err) => Err(err),
            None => Ok(captured),
        }
    }))
}

fn collect(reader: OutputReader) -> Result<String> {
    let Some(handle) = reader else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| AgentError::Io(io::Error::other("output reader thread panicked")))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn exit_code(status: ExitStatus) -> Result<i32> {
    if let Some(code) = status.code() {
        return Ok(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(AgentError::Signal(signal));
        }
    }

    Err(AgentError::Io(io::Error::other(format!(
        "process ended without an exit code: {}",
        status
    ))))
}

fn done_error(reason: DoneReason, elapsed: Duration) -> AgentError {
    match reason {
        DoneReason::Cancelled => AgentError::Cancelled,
        DoneReason::DeadlineExceeded => AgentError::Timeout { after: elapsed },
    }
}
