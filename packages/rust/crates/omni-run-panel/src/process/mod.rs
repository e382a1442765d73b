//! Background process execution.
//!
//! A [`Spawner`] starts the composed command out of process and reports its
//! output and termination through a [`JobSink`]. Events travel over an mpsc
//! channel and are applied on the owning loop by [`crate::Session::pump`].

use std::collections::BTreeMap;
use std::io;
use std::process::Stdio;
use std::sync::mpsc::{self, Sender, SyncSender};
use std::thread;

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::runtime;

/// Identifier of one job started by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

/// Event produced by a running job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// A chunk of stdout/stderr output.
    Output {
        /// Producing job.
        job: JobId,
        /// Output text, newline-terminated when a full line was read.
        text: String,
    },
    /// The process terminated; `code` is `None` when killed by a signal or
    /// when it never started.
    Exited {
        /// Terminated job.
        job: JobId,
        /// Exit code.
        code: Option<i32>,
    },
}

/// Handle a spawner uses to report output and exit of one job.
#[derive(Debug, Clone)]
pub struct JobSink {
    job: JobId,
    tx: Sender<JobEvent>,
}

impl JobSink {
    /// Create a sink for `job` sending on `tx`.
    #[must_use]
    pub fn new(job: JobId, tx: Sender<JobEvent>) -> Self {
        Self { job, tx }
    }

    /// Job this sink reports for.
    #[must_use]
    pub fn job(&self) -> JobId {
        self.job
    }

    /// Report output. Returns `false` once the receiving session is gone.
    pub fn output(&self, text: impl Into<String>) -> bool {
        self.tx
            .send(JobEvent::Output {
                job: self.job,
                text: text.into(),
            })
            .is_ok()
    }

    /// Report termination.
    pub fn exited(&self, code: Option<i32>) {
        let _ = self.tx.send(JobEvent::Exited {
            job: self.job,
            code,
        });
    }
}

/// What to run and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Program that interprets `command_line` (called with `-c`).
    pub shell: String,
    /// Full shell command line.
    pub command_line: String,
    /// Start from an empty environment.
    pub clear_env: bool,
    /// Extra environment variables.
    pub env: BTreeMap<String, String>,
}

/// Starts background processes.
pub trait Spawner {
    /// Start the request in the background. Output and exit must be reported
    /// through `sink`, never by blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns the error when the process could not be started at all; no
    /// events are sent in that case.
    fn spawn(&mut self, request: &SpawnRequest, sink: JobSink) -> io::Result<()>;
}

/// Runs requests with `tokio::process`. Each job gets its own thread driving
/// a current-thread runtime that streams both pipes and then awaits the exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellSpawner;

impl ShellSpawner {
    /// Create a spawner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Spawner for ShellSpawner {
    fn spawn(&mut self, request: &SpawnRequest, sink: JobSink) -> io::Result<()> {
        let request = request.clone();
        let (started_tx, started_rx) = mpsc::sync_channel(1);

        thread::Builder::new()
            .name(format!("run-panel-job-{}", sink.job().0))
            .spawn(move || {
                let runtime = match runtime::Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = started_tx.send(Err(err));
                        return;
                    }
                };
                runtime.block_on(run_job(&request, &sink, &started_tx));
            })?;

        started_rx
            .recv()
            .map_err(|_| io::Error::other("job thread ended before the process started"))?
    }
}

async fn run_job(
    request: &SpawnRequest,
    sink: &JobSink,
    started: &SyncSender<io::Result<()>>,
) {
    let mut cmd = Command::new(&request.shell);
    cmd.arg("-c")
        .arg(&request.command_line)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if request.clear_env {
        cmd.env_clear();
    }
    cmd.envs(&request.env);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            let _ = started.send(Err(err));
            return;
        }
    };
    let _ = started.send(Ok(()));
    debug!("spawned {:?} as pid {:?}", sink.job(), child.id());

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    // Both pipes are drained before the exit is announced so output is complete.
    let (status, (), ()) = tokio::join!(
        child.wait(),
        forward_lines(stdout, sink),
        forward_lines(stderr, sink)
    );
    match status {
        Ok(status) => sink.exited(status.code()),
        Err(err) => {
            warn!("waiting for {:?} failed: {err}", sink.job());
            sink.exited(None);
        }
    }
}

async fn forward_lines<R: AsyncRead + Unpin>(pipe: Option<R>, sink: &JobSink) {
    let Some(pipe) = pipe else {
        return;
    };
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if !sink.output(String::from_utf8_lossy(&buf)) {
                    break;
                }
            }
            Err(err) => {
                debug!("pipe read for {:?} stopped: {err}", sink.job());
                break;
            }
        }
    }
}
