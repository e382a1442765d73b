//! The run session: single-flight job execution around the output panel.
//!
//! A [`Session`] owns the configuration, the [`Panel`], the host environment
//! and the process spawner. It is Idle until [`Session::run`] starts a job and
//! returns to Idle when that job's process exits, whatever the exit code.
//! Job events are applied on the caller's loop through [`Session::pump`].

mod command;

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, info, warn};

use crate::advisory::Advisory;
use crate::components::{FocusMemento, Panel, restore_focus};
use crate::config::{PanelConfig, PanelOverrides};
use crate::host::{Host, SurfaceId};
use crate::process::{JobEvent, JobId, JobSink, SpawnRequest, Spawner};

pub use command::compose_command_line;

/// Job state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No job in flight.
    Idle,
    /// Exactly one job in flight.
    Running,
}

/// The job currently in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    /// Job identifier.
    pub id: JobId,
    /// Command as submitted by the caller.
    pub command: String,
    /// Surface receiving the output.
    pub surface: SurfaceId,
    /// Start time.
    pub started_at: DateTime<Local>,
}

/// Single-flight command runner bound to one host.
pub struct Session<H: Host> {
    config: PanelConfig,
    panel: Panel,
    host: H,
    spawner: Box<dyn Spawner>,
    job: Option<ActiveJob>,
    next_job: u64,
    events_tx: Sender<JobEvent>,
    events_rx: Receiver<JobEvent>,
}

impl<H: Host> Session<H> {
    /// Create an idle session with default configuration.
    pub fn new(host: H, spawner: impl Spawner + 'static) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            config: PanelConfig::default(),
            panel: Panel::new(),
            host,
            spawner: Box::new(spawner),
            job: None,
            next_job: 0,
            events_tx,
            events_rx,
        }
    }

    /// Effective configuration.
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// The panel.
    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// The host environment.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host environment.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current job state.
    pub fn state(&self) -> SessionState {
        if self.job.is_some() {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    /// Whether a job is in flight.
    pub fn is_running(&self) -> bool {
        self.job.is_some()
    }

    /// The job in flight, if any.
    pub fn active_job(&self) -> Option<&ActiveJob> {
        self.job.as_ref()
    }

    /// Apply caller overrides on top of the defaults.
    ///
    /// Without overrides the defaults stay and a `ConfigSkipped` advisory is
    /// shown.
    pub fn setup(&mut self, overrides: Option<PanelOverrides>) -> &mut Self {
        match overrides {
            Some(overrides) => {
                self.config = PanelConfig::default().merge(overrides);
                debug!("panel configured: {:?}", self.config);
            }
            None => Advisory::ConfigSkipped.emit(&mut self.host),
        }
        self
    }

    /// Run a shell command in the panel.
    ///
    /// `command` is a complete shell command line; quoting is the caller's
    /// job. While another job is in flight the command is dropped with a
    /// `Busy` advisory.
    pub fn run(&mut self, command: &str) -> &mut Self {
        if self.job.is_some() {
            Advisory::Busy {
                command: command.to_string(),
            }
            .emit(&mut self.host);
            return self;
        }

        let (surface, window) = match self
            .panel
            .attach_fresh_surface(&mut self.host, &self.config)
        {
            Ok(bound) => bound,
            Err(advisory) => {
                advisory.emit(&mut self.host);
                return self;
            }
        };

        let memento = FocusMemento::remember(&self.host);
        if let Err(err) = self.host.focus_window(window) {
            warn!("could not focus panel {window}: {err}");
        }

        self.next_job += 1;
        let id = JobId(self.next_job);
        let request = SpawnRequest {
            shell: self.config.shell.clone(),
            command_line: compose_command_line(command),
            clear_env: self.config.clear_env,
            env: self.config.env.clone(),
        };
        let sink = JobSink::new(id, self.events_tx.clone());
        if let Err(err) = self.spawner.spawn(&request, sink.clone()) {
            warn!("failed to start `{command}` with {}: {err}", request.shell);
            sink.output(format!("failed to start {}: {err}\n", request.shell));
            sink.exited(None);
        }

        info!("started {id:?}: {command}");
        self.job = Some(ActiveJob {
            id,
            command: command.to_string(),
            surface,
            started_at: Local::now(),
        });
        // Spawning may reset the marker on some hosts.
        if let Err(err) = self.host.set_surface_tag(surface, &self.config.surface_tag) {
            debug!("could not re-tag {surface}: {err}");
        }
        restore_focus(memento, &mut self.host);
        self
    }

    /// Show the panel if it is hidden.
    pub fn open(&mut self) -> &mut Self {
        if let Err(advisory) = self.panel.open(&mut self.host, &self.config) {
            advisory.emit(&mut self.host);
        }
        self
    }

    /// Hide the panel. Output and any running job are unaffected.
    pub fn close(&mut self) -> &mut Self {
        self.panel.close(&mut self.host);
        self
    }

    /// Hide the panel when visible, show it otherwise.
    pub fn toggle(&mut self) -> &mut Self {
        if let Err(advisory) = self.panel.toggle(&mut self.host, &self.config) {
            advisory.emit(&mut self.host);
        }
        self
    }

    /// Apply every pending job event without blocking.
    pub fn pump(&mut self) -> &mut Self {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
        self
    }

    /// Wait up to `timeout` for a job event, then apply everything pending.
    pub fn wait_event(&mut self, timeout: Duration) -> &mut Self {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                self.pump()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => self,
        }
    }

    fn handle_event(&mut self, event: JobEvent) {
        match event {
            JobEvent::Output { job, text } => {
                let Some(active) = self.job.as_ref().filter(|active| active.id == job) else {
                    debug!("dropping output of finished {job:?}");
                    return;
                };
                if let Err(err) = self.host.append_output(active.surface, &text) {
                    debug!("output of {job:?} lost: {err}");
                }
            }
            JobEvent::Exited { job, code } => {
                if self.job.as_ref().is_none_or(|active| active.id != job) {
                    debug!("ignoring exit of unknown {job:?}");
                    return;
                }
                if let Some(active) = self.job.take() {
                    let elapsed = Local::now().signed_duration_since(active.started_at);
                    info!(
                        "finished {job:?} ({}) with {code:?} after {}ms",
                        active.command,
                        elapsed.num_milliseconds()
                    );
                }
                // Reopening is what scrolls the view to the latest output.
                self.panel.close(&mut self.host);
                if let Err(advisory) = self.panel.open(&mut self.host, &self.config) {
                    advisory.emit(&mut self.host);
                }
            }
        }
    }
}
