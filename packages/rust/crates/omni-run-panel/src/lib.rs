//! omni-run-panel - single-flight command runner panel for Omni Dev Fusion
//!
//! Runs one shell command at a time in a floating output panel, streams its
//! output live, and puts the user's focus and cursor back afterwards.
//! Collaborators hold one explicitly constructed [`Session`] and call
//! [`Session::run`], [`Session::toggle`], [`Session::open`] and
//! [`Session::close`]; window placement, output-surface lifecycle and job
//! concurrency stay inside this crate.

pub mod advisory;
pub mod components;
pub mod config;
pub mod dimension;
pub mod event;
pub mod host;
pub mod process;
pub mod renderer;
pub mod session;
pub mod state;
#[doc(hidden)]
pub mod test_support;
pub mod workspace;

pub use advisory::Advisory;
pub use components::{FocusMemento, Panel};
pub use config::{
    BorderStyle, ConfigError, DimensionOverrides, Dimensions, PanelConfig, PanelOverrides,
    load_overrides,
};
pub use dimension::{Dimension, compute};
pub use event::{Event, EventHandler, TuiEvent};
pub use host::{Cursor, FloatSpec, Host, HostError, SurfaceId, WindowId};
pub use process::{JobEvent, JobId, JobSink, ShellSpawner, SpawnRequest, Spawner};
pub use renderer::TuiRenderer;
pub use session::{ActiveJob, Session, SessionState};
pub use state::AppState;
pub use workspace::{Notification, Workspace};

/// Initialize logging from `RUST_LOG`, defaulting to `default_filter`
pub fn init_logger(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
