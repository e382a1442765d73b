//! main.rs - Binary entry point for omni-run-panel
//!
//! Opens a terminal workspace with two editor windows and a command prompt.
//! Commands typed at the prompt run in the floating output panel, one at a
//! time.
//!
//! Usage:
//!   omni-run-panel [--config panel.yaml] [--run "make test"]
//!
//! Headless mode runs a single command without a TUI and prints its output:
//!   omni-run-panel --headless --run "ls -la"

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use omni_run_panel::{
    AppState, PanelConfig, PanelOverrides, Session, ShellSpawner, TuiRenderer, Workspace,
    load_overrides,
};

const NOTES: &str = "Type a shell command at the prompt and press Enter.\n\
Ctrl-o shows or hides the output panel.\n\
Tab moves between editor windows; arrows move the cursor.\n\
Focus and cursor come back here after every run.";

/// Omni Run Panel - run shell commands in a floating output panel
#[derive(clap::Parser, Debug)]
#[command(name = "omni-run-panel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML file with panel option overrides
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Command to run at startup
    #[arg(short, long)]
    run: Option<String>,

    /// Run `--run` without a TUI and print its output
    #[arg(long, default_value = "false")]
    headless: bool,

    /// Title shown in the top bar
    #[arg(long, default_value = "Omni Run Panel")]
    title: String,
}

fn load_config(path: Option<&PathBuf>) -> Result<Option<PanelOverrides>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let overrides = load_overrides(path)?;
    PanelConfig::default()
        .merge(overrides.clone())
        .validate()
        .with_context(|| format!("invalid panel configuration in {}", path.display()))?;
    info!("Loaded panel configuration from {}", path.display());
    Ok(Some(overrides))
}

fn build_session(workspace: Workspace, overrides: Option<PanelOverrides>) -> Session<Workspace> {
    let mut session = Session::new(workspace, ShellSpawner::new());
    session.setup(overrides);
    session
}

fn run_headless(overrides: Option<PanelOverrides>, command: &str) -> Result<()> {
    let mut session = build_session(Workspace::new(80, 24), overrides);
    session.run(command);
    while session.is_running() {
        session.wait_event(Duration::from_millis(100));
    }

    let Some(surface) = session.panel().surface() else {
        bail!("no output surface was created for `{command}`");
    };
    let output = session
        .host()
        .surface_text(surface)
        .context("output surface disappeared")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

fn run_tui(overrides: Option<PanelOverrides>, command: Option<&str>, title: String) -> Result<()> {
    let mut workspace = Workspace::new(80, 24);
    workspace.add_editor(NOTES);
    let mut session = build_session(workspace, overrides);

    let mut renderer = TuiRenderer::new()?;
    if let Some(command) = command {
        session.run(command);
    }
    let mut state = AppState::new(title, session);
    renderer.run(&mut state)?;

    info!("omni-run-panel shutdown complete");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    // Log output would tear through the alternate screen, keep the TUI quiet.
    omni_run_panel::init_logger(if args.headless { "info" } else { "error" });

    let overrides = load_config(args.config.as_ref())?;

    if args.headless {
        let Some(command) = args.run.as_deref() else {
            bail!("--headless needs a command to run (--run)");
        };
        return run_headless(overrides, command);
    }
    run_tui(overrides, args.run.as_deref(), args.title)
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_args_parsing_defaults() {
        let args = Args::parse_from(["omni-run-panel"]);
        assert!(args.config.is_none());
        assert!(args.run.is_none());
        assert!(!args.headless);
        assert_eq!(args.title, "Omni Run Panel");
    }

    #[test]
    fn test_args_parsing_headless() {
        let args = Args::parse_from([
            "omni-run-panel",
            "--headless",
            "--run",
            "echo hi",
            "--config",
            "/tmp/panel.yaml",
        ]);
        assert!(args.headless);
        assert_eq!(args.run.as_deref(), Some("echo hi"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/panel.yaml")));
    }

    #[test]
    fn test_load_config_without_path() {
        assert!(load_config(None).unwrap().is_none());
    }
}
