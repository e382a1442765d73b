//! Walk a session through run, toggle and exit without a terminal UI

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use omni_run_panel::{Host, Session, ShellSpawner, Workspace, init_logger};

/// Headless walkthrough of the run panel
#[derive(clap::Parser, Debug)]
#[command(name = "omni-run-panel-demo")]
#[command(author = "Omni Dev Fusion")]
#[command(version = "0.1.0")]
#[command(about = "Headless walkthrough of omni-run-panel", long_about = None)]
struct Args {
    /// Command to run
    #[arg(short, long, default_value = "for i in 1 2 3; do echo step $i; sleep 0.2; done")]
    command: String,
}

fn describe(step: &str, session: &Session<Workspace>) {
    let host = session.host();
    println!(
        "[{step}] state={:?} panel_open={} focus={:?}",
        session.state(),
        session.panel().is_open(host),
        host.current_window(),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logger("info");
    let args = Args::parse();

    println!("=== Omni Run Panel Demo ===");
    let mut workspace = Workspace::new(100, 30);
    workspace.add_editor("scratch buffer");
    let mut session = Session::new(workspace, ShellSpawner::new());
    session.setup(None);
    describe("setup", &session);

    session.run(&args.command);
    describe("run", &session);

    // A second request while the first is still going is dropped.
    session.run("echo never printed");

    session.toggle();
    describe("toggle", &session);

    while session.is_running() {
        session.wait_event(Duration::from_millis(100));
    }
    describe("exit", &session);

    if let Some(surface) = session.panel().surface() {
        println!();
        for line in session.host().surface_lines(surface).unwrap_or_default() {
            println!("  | {line}");
        }
    }
    println!();
    for note in session.host().notifications() {
        println!("[{}] {}", note.level, note.message);
    }
    Ok(())
}
