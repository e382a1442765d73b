//! End-to-end runs through a real shell.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use omni_run_panel::{
    JobEvent, JobId, JobSink, PanelOverrides, Session, SessionState, ShellSpawner, SpawnRequest,
    Spawner, Workspace,
};

const DEADLINE: Duration = Duration::from_secs(10);

fn run_to_completion(session: &mut Session<Workspace>) {
    let started = Instant::now();
    while session.is_running() {
        assert!(started.elapsed() < DEADLINE, "job did not finish in time");
        session.wait_event(Duration::from_millis(50));
    }
}

fn panel_text(session: &Session<Workspace>) -> String {
    let surface = session.panel().surface().unwrap();
    session.host().surface_text(surface).unwrap()
}

/// Test: echo output, preceded by the colored command echo
#[test]
fn test_echo_runs_through_session() {
    let mut session = Session::new(Workspace::new(80, 24), ShellSpawner::new());
    session.run("echo hi");
    assert_eq!(session.state(), SessionState::Running);

    run_to_completion(&mut session);

    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.panel().is_open(session.host()));
    let text = panel_text(&session);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "\x1b[0;32mecho hi\x1b[0m");
    assert_eq!(lines[1], "hi");
}

/// Test: stderr and non-zero exits are shown like anything else
#[test]
fn test_stderr_and_failure_are_captured() {
    let mut session = Session::new(Workspace::new(80, 24), ShellSpawner::new());
    session.run("echo oops >&2; exit 3");
    run_to_completion(&mut session);

    assert_eq!(session.state(), SessionState::Idle);
    assert!(panel_text(&session).contains("oops"));
}

/// Test: configured environment reaches the process
#[test]
fn test_env_overrides_are_applied() {
    let mut session = Session::new(Workspace::new(80, 24), ShellSpawner::new());
    session.setup(Some(PanelOverrides {
        env: Some(BTreeMap::from([(
            "RUN_PANEL_PROBE".to_string(),
            "probe-value".to_string(),
        )])),
        ..Default::default()
    }));
    session.run("echo \"$RUN_PANEL_PROBE\"");
    run_to_completion(&mut session);

    assert!(panel_text(&session).contains("\nprobe-value"));
}

/// Test: a shell that does not exist still ends the job
#[test]
fn test_missing_shell_ends_job() {
    let mut session = Session::new(Workspace::new(80, 24), ShellSpawner::new());
    session.setup(Some(PanelOverrides {
        shell: Some("/nonexistent/run-panel-shell".to_string()),
        ..Default::default()
    }));
    session.run("echo hi");
    run_to_completion(&mut session);

    assert!(panel_text(&session).contains("failed to start"));
}

/// Test: the spawner reports output before exit
#[test]
fn test_exit_comes_after_output() {
    let (tx, rx) = mpsc::channel();
    let request = SpawnRequest {
        shell: "sh".to_string(),
        command_line: "printf 'a\\nb\\n'".to_string(),
        clear_env: false,
        env: BTreeMap::new(),
    };
    ShellSpawner::new()
        .spawn(&request, JobSink::new(JobId(1), tx))
        .unwrap();

    let mut events = Vec::new();
    loop {
        let event = rx.recv_timeout(DEADLINE).unwrap();
        let done = matches!(event, JobEvent::Exited { .. });
        events.push(event);
        if done {
            break;
        }
    }
    let output: String = events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Output { text, .. } => Some(text.as_str()),
            JobEvent::Exited { .. } => None,
        })
        .collect();
    assert_eq!(output, "a\nb\n");
    assert_eq!(
        events.last(),
        Some(&JobEvent::Exited {
            job: JobId(1),
            code: Some(0)
        })
    );
}
