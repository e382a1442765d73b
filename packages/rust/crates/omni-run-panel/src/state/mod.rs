//! Application state for the terminal front end

use crate::event::TuiEvent;
use crate::session::Session;
use crate::workspace::Workspace;

const HELP: &str = "[Enter: Run] [Ctrl-o: Toggle panel] [Tab: Next window] [Ctrl-c: Quit]";

/// Main application state
pub struct AppState {
    title: String,
    session: Session<Workspace>,
    prompt: String,
    should_quit: bool,
}

impl AppState {
    /// Create a new application state around a session
    pub fn new(title: String, session: Session<Workspace>) -> Self {
        Self {
            title,
            session,
            prompt: String::new(),
            should_quit: false,
        }
    }

    /// Get title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the session
    pub fn session(&self) -> &Session<Workspace> {
        &self.session
    }

    /// Get the session mutably
    pub fn session_mut(&mut self) -> &mut Session<Workspace> {
        &mut self.session
    }

    /// Command line being typed
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Check if should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Status bar text: the running job, else the latest notification, else help
    pub fn status_line(&self) -> String {
        if let Some(job) = self.session.active_job() {
            return format!(
                "running `{}` since {}",
                job.command,
                job.started_at.format("%H:%M:%S")
            );
        }
        match self.session.host().last_notification() {
            Some(note) => format!("[{}] {}", note.level, note.message),
            None => HELP.to_string(),
        }
    }

    /// Handle tick event (called periodically)
    pub fn on_tick(&mut self) {
        self.session.pump();
    }

    /// Apply one input event
    pub fn handle_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Quit => self.quit(),
            TuiEvent::TogglePanel => {
                self.session.toggle();
            }
            TuiEvent::NextWindow => self.session.host_mut().focus_next_editor(),
            TuiEvent::Submit => {
                let command = std::mem::take(&mut self.prompt);
                let command = command.trim();
                if !command.is_empty() {
                    self.session.run(command);
                }
            }
            TuiEvent::CursorUp => self.session.host_mut().move_cursor(-1, 0),
            TuiEvent::CursorDown => self.session.host_mut().move_cursor(1, 0),
            TuiEvent::CursorLeft => self.session.host_mut().move_cursor(0, -1),
            TuiEvent::CursorRight => self.session.host_mut().move_cursor(0, 1),
            TuiEvent::Char(c) => self.prompt.push(c),
            TuiEvent::Backspace => {
                self.prompt.pop();
            }
            TuiEvent::Resize(cols, lines) => self.session.host_mut().resize(cols, lines),
            TuiEvent::Tick => self.on_tick(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use crate::test_support::ScriptedSpawner;

    fn state() -> (AppState, ScriptedSpawner) {
        let spawner = ScriptedSpawner::new();
        let session = Session::new(Workspace::new(80, 24), spawner.clone());
        (AppState::new("Test".to_string(), session), spawner)
    }

    #[test]
    fn test_app_state_creation() {
        let (state, _) = state();
        assert_eq!(state.title(), "Test");
        assert!(!state.should_quit());
        assert_eq!(state.status_line(), HELP);
    }

    #[test]
    fn test_typed_command_runs_on_submit() {
        let (mut state, spawner) = state();
        for c in "ls -l".chars() {
            state.handle_event(TuiEvent::Char(c));
        }
        state.handle_event(TuiEvent::Backspace);
        state.handle_event(TuiEvent::Char('a'));
        assert_eq!(state.prompt(), "ls -a");

        state.handle_event(TuiEvent::Submit);
        assert_eq!(state.prompt(), "");
        assert_eq!(spawner.spawn_count(), 1);
        assert!(state.status_line().contains("running `ls -a`"));
    }

    #[test]
    fn test_blank_submit_does_nothing() {
        let (mut state, spawner) = state();
        state.handle_event(TuiEvent::Char(' '));
        state.handle_event(TuiEvent::Submit);
        assert_eq!(spawner.spawn_count(), 0);
    }

    #[test]
    fn test_toggle_before_any_run_reports_no_output() {
        let (mut state, _) = state();
        state.handle_event(TuiEvent::TogglePanel);
        assert!(state.status_line().contains("no output to display yet"));
        assert_eq!(state.session().host().float_count(), 0);
    }

    #[test]
    fn test_tick_applies_exit() {
        let (mut state, spawner) = state();
        state.session_mut().run("true");
        spawner.finish(0, Some(0));
        state.handle_event(TuiEvent::Tick);
        assert!(!state.session().is_running());
    }

    #[test]
    fn test_resize_reaches_workspace() {
        let (mut state, _) = state();
        state.handle_event(TuiEvent::Resize(120, 40));
        assert_eq!(state.session().host().screen_size(), (120, 40));
    }

    #[test]
    fn test_app_state_quit() {
        let (mut state, _) = state();
        state.handle_event(TuiEvent::Quit);
        assert!(state.should_quit());
    }
}
