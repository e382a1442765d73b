//! Event handling for TUI - Keyboard input and timing events

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

/// TUI-specific event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// Ctrl-o pressed - toggle the output panel
    TogglePanel,
    /// Ctrl-c pressed - exit
    Quit,
    /// Tab pressed - focus the next editor window
    NextWindow,
    /// Enter pressed - run the typed command
    Submit,
    /// Arrow keys - move the cursor of the focused window
    CursorUp,
    /// Arrow down
    CursorDown,
    /// Arrow left
    CursorLeft,
    /// Arrow right
    CursorRight,
    /// Window resize
    Resize(u16, u16),
    /// Character input
    Char(char),
    /// Backspace
    Backspace,
    /// Tick event (periodic)
    Tick,
}

impl TuiEvent {
    /// Check if this is a quit event
    pub fn is_quit(&self) -> bool {
        self == &TuiEvent::Quit
    }
}

/// Event from the input system
#[derive(Debug, Clone)]
pub enum Event {
    /// Input event (keyboard, resize)
    Input(TuiEvent),
    /// Periodic tick
    Tick,
    /// Error occurred
    Error(String),
}

/// Convert Crossterm event to TuiEvent
pub fn map_crossterm_event(event: CrosstermEvent) -> Option<TuiEvent> {
    match event {
        CrosstermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => {
            if modifiers.contains(KeyModifiers::CONTROL) {
                return match code {
                    KeyCode::Char('o') => Some(TuiEvent::TogglePanel),
                    KeyCode::Char('c') => Some(TuiEvent::Quit),
                    _ => None,
                };
            }
            match code {
                KeyCode::Tab => Some(TuiEvent::NextWindow),
                KeyCode::Enter => Some(TuiEvent::Submit),
                KeyCode::Up => Some(TuiEvent::CursorUp),
                KeyCode::Down => Some(TuiEvent::CursorDown),
                KeyCode::Left => Some(TuiEvent::CursorLeft),
                KeyCode::Right => Some(TuiEvent::CursorRight),
                KeyCode::Backspace => Some(TuiEvent::Backspace),
                KeyCode::Char(c) => Some(TuiEvent::Char(c)),
                _ => None,
            }
        }
        CrosstermEvent::Resize(width, height) => Some(TuiEvent::Resize(width, height)),
        _ => None,
    }
}

/// Event handler configuration
#[derive(Debug, Clone)]
pub struct EventHandlerConfig {
    /// Tick rate; job output is applied once per tick
    pub tick_rate: Duration,
}

impl Default for EventHandlerConfig {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }
}

/// Event handler for TUI
pub struct EventHandler {
    receiver: mpsc::Receiver<Event>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(config: EventHandlerConfig) -> Self {
        let (sender, receiver) = mpsc::channel();

        // Spawn input thread
        let tick_rate = config.tick_rate;
        thread::spawn(move || {
            let mut last_tick = Instant::now();

            loop {
                // Calculate time until next tick
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());

                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(raw) => {
                            if let Some(tui_event) = map_crossterm_event(raw) {
                                let quit = tui_event.is_quit();
                                if sender.send(Event::Input(tui_event)).is_err() || quit {
                                    break;
                                }
                            }
                        }
                        Err(err) => {
                            let _ = sender.send(Event::Error(format!("Failed to read event: {err}")));
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(err) => {
                        let _ = sender.send(Event::Error(format!("Failed to poll events: {err}")));
                        break;
                    }
                }

                // Check if tick should fire
                if last_tick.elapsed() >= tick_rate {
                    if sender.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { receiver }
    }

    /// Receive the next event (blocking)
    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_next(&self) -> Result<Option<Event>, mpsc::TryRecvError> {
        self.receiver.try_recv().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_tui_event_quit() {
        assert!(TuiEvent::Quit.is_quit());
        assert!(!TuiEvent::TogglePanel.is_quit());
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(
            map_crossterm_event(key(KeyCode::Char('o'), KeyModifiers::CONTROL)),
            Some(TuiEvent::TogglePanel)
        );
        assert_eq!(
            map_crossterm_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(TuiEvent::Quit)
        );
        assert_eq!(
            map_crossterm_event(key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            map_crossterm_event(key(KeyCode::Char('o'), KeyModifiers::NONE)),
            Some(TuiEvent::Char('o'))
        );
        assert_eq!(
            map_crossterm_event(key(KeyCode::Enter, KeyModifiers::NONE)),
            Some(TuiEvent::Submit)
        );
        assert_eq!(
            map_crossterm_event(CrosstermEvent::Resize(100, 30)),
            Some(TuiEvent::Resize(100, 30))
        );
    }

    #[test]
    fn test_event_handler_config() {
        let config = EventHandlerConfig::default();
        assert_eq!(config.tick_rate, Duration::from_millis(100));
    }
}
