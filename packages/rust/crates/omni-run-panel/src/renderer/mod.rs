//! TUI Renderer - Main rendering loop and terminal management

mod ansi;

pub use ansi::styled_line;

use crate::{
    config::BorderStyle,
    event::{Event, EventHandler, EventHandlerConfig},
    host::{FloatSpec, Host, WindowId},
    state::AppState,
    workspace::Workspace,
};
use anyhow::Context;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::warn;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::io::stdout;

/// TUI Renderer using Crossterm backend
pub struct TuiRenderer {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    event_handler: EventHandler,
}

impl TuiRenderer {
    /// Create a new TUI renderer
    pub fn new() -> Result<Self, anyhow::Error> {
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout(), EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend).context("failed to create terminal")?;

        let event_handler = EventHandler::new(EventHandlerConfig::default());

        Ok(Self {
            terminal,
            event_handler,
        })
    }

    /// Run the main event loop
    pub fn run(&mut self, state: &mut AppState) -> Result<(), anyhow::Error> {
        let size = self.terminal.size()?;
        state
            .session_mut()
            .host_mut()
            .resize(size.width, size.height);

        loop {
            // Apply job output before drawing
            state.on_tick();

            self.terminal.draw(|f| {
                Self::render_frame(f, state);
            })?;

            match self.event_handler.next() {
                Ok(Event::Input(event)) => state.handle_event(event),
                Ok(Event::Tick) => state.on_tick(),
                Ok(Event::Error(err)) => warn!("input error: {err}"),
                Err(_) => {
                    // Channel closed, exit
                    break;
                }
            }

            if state.should_quit() {
                break;
            }
        }

        Self::restore_terminal()
    }

    /// Restore terminal to normal mode
    pub fn restore_terminal() -> Result<(), anyhow::Error> {
        disable_raw_mode()?;
        execute!(stdout(), LeaveAlternateScreen)?;
        Ok(())
    }

    /// Render a single frame
    pub fn render_frame(f: &mut Frame, state: &AppState) {
        let area = f.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(state.title()).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(title, rows[0]);

        let workspace = state.session().host();
        Self::render_editors(f, rows[1], workspace);

        let prompt = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Green)),
            Span::raw(state.prompt()),
        ]));
        f.render_widget(prompt, rows[2]);

        let status = Paragraph::new(state.status_line())
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(status, rows[3]);

        // Floats are drawn last so they overlay everything else
        for window in workspace.float_windows() {
            Self::render_float(f, area, workspace, window);
        }
    }

    fn render_editors(f: &mut Frame, area: Rect, workspace: &Workspace) {
        let editors = workspace.editor_windows();
        if editors.is_empty() {
            return;
        }
        let constraints: Vec<Constraint> = editors
            .iter()
            .map(|_| Constraint::Ratio(1, u32::try_from(editors.len()).unwrap_or(1)))
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        let focused = workspace.current_window();
        for (index, (window, chunk)) in editors.iter().zip(chunks.iter()).enumerate() {
            let Some(view) = workspace.window(*window) else {
                continue;
            };
            let is_focused = focused == Some(*window);
            let border_style = if is_focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" editor {} ", index + 1))
                .border_style(border_style);

            let cursor = view.cursor();
            let lines: Vec<Line> = workspace
                .surface_lines(view.surface())
                .unwrap_or_default()
                .iter()
                .enumerate()
                .map(|(number, text)| {
                    if is_focused && number == cursor.line {
                        cursor_line(text, cursor.column)
                    } else {
                        Line::raw(text.clone())
                    }
                })
                .collect();
            let lines = if lines.is_empty() && is_focused {
                vec![cursor_line("", 0)]
            } else {
                lines
            };

            let scroll = u16::try_from(view.top_line()).unwrap_or(u16::MAX);
            f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), *chunk);
        }
    }

    fn render_float(f: &mut Frame, area: Rect, workspace: &Workspace, window: WindowId) {
        let Some(view) = workspace.window(window) else {
            return;
        };
        let Some(spec) = view.float_spec() else {
            return;
        };
        let Some(rect) = float_rect(spec, area) else {
            return;
        };

        let mut style = spec
            .highlight
            .parse::<Color>()
            .map(|color| Style::default().fg(color))
            .unwrap_or_default();
        if spec.blend >= 50 {
            style = style.add_modifier(Modifier::DIM);
        }

        let block = match border_type(spec.border) {
            Some(kind) => Block::default()
                .borders(Borders::ALL)
                .border_type(kind)
                .title(spec.title.as_str()),
            None => Block::default(),
        };
        let block = if workspace.current_window() == Some(window) {
            block.border_style(Style::default().fg(Color::Cyan))
        } else {
            block.border_style(style)
        };

        let height = usize::from(rect.height);
        let lines: Vec<Line> = workspace
            .surface_lines(view.surface())
            .unwrap_or_default()
            .iter()
            .skip(view.top_line())
            .take(height)
            .map(|text| styled_line(text, style))
            .collect();

        f.render_widget(Clear, rect);
        f.render_widget(Paragraph::new(lines).block(block).style(style), rect);
    }
}

impl Drop for TuiRenderer {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
    }
}

fn border_type(border: BorderStyle) -> Option<BorderType> {
    match border {
        BorderStyle::None => None,
        BorderStyle::Single => Some(BorderType::Plain),
        BorderStyle::Double => Some(BorderType::Double),
        BorderStyle::Rounded => Some(BorderType::Rounded),
        BorderStyle::Solid | BorderStyle::Shadow => Some(BorderType::Thick),
    }
}

/// Screen rectangle of a float, border included, clipped to `area`.
/// `None` when nothing of it is on screen.
fn float_rect(spec: &FloatSpec, area: Rect) -> Option<Rect> {
    let geometry = spec.geometry;
    let border = if spec.border == BorderStyle::None { 0 } else { 2 };
    let left = i64::from(geometry.col);
    let top = i64::from(geometry.row);
    let right = left + i64::from(geometry.width) + border;
    let bottom = top + i64::from(geometry.height) + border;

    let x0 = left.max(i64::from(area.x));
    let y0 = top.max(i64::from(area.y));
    let x1 = right.min(i64::from(area.right()));
    let y1 = bottom.min(i64::from(area.bottom()));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Rect::new(
        u16::try_from(x0).ok()?,
        u16::try_from(y0).ok()?,
        u16::try_from(x1 - x0).ok()?,
        u16::try_from(y1 - y0).ok()?,
    ))
}

fn cursor_line(text: &str, column: usize) -> Line<'static> {
    let before: String = text.chars().take(column).collect();
    let at: String = text.chars().nth(column).map_or(" ".to_string(), String::from);
    let after: String = text.chars().skip(column + 1).collect();
    Line::from(vec![
        Span::raw(before),
        Span::styled(at, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ])
}
