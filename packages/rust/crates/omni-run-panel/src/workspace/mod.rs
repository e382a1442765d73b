//! In-memory editing environment implementing [`Host`].
//!
//! Holds editor windows, floating windows and output surfaces. The terminal
//! front end renders it; tests drive it directly.

use std::collections::BTreeMap;

use log::Level;

use crate::host::{Cursor, FloatSpec, Host, HostError, HostResult, SurfaceId, WindowId};

/// Kind of a window in the workspace.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowKind {
    /// Tiled editing window.
    Editor,
    /// Floating overlay window.
    Float(FloatSpec),
}

/// A window and its view state.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    surface: SurfaceId,
    kind: WindowKind,
    cursor: Cursor,
    top_line: usize,
}

impl Window {
    /// Surface shown by this window.
    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Editor or float.
    #[must_use]
    pub fn kind(&self) -> &WindowKind {
        &self.kind
    }

    /// Float settings, `None` for editor windows.
    #[must_use]
    pub fn float_spec(&self) -> Option<&FloatSpec> {
        match &self.kind {
            WindowKind::Float(spec) => Some(spec),
            WindowKind::Editor => None,
        }
    }

    /// Cursor position.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// First visible line.
    #[must_use]
    pub fn top_line(&self) -> usize {
        self.top_line
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Surface {
    tag: String,
    lines: Vec<String>,
}

impl Surface {
    fn append(&mut self, text: &str) {
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            match self.lines.last_mut() {
                Some(last) => last.push_str(first.trim_end_matches('\r')),
                None => self.lines.push(first.trim_end_matches('\r').to_string()),
            }
        }
        for part in parts {
            self.lines.push(part.trim_end_matches('\r').to_string());
        }
    }
}

/// A notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Message text.
    pub message: String,
}

/// The in-memory host.
#[derive(Debug, Clone)]
pub struct Workspace {
    cols: u16,
    lines: u16,
    next_id: u64,
    surfaces: BTreeMap<SurfaceId, Surface>,
    windows: BTreeMap<WindowId, Window>,
    editors: Vec<WindowId>,
    current: Option<WindowId>,
    previous: Option<WindowId>,
    notifications: Vec<Notification>,
}

impl Workspace {
    /// Create a workspace with a single empty editor window that has focus.
    #[must_use]
    pub fn new(cols: u16, lines: u16) -> Self {
        let mut workspace = Self {
            cols,
            lines,
            next_id: 0,
            surfaces: BTreeMap::new(),
            windows: BTreeMap::new(),
            editors: Vec::new(),
            current: None,
            previous: None,
            notifications: Vec::new(),
        };
        let window = workspace.add_editor("");
        workspace.current = Some(window);
        workspace
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Add an editor window showing `text`. Focus does not move.
    pub fn add_editor(&mut self, text: &str) -> WindowId {
        let surface = self.create_surface();
        if let Some(buffer) = self.surfaces.get_mut(&surface) {
            buffer.lines = text.lines().map(str::to_string).collect();
        }
        let window = WindowId(self.next_id());
        self.windows.insert(
            window,
            Window {
                surface,
                kind: WindowKind::Editor,
                cursor: Cursor::default(),
                top_line: 0,
            },
        );
        self.editors.push(window);
        window
    }

    /// Change the screen size.
    pub fn resize(&mut self, cols: u16, lines: u16) {
        self.cols = cols;
        self.lines = lines;
    }

    /// Live editor windows, in creation order.
    #[must_use]
    pub fn editor_windows(&self) -> Vec<WindowId> {
        self.editors
            .iter()
            .copied()
            .filter(|window| self.windows.contains_key(window))
            .collect()
    }

    /// Live floating windows.
    #[must_use]
    pub fn float_windows(&self) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|(_, window)| window.float_spec().is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of live floating windows.
    #[must_use]
    pub fn float_count(&self) -> usize {
        self.float_windows().len()
    }

    /// Look up a window.
    #[must_use]
    pub fn window(&self, window: WindowId) -> Option<&Window> {
        self.windows.get(&window)
    }

    /// Surface shown by a window.
    #[must_use]
    pub fn window_surface(&self, window: WindowId) -> Option<SurfaceId> {
        self.windows.get(&window).map(Window::surface)
    }

    /// Number of live surfaces, editors included.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Display marker of a surface.
    #[must_use]
    pub fn surface_tag(&self, surface: SurfaceId) -> Option<&str> {
        self.surfaces.get(&surface).map(|s| s.tag.as_str())
    }

    /// Lines of a surface.
    #[must_use]
    pub fn surface_lines(&self, surface: SurfaceId) -> Option<&[String]> {
        self.surfaces.get(&surface).map(|s| s.lines.as_slice())
    }

    /// Whole content of a surface, lines joined by newlines.
    #[must_use]
    pub fn surface_text(&self, surface: SurfaceId) -> Option<String> {
        self.surface_lines(surface).map(|lines| lines.join("\n"))
    }

    /// Notifications shown so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Most recent notification.
    #[must_use]
    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// Focus the editor window after the current one, wrapping around.
    pub fn focus_next_editor(&mut self) {
        let editors = self.editor_windows();
        if editors.is_empty() {
            return;
        }
        let next = self
            .current
            .and_then(|current| editors.iter().position(|w| *w == current))
            .map_or(0, |pos| (pos + 1) % editors.len());
        let _ = self.focus_window(editors[next]);
    }

    /// Move the cursor of the focused window by a line/column delta,
    /// staying inside the surface.
    pub fn move_cursor(&mut self, lines: isize, columns: isize) {
        let Some(current) = self.current else {
            return;
        };
        let Some(window) = self.windows.get(&current) else {
            return;
        };
        let content = self
            .surfaces
            .get(&window.surface)
            .map(|s| s.lines.as_slice())
            .unwrap_or_default();
        let max_line = content.len().saturating_sub(1);
        let line = window.cursor.line.saturating_add_signed(lines).min(max_line);
        let max_col = content.get(line).map_or(0, |l| l.chars().count());
        let column = window.cursor.column.saturating_add_signed(columns).min(max_col);
        let _ = self.set_cursor(current, Cursor::new(line, column));
    }

    fn visible_height(&self, window: &Window) -> usize {
        match &window.kind {
            WindowKind::Float(spec) => usize::try_from(spec.geometry.height).unwrap_or(1),
            WindowKind::Editor => usize::from(self.lines.saturating_sub(2)),
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl Host for Workspace {
    fn screen_size(&self) -> (u16, u16) {
        (self.cols, self.lines)
    }

    fn create_surface(&mut self) -> SurfaceId {
        let surface = SurfaceId(self.next_id());
        self.surfaces.insert(surface, Surface::default());
        surface
    }

    fn delete_surface(&mut self, surface: SurfaceId) -> HostResult<()> {
        self.surfaces
            .remove(&surface)
            .ok_or(HostError::InvalidSurface(surface))?;
        let orphaned: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|(_, window)| window.surface == surface)
            .map(|(id, _)| *id)
            .collect();
        for window in orphaned {
            let _ = self.close_window(window);
        }
        Ok(())
    }

    fn is_surface_valid(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface)
    }

    fn set_surface_tag(&mut self, surface: SurfaceId, tag: &str) -> HostResult<()> {
        let buffer = self
            .surfaces
            .get_mut(&surface)
            .ok_or(HostError::InvalidSurface(surface))?;
        buffer.tag = tag.to_string();
        Ok(())
    }

    fn append_output(&mut self, surface: SurfaceId, text: &str) -> HostResult<()> {
        self.surfaces
            .get_mut(&surface)
            .ok_or(HostError::InvalidSurface(surface))?
            .append(text);
        Ok(())
    }

    fn open_float(&mut self, surface: SurfaceId, spec: FloatSpec) -> HostResult<WindowId> {
        if !self.is_surface_valid(surface) {
            return Err(HostError::InvalidSurface(surface));
        }
        let geometry = spec.geometry;
        if geometry.width < 1 || geometry.height < 1 {
            return Err(HostError::InvalidGeometry {
                width: geometry.width,
                height: geometry.height,
            });
        }
        let focus = spec.focus;
        let window = WindowId(self.next_id());
        self.windows.insert(
            window,
            Window {
                surface,
                kind: WindowKind::Float(spec),
                cursor: Cursor::default(),
                top_line: 0,
            },
        );
        if focus {
            self.focus_window(window)?;
        }
        Ok(window)
    }

    fn set_window_surface(&mut self, window: WindowId, surface: SurfaceId) -> HostResult<()> {
        if !self.is_surface_valid(surface) {
            return Err(HostError::InvalidSurface(surface));
        }
        let entry = self
            .windows
            .get_mut(&window)
            .ok_or(HostError::InvalidWindow(window))?;
        entry.surface = surface;
        entry.cursor = Cursor::default();
        entry.top_line = 0;
        Ok(())
    }

    fn close_window(&mut self, window: WindowId) -> HostResult<()> {
        self.windows
            .remove(&window)
            .ok_or(HostError::InvalidWindow(window))?;
        if self.previous == Some(window) {
            self.previous = None;
        }
        if self.current == Some(window) {
            self.current = self
                .previous
                .take()
                .or_else(|| self.editor_windows().first().copied());
        }
        Ok(())
    }

    fn is_window_valid(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    fn current_window(&self) -> Option<WindowId> {
        self.current
    }

    fn previous_window(&self) -> Option<WindowId> {
        self.previous.filter(|window| self.is_window_valid(*window))
    }

    fn focus_window(&mut self, window: WindowId) -> HostResult<()> {
        if !self.is_window_valid(window) {
            return Err(HostError::InvalidWindow(window));
        }
        if self.current != Some(window) {
            self.previous = self.current;
            self.current = Some(window);
        }
        Ok(())
    }

    fn cursor(&self, window: WindowId) -> HostResult<Cursor> {
        self.windows
            .get(&window)
            .map(Window::cursor)
            .ok_or(HostError::InvalidWindow(window))
    }

    fn set_cursor(&mut self, window: WindowId, cursor: Cursor) -> HostResult<()> {
        let surface = self
            .windows
            .get(&window)
            .ok_or(HostError::InvalidWindow(window))?
            .surface;
        let line_count = self.surfaces.get(&surface).map_or(0, |s| s.lines.len());
        if cursor.line >= line_count.max(1) {
            return Err(HostError::CursorOutOfRange {
                window,
                line: cursor.line,
            });
        }
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.cursor = cursor;
        }
        Ok(())
    }

    fn scroll_to_end(&mut self, window: WindowId) -> HostResult<()> {
        let entry = self
            .windows
            .get(&window)
            .ok_or(HostError::InvalidWindow(window))?;
        let height = self.visible_height(entry).max(1);
        let line_count = self.surfaces.get(&entry.surface).map_or(0, |s| s.lines.len());
        let last = line_count.saturating_sub(1);
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.top_line = line_count.saturating_sub(height);
            entry.cursor = Cursor::new(last, 0);
        }
        Ok(())
    }

    fn notify(&mut self, level: Level, message: &str) {
        self.notifications.push(Notification {
            level,
            message: message.to_string(),
        });
    }
}
