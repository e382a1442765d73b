//! Host environment primitives consumed by the panel and session.
//!
//! The session never talks to a terminal directly. Everything it needs from
//! the surrounding editing environment (surfaces, floating windows, focus,
//! cursor, screen size, notifications) goes through [`Host`].

use std::fmt;

use log::Level;
use thiserror::Error;

use crate::config::BorderStyle;
use crate::dimension::Dimension;

/// Handle of a window known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u64);

/// Handle of an output surface (the content buffer a window displays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win#{}", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Cursor position inside a window, zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Line index.
    pub line: usize,
    /// Column index.
    pub column: usize,
}

impl Cursor {
    /// Create a cursor position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Everything needed to open a floating window.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatSpec {
    /// Absolute geometry, unclamped.
    pub geometry: Dimension,
    /// Border drawn around the window.
    pub border: BorderStyle,
    /// Title shown in the border.
    pub title: String,
    /// Highlight color name.
    pub highlight: String,
    /// Opacity level, 0 (opaque) to 100.
    pub blend: u8,
    /// Whether the window takes focus when opened.
    pub focus: bool,
}

/// Failures reported by host primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Window handle does not refer to a live window.
    #[error("invalid window: {0}")]
    InvalidWindow(WindowId),

    /// Surface handle does not refer to a live surface.
    #[error("invalid surface: {0}")]
    InvalidSurface(SurfaceId),

    /// Cursor placed past the end of the window's surface.
    #[error("cursor line {line} outside {window}")]
    CursorOutOfRange {
        /// Target window.
        window: WindowId,
        /// Requested line.
        line: usize,
    },

    /// Geometry rejected by the windowing layer.
    #[error("invalid geometry: width={width} height={height}")]
    InvalidGeometry {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
}

/// Result type for host primitives.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// The editing environment a [`crate::Session`] runs inside.
pub trait Host {
    /// Current screen size as `(columns, lines)`.
    fn screen_size(&self) -> (u16, u16);

    /// Create a new, empty output surface.
    fn create_surface(&mut self) -> SurfaceId;

    /// Discard a surface and its content.
    fn delete_surface(&mut self, surface: SurfaceId) -> HostResult<()>;

    /// Whether the surface is still alive.
    fn is_surface_valid(&self, surface: SurfaceId) -> bool;

    /// Set the display marker of a surface.
    fn set_surface_tag(&mut self, surface: SurfaceId, tag: &str) -> HostResult<()>;

    /// Append a chunk of process output to a surface.
    fn append_output(&mut self, surface: SurfaceId, text: &str) -> HostResult<()>;

    /// Open a floating window showing `surface`.
    fn open_float(&mut self, surface: SurfaceId, spec: FloatSpec) -> HostResult<WindowId>;

    /// Bind an existing window to another surface.
    fn set_window_surface(&mut self, window: WindowId, surface: SurfaceId) -> HostResult<()>;

    /// Destroy a window. The surface it displayed is left alone.
    fn close_window(&mut self, window: WindowId) -> HostResult<()>;

    /// Whether the window is still alive.
    fn is_window_valid(&self, window: WindowId) -> bool;

    /// Window that currently has focus.
    fn current_window(&self) -> Option<WindowId>;

    /// Alternate ("previous") window, if the host tracks one.
    fn previous_window(&self) -> Option<WindowId>;

    /// Move focus to a window.
    fn focus_window(&mut self, window: WindowId) -> HostResult<()>;

    /// Cursor position inside a window.
    fn cursor(&self, window: WindowId) -> HostResult<Cursor>;

    /// Move the cursor inside a window.
    fn set_cursor(&mut self, window: WindowId, cursor: Cursor) -> HostResult<()>;

    /// Scroll a window so the last line of its surface is visible.
    fn scroll_to_end(&mut self, window: WindowId) -> HostResult<()>;

    /// Show a user-visible advisory.
    fn notify(&mut self, level: Level, message: &str);
}
