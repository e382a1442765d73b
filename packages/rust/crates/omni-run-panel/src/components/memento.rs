use log::debug;

use crate::host::{Cursor, Host, WindowId};

/// Focus and cursor context captured before a transient focus change.
///
/// Restoring consumes the memento, so each capture is applied at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusMemento {
    window: WindowId,
    alternate: Option<WindowId>,
    cursor: Cursor,
}

impl FocusMemento {
    /// Capture the focused window, the alternate window and the cursor.
    ///
    /// Returns `None` when nothing has focus.
    pub fn remember<H: Host + ?Sized>(host: &H) -> Option<Self> {
        let window = host.current_window()?;
        let cursor = host.cursor(window).unwrap_or_default();
        Some(Self {
            window,
            alternate: host.previous_window(),
            cursor,
        })
    }

    /// Window that had focus at capture time.
    #[must_use]
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Alternate window at capture time.
    #[must_use]
    pub fn alternate(&self) -> Option<WindowId> {
        self.alternate
    }

    /// Cursor at capture time.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Put focus and cursor back where they were. Best-effort: every failure
    /// is logged and dropped.
    pub fn restore<H: Host + ?Sized>(self, host: &mut H) {
        // Visiting the alternate first leaves it as the new "previous" window.
        if let Some(alternate) = self.alternate
            && let Err(err) = host.focus_window(alternate)
        {
            debug!("focus restore: alternate {alternate} skipped: {err}");
        }

        if !host.is_window_valid(self.window) {
            debug!("focus restore: {} no longer exists", self.window);
            return;
        }
        if let Err(err) = host.focus_window(self.window) {
            debug!("focus restore: {} skipped: {err}", self.window);
            return;
        }
        if let Err(err) = host.set_cursor(self.window, self.cursor) {
            debug!("focus restore: cursor in {} skipped: {err}", self.window);
        }
    }
}

/// Restore an optional memento; `None` is a no-op.
pub fn restore_focus<H: Host + ?Sized>(memento: Option<FocusMemento>, host: &mut H) {
    if let Some(memento) = memento {
        memento.restore(host);
    }
}
