use log::{debug, warn};

use super::memento::{FocusMemento, restore_focus};
use crate::advisory::Advisory;
use crate::config::PanelConfig;
use crate::dimension;
use crate::host::{FloatSpec, Host, HostResult, SurfaceId, WindowId};

/// The floating output panel: at most one window and one output surface.
///
/// The window can be closed while the surface lives on, so output survives
/// the panel being hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    window: Option<WindowId>,
    surface: Option<SurfaceId>,
}

impl Panel {
    /// Create a panel with neither window nor surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Window handle, if one was recorded.
    #[must_use]
    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    /// Surface currently bound to the panel.
    #[must_use]
    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// The recorded window, if it is still alive.
    pub fn valid_window<H: Host + ?Sized>(&self, host: &H) -> Option<WindowId> {
        self.window.filter(|window| host.is_window_valid(*window))
    }

    /// Whether the panel is visible.
    pub fn is_open<H: Host + ?Sized>(&self, host: &H) -> bool {
        self.valid_window(host).is_some()
    }

    /// Open an unfocused floating window on `surface`, sized for the current
    /// screen. Focus is left alone.
    ///
    /// # Errors
    ///
    /// Propagates the host's refusal (e.g. degenerate geometry).
    pub fn create_and_open<H: Host + ?Sized>(
        &self,
        host: &mut H,
        config: &PanelConfig,
        surface: SurfaceId,
    ) -> HostResult<WindowId> {
        let (cols, lines) = host.screen_size();
        let geometry = dimension::compute(cols, lines, &config.dimensions);
        debug!("opening panel at {geometry:?} on {cols}x{lines}");
        host.open_float(
            surface,
            FloatSpec {
                geometry,
                border: config.border,
                title: config.title.clone(),
                highlight: config.highlight.clone(),
                blend: config.blend,
                focus: false,
            },
        )
    }

    /// Show the panel on the current surface, scrolled to the end.
    ///
    /// # Errors
    ///
    /// [`Advisory::NoOutputYet`] when nothing was ever run,
    /// [`Advisory::WindowFailed`] when the host refuses the window.
    pub fn open<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        config: &PanelConfig,
    ) -> Result<(), Advisory> {
        if self.is_open(host) {
            return Ok(());
        }
        let surface = self
            .surface
            .filter(|surface| host.is_surface_valid(*surface))
            .ok_or(Advisory::NoOutputYet)?;

        let window = self
            .create_and_open(host, config, surface)
            .map_err(Advisory::WindowFailed)?;

        let memento = FocusMemento::remember(host);
        if let Err(err) = host.focus_window(window) {
            warn!("could not focus panel {window}: {err}");
        }
        if let Err(err) = host.scroll_to_end(window) {
            warn!("could not scroll panel {window}: {err}");
        }
        restore_focus(memento, host);

        self.window = Some(window);
        Ok(())
    }

    /// Destroy the window, keeping the surface and its content.
    pub fn close<H: Host + ?Sized>(&mut self, host: &mut H) {
        if let Some(window) = self.valid_window(host)
            && let Err(err) = host.close_window(window)
        {
            warn!("could not close panel {window}: {err}");
        }
        self.window = None;
    }

    /// Close when visible, open otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`Panel::open`].
    pub fn toggle<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        config: &PanelConfig,
    ) -> Result<(), Advisory> {
        if self.is_open(host) {
            self.close(host);
            Ok(())
        } else {
            self.open(host, config)
        }
    }

    /// Bind a fresh, tagged surface to the panel and make sure a window shows
    /// it. A live window is rebound; otherwise a new one is opened. The
    /// previous surface is discarded.
    ///
    /// # Errors
    ///
    /// [`Advisory::WindowFailed`] when no window could show the new surface;
    /// the panel is left as it was.
    pub fn attach_fresh_surface<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        config: &PanelConfig,
    ) -> Result<(SurfaceId, WindowId), Advisory> {
        let surface = host.create_surface();
        if let Err(err) = host.set_surface_tag(surface, &config.surface_tag) {
            debug!("could not tag {surface}: {err}");
        }

        let bound = match self.valid_window(host) {
            Some(window) => host
                .set_window_surface(window, surface)
                .map(|()| window),
            None => self.create_and_open(host, config, surface),
        };
        let window = match bound {
            Ok(window) => window,
            Err(err) => {
                if let Err(cleanup) = host.delete_surface(surface) {
                    debug!("could not discard unused {surface}: {cleanup}");
                }
                return Err(Advisory::WindowFailed(err));
            }
        };

        if let Some(old) = self.surface.replace(surface)
            && let Err(err) = host.delete_surface(old)
        {
            debug!("could not discard {old}: {err}");
        }
        self.window = Some(window);
        Ok((surface, window))
    }
}
