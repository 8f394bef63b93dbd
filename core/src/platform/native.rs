//! tao + wry implementation of [`WindowPlatform`].

use tao::window::{Theme, Window};
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{Rect, WebView};

use super::{WindowPlatform, WindowState};
use crate::error::PlatformError;
use crate::geometry::Thickness;

/// The shell's window and the webview hosted in it.
///
/// Owned by the chrome controller on the UI thread; dropping it closes both.
pub struct NativeWindow {
    webview: WebView,
    window: Window,
    border: Thickness,
}

impl NativeWindow {
    #[must_use]
    pub fn new(window: Window, webview: WebView) -> Self {
        Self {
            webview,
            window,
            border: Thickness::ZERO,
        }
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[must_use]
    pub fn webview(&self) -> &WebView {
        &self.webview
    }

    /// Runs a script in the page. Failures are logged, never fatal.
    pub fn evaluate_script(&self, script: &str) {
        if let Err(e) = self.webview.evaluate_script(script) {
            log::warn!("evaluate_script failed: {}", e);
        }
    }

    /// Fits the webview inside the window minus the current border.
    /// Call after every resize.
    pub fn relayout(&self) {
        let size = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        let b = self.border;
        let width = (size.width - b.horizontal()).max(0.0);
        let height = (size.height - b.vertical()).max(0.0);
        let bounds = Rect {
            position: LogicalPosition::new(b.left, b.top).into(),
            size: LogicalSize::new(width, height).into(),
        };
        if let Err(e) = self.webview.set_bounds(bounds) {
            log::debug!("webview set_bounds failed: {}", e);
        }
    }
}

impl WindowPlatform for NativeWindow {
    fn window_state(&self) -> WindowState {
        if self.window.is_minimized() {
            WindowState::Minimized
        } else if self.window.is_maximized() {
            WindowState::Maximized
        } else {
            WindowState::Normal
        }
    }

    fn set_window_state(&mut self, state: WindowState) {
        match state {
            WindowState::Normal => {
                self.window.set_minimized(false);
                self.window.set_maximized(false);
            }
            WindowState::Maximized => {
                self.window.set_minimized(false);
                self.window.set_maximized(true);
            }
            WindowState::Minimized => self.window.set_minimized(true),
        }
    }

    fn set_decorations(&mut self, decorated: bool) {
        self.window.set_decorations(decorated);
    }

    fn set_border(&mut self, border: Thickness) {
        self.border = border;
        self.relayout();
    }

    fn system_prefers_dark(&self) -> bool {
        crate::theme::system_prefers_dark()
    }

    fn set_dark_mode_attribute(&mut self, dark: bool) {
        self.window
            .set_theme(Some(if dark { Theme::Dark } else { Theme::Light }));
    }

    fn set_background(&mut self, (r, g, b): (u8, u8, u8)) {
        self.window.set_background_color(Some((r, g, b, 255)));
        if let Err(e) = self.webview.set_background_color((r, g, b, 255)) {
            log::debug!("webview set_background_color failed: {}", e);
        }
    }

    fn release_capture(&mut self) {
        if let Err(e) = self.window.set_cursor_grab(false) {
            log::debug!("release cursor grab failed: {}", e);
        }
    }

    fn begin_caption_drag(&mut self) -> Result<(), PlatformError> {
        self.window
            .drag_window()
            .map_err(|e| PlatformError(e.to_string()))
    }

    fn show(&mut self) {
        self.window.set_visible(true);
        self.window.set_focus();
    }
}
