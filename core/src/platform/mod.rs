//! Platform capability layer.
//!
//! Everything the chrome controller, theme handling and drag forwarding need
//! from the OS goes through [`WindowPlatform`]. The production implementation
//! wraps a tao window and its wry webview; tests use a recording fake.

mod native;

#[cfg(test)]
pub(crate) mod fake;

pub use native::NativeWindow;

use crate::error::PlatformError;
use crate::geometry::Thickness;

/// Window placement state as the OS reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// Native window operations used by the shell. All calls happen on the UI thread.
pub trait WindowPlatform {
    fn window_state(&self) -> WindowState;

    fn set_window_state(&mut self, state: WindowState);

    /// Shows or hides the OS-drawn frame (title bar and borders).
    fn set_decorations(&mut self, decorated: bool);

    /// Padding between the window edge and the webview surface.
    fn set_border(&mut self, border: Thickness);

    /// Current OS light/dark preference.
    fn system_prefers_dark(&self) -> bool;

    /// Dark-mode non-client rendering attribute (title bar and frame colors).
    fn set_dark_mode_attribute(&mut self, dark: bool);

    fn set_background(&mut self, rgb: (u8, u8, u8));

    /// Releases any active mouse capture or cursor grab.
    fn release_capture(&mut self);

    /// Hands the current mouse press to the OS as a caption (title bar) drag.
    fn begin_caption_drag(&mut self) -> Result<(), PlatformError>;

    fn show(&mut self);
}
