//! Recording platform used by unit tests.

use super::{WindowPlatform, WindowState};
use crate::error::PlatformError;
use crate::geometry::Thickness;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetWindowState(WindowState),
    SetDecorations(bool),
    SetBorder(Thickness),
    SetDarkMode(bool),
    SetBackground((u8, u8, u8)),
    ReleaseCapture,
    CaptionDrag,
    Show,
}

#[derive(Debug, Default)]
pub struct FakePlatform {
    pub state: WindowState,
    pub decorated: bool,
    pub border: Thickness,
    pub dark: bool,
    pub dark_attribute: bool,
    pub background: Option<(u8, u8, u8)>,
    pub visible: bool,
    pub fail_drag: bool,
    pub calls: Vec<Call>,
}

impl FakePlatform {
    pub fn new(state: WindowState) -> Self {
        Self {
            state,
            decorated: true,
            ..Self::default()
        }
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl WindowPlatform for FakePlatform {
    fn window_state(&self) -> WindowState {
        self.state
    }

    fn set_window_state(&mut self, state: WindowState) {
        self.state = state;
        self.calls.push(Call::SetWindowState(state));
    }

    fn set_decorations(&mut self, decorated: bool) {
        self.decorated = decorated;
        self.calls.push(Call::SetDecorations(decorated));
    }

    fn set_border(&mut self, border: Thickness) {
        self.border = border;
        self.calls.push(Call::SetBorder(border));
    }

    fn system_prefers_dark(&self) -> bool {
        self.dark
    }

    fn set_dark_mode_attribute(&mut self, dark: bool) {
        self.dark_attribute = dark;
        self.calls.push(Call::SetDarkMode(dark));
    }

    fn set_background(&mut self, rgb: (u8, u8, u8)) {
        self.background = Some(rgb);
        self.calls.push(Call::SetBackground(rgb));
    }

    fn release_capture(&mut self) {
        self.calls.push(Call::ReleaseCapture);
    }

    fn begin_caption_drag(&mut self) -> Result<(), PlatformError> {
        self.calls.push(Call::CaptionDrag);
        if self.fail_drag {
            return Err(PlatformError("no button pressed".to_string()));
        }
        Ok(())
    }

    fn show(&mut self) {
        self.visible = true;
        self.calls.push(Call::Show);
    }
}
