//! Window chrome controller: frame style, fullscreen toggling, webview border,
//! theme application and drag forwarding.
//!
//! The controller is the single owner of the chrome state. It lives on the UI
//! thread and talks to the OS only through [`WindowPlatform`].

use tao::keyboard::KeyCode;

use crate::config::{DARK_BACKGROUND, LIGHT_BACKGROUND};
use crate::error::PlatformError;
use crate::geometry::{ChromePolicy, Thickness};
use crate::platform::{WindowPlatform, WindowState};

/// Key that toggles fullscreen.
pub const FULLSCREEN_KEY: KeyCode = KeyCode::F11;

/// Frame style currently applied by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStyle {
    /// Regular window: native frame when configured, otherwise frameless chrome.
    Standard,
    /// No decoration at all (fullscreen).
    None,
}

/// Observable chrome state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeState {
    FramedNormal,
    FramedMaximized,
    FramelessNormal,
    FramelessMaximized,
    Fullscreen,
}

/// Raised by every fullscreen toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenChanged {
    pub fullscreen: bool,
}

/// Light or dark appearance applied to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

pub struct ChromeController<P> {
    platform: P,
    policy: ChromePolicy,
    framed: bool,
    frame_style: FrameStyle,
    fullscreen: bool,
    stored_state: WindowState,
    restored_state: WindowState,
    border: Thickness,
    appearance: Option<Appearance>,
}

impl<P: WindowPlatform> ChromeController<P> {
    /// Takes ownership of the platform window and applies the configured frame.
    pub fn new(mut platform: P, framed: bool, policy: ChromePolicy) -> Self {
        platform.set_decorations(framed);
        let mut controller = Self {
            platform,
            policy,
            framed,
            frame_style: FrameStyle::Standard,
            fullscreen: false,
            stored_state: WindowState::Normal,
            restored_state: WindowState::Normal,
            border: Thickness::ZERO,
            appearance: None,
        };
        controller.update_border();
        controller
    }

    /// Window state the first page load settles on: `Maximized` when the
    /// saved placement was maximized, otherwise `Normal`.
    #[must_use]
    pub fn with_restored_state(mut self, state: WindowState) -> Self {
        self.restored_state = match state {
            WindowState::Maximized => WindowState::Maximized,
            _ => WindowState::Normal,
        };
        self
    }

    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[must_use]
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub fn frame_style(&self) -> FrameStyle {
        self.frame_style
    }

    #[must_use]
    pub fn border(&self) -> Thickness {
        self.border
    }

    #[must_use]
    pub fn appearance(&self) -> Option<Appearance> {
        self.appearance
    }

    #[must_use]
    pub fn state(&self) -> ChromeState {
        if self.fullscreen {
            return ChromeState::Fullscreen;
        }
        let maximized = self.platform.window_state() == WindowState::Maximized;
        match (self.framed, maximized) {
            (true, false) => ChromeState::FramedNormal,
            (true, true) => ChromeState::FramedMaximized,
            (false, false) => ChromeState::FramelessNormal,
            (false, true) => ChromeState::FramelessMaximized,
        }
    }

    /// Enters fullscreen from the standard style, or leaves it and restores the
    /// window state stored on entry.
    pub fn toggle_fullscreen(&mut self) -> FullscreenChanged {
        if self.frame_style == FrameStyle::Standard {
            self.fullscreen = true;
            self.stored_state = self.platform.window_state();
            self.frame_style = FrameStyle::None;
            self.platform.set_decorations(false);

            // Maximizing an already maximized window does not recompute its
            // geometry for the new style.
            if self.stored_state == WindowState::Maximized {
                self.platform.set_window_state(WindowState::Normal);
            }
            self.platform.set_window_state(WindowState::Maximized);
        } else {
            self.fullscreen = false;
            self.frame_style = FrameStyle::Standard;
            self.platform.set_decorations(self.framed);
            self.platform.set_window_state(self.stored_state);
        }
        self.update_border();
        log::debug!("fullscreen: {}", self.fullscreen);
        FullscreenChanged {
            fullscreen: self.fullscreen,
        }
    }

    /// Key handler. Returns the toggle result when the key was the fullscreen key.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> Option<FullscreenChanged> {
        (key == FULLSCREEN_KEY && pressed && !repeat).then(|| self.toggle_fullscreen())
    }

    /// Recomputes the border after a minimize, maximize, restore or resize.
    pub fn on_state_changed(&mut self) {
        self.update_border();
    }

    /// First page load: back to the standard frame in the restored state
    /// (normal unless the saved placement was maximized), then show.
    pub fn on_page_loaded(&mut self) {
        if !self.fullscreen {
            self.frame_style = FrameStyle::Standard;
            self.platform.set_decorations(self.framed);
            self.platform.set_window_state(self.restored_state);
        }
        self.platform.show();
        self.update_border();
    }

    /// Queries the OS preference and applies the matching appearance.
    pub fn apply_system_theme(&mut self) -> Appearance {
        let dark = self.platform.system_prefers_dark();
        self.platform.set_dark_mode_attribute(dark);
        let (appearance, background) = if dark {
            (Appearance::Dark, DARK_BACKGROUND)
        } else {
            (Appearance::Light, LIGHT_BACKGROUND)
        };
        self.platform.set_background(background);
        if self.appearance != Some(appearance) {
            log::info!("Applied {:?} appearance", appearance);
        }
        self.appearance = Some(appearance);
        appearance
    }

    /// Starts a native title-bar drag for a press inside a page drag region.
    pub fn begin_drag(&mut self) -> Result<(), PlatformError> {
        self.platform.release_capture();
        self.platform.begin_caption_drag()
    }

    fn update_border(&mut self) {
        let maximized = self.platform.window_state() == WindowState::Maximized;
        let border = self.policy.border(self.framed, maximized, self.fullscreen);
        if border != self.border {
            self.border = border;
            self.platform.set_border(border);
        }
    }
}
