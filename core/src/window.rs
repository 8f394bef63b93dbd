//! Window setup helpers.
//!
//! Resolves window options from configuration, finds and decodes the icon, and
//! turns both into a tao `WindowBuilder` so the host stays focused on
//! orchestration.

use std::path::{Path, PathBuf};

use tao::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use tao::window::{Icon, WindowBuilder};

use crate::config::{
    DEFAULT_HEIGHT, DEFAULT_ICON, DEFAULT_WIDTH, KEY_FRAME, KEY_HEIGHT, KEY_ICON, KEY_MAX_HEIGHT,
    KEY_MAX_WIDTH, KEY_MIN_HEIGHT, KEY_MIN_WIDTH, KEY_RESIZABLE, KEY_TITLE, KEY_WIDTH,
};
use crate::configuration::Configuration;
use crate::error::ConfigError;
use crate::geometry::{ChromePolicy, SizeBounds};
use crate::storage::WindowPlacement;

/// Window options as configured, before frame padding.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub title: String,
    pub bounds: SizeBounds,
    pub frame: bool,
    pub resizable: bool,
    pub icon: Option<String>,
}

impl WindowOptions {
    /// Reads the `window:*` keys, applying defaults for absent keys.
    /// Present but unparseable values are errors.
    pub fn from_configuration(config: &Configuration, default_title: &str) -> Result<Self, ConfigError> {
        let int = |key: &str, default: f64| -> Result<f64, ConfigError> {
            Ok(config.get_i32(key)?.map_or(default, f64::from))
        };
        let bounds = SizeBounds {
            height: int(KEY_HEIGHT, DEFAULT_HEIGHT)?,
            width: int(KEY_WIDTH, DEFAULT_WIDTH)?,
            min_height: int(KEY_MIN_HEIGHT, 0.0)?,
            min_width: int(KEY_MIN_WIDTH, 0.0)?,
            max_height: int(KEY_MAX_HEIGHT, f64::INFINITY)?,
            max_width: int(KEY_MAX_WIDTH, f64::INFINITY)?,
        };
        Ok(Self {
            title: config
                .get_str(KEY_TITLE)?
                .unwrap_or_else(|| default_title.to_string()),
            bounds,
            frame: config.get_bool(KEY_FRAME)?.unwrap_or(true),
            resizable: config.get_bool(KEY_RESIZABLE)?.unwrap_or(true),
            icon: config.get_str(KEY_ICON)?.filter(|s| !s.trim().is_empty()),
        })
    }

    /// Bounds with the frame padding of `policy` applied.
    #[must_use]
    pub fn adjusted_bounds(&self, policy: &ChromePolicy) -> SizeBounds {
        policy.adjust_bounds(self.bounds, self.frame)
    }
}

/// Picks the icon file: the configured icon if it exists in the web root,
/// else `favicon.ico` if that exists, else none.
#[must_use]
pub fn resolve_icon_path(web_root: &Path, icon: Option<&str>) -> Option<PathBuf> {
    icon.map(|name| web_root.join(name))
        .filter(|p| p.is_file())
        .or_else(|| Some(web_root.join(DEFAULT_ICON)).filter(|p| p.is_file()))
}

/// Decodes an icon file (ICO or PNG) into RGBA.
#[must_use]
pub fn decode_icon(path: &Path) -> Option<(Vec<u8>, u32, u32)> {
    let bytes = std::fs::read(path).ok()?;
    match image::load_from_memory(&bytes) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (w, h) = rgba.dimensions();
            Some((rgba.into_raw(), w, h))
        }
        Err(e) => {
            log::warn!("Could not decode icon {}: {}", path.display(), e);
            None
        }
    }
}

/// Loads the window icon from `path`.
#[must_use]
pub fn window_icon(path: &Path) -> Option<Icon> {
    let (rgba, width, height) = decode_icon(path)?;
    Icon::from_rgba(rgba, width, height)
        .map_err(|e| log::warn!("Invalid icon {}: {}", path.display(), e))
        .ok()
}

/// Builds the (hidden) main window description. Saved placement wins over the
/// configured size.
#[must_use]
pub fn window_builder(
    options: &WindowOptions,
    policy: &ChromePolicy,
    icon: Option<Icon>,
    placement: Option<WindowPlacement>,
) -> WindowBuilder {
    let bounds = options.adjusted_bounds(policy);
    let mut b = WindowBuilder::new()
        .with_title(options.title.as_str())
        .with_inner_size(LogicalSize::new(bounds.width, bounds.height))
        .with_decorations(options.frame)
        .with_resizable(options.resizable)
        .with_visible(false);
    if let Some((w, h)) = bounds.min_size() {
        b = b.with_min_inner_size(LogicalSize::new(w, h));
    }
    if let Some((w, h)) = bounds.max_size() {
        b = b.with_max_inner_size(LogicalSize::new(w, h));
    }
    if icon.is_some() {
        b = b.with_window_icon(icon);
    }
    if let Some(p) = placement {
        b = b
            .with_position(PhysicalPosition::new(p.x, p.y))
            .with_inner_size(PhysicalSize::new(p.width, p.height))
            .with_maximized(p.maximized);
    }
    b
}
