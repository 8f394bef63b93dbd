//! Configuration keys, defaults, and compile-time constants.
//!
//! Centralizes window defaults, configuration key names, env vars, and the
//! runtime installer URL so the rest of the crate stays decoupled from
//! concrete values.

use include_dir::include_dir;

/// Configuration key for the window title.
pub const KEY_TITLE: &str = "window:title";

/// Configuration key for the window height.
pub const KEY_HEIGHT: &str = "window:height";

/// Configuration key for the window width.
pub const KEY_WIDTH: &str = "window:width";

/// Configuration key for the minimum window height.
pub const KEY_MIN_HEIGHT: &str = "window:minHeight";

/// Configuration key for the minimum window width.
pub const KEY_MIN_WIDTH: &str = "window:minWidth";

/// Configuration key for the maximum window height.
pub const KEY_MAX_HEIGHT: &str = "window:maxHeight";

/// Configuration key for the maximum window width.
pub const KEY_MAX_WIDTH: &str = "window:maxWidth";

/// Configuration key for the native frame flag.
pub const KEY_FRAME: &str = "window:frame";

/// Configuration key for resizability. The spelling is part of the public key set.
pub const KEY_RESIZABLE: &str = "window:resizeable";

/// Configuration key for the icon path, relative to the web root.
pub const KEY_ICON: &str = "window:icon";

/// Configuration key enabling the browser-runtime installer.
pub const KEY_INSTALLER_ENABLED: &str = "installer:enabled";

/// Configuration key selecting a silent runtime install.
pub const KEY_INSTALLER_SILENT: &str = "installer:silent";

// Host keys.
pub const KEY_ENVIRONMENT: &str = "environment";
pub const KEY_APPLICATION_NAME: &str = "applicationName";
pub const KEY_CONTENT_ROOT: &str = "contentRoot";
pub const KEY_WEB_ROOT: &str = "webroot";
pub const KEY_LOG_LEVEL: &str = "logging:level";

/// Initial window height (logical) when `window:height` is absent.
pub const DEFAULT_HEIGHT: f64 = 768.0;

/// Initial window width (logical) when `window:width` is absent.
pub const DEFAULT_WIDTH: f64 = 1366.0;

/// Environment name used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "Production";

/// Web root directory name under the content root.
pub const DEFAULT_WEB_ROOT_DIR: &str = "wwwroot";

/// Host page file name inside the web root.
pub const HOST_PAGE: &str = "index.html";

/// Default icon file name inside the web root.
pub const DEFAULT_ICON: &str = "favicon.ico";

/// Prefix for environment variables read into configuration (`__` maps to `:`).
pub const ENV_PREFIX: &str = "DESKTOP_SHELL_";

/// Env var: set to `"1"` to enable WebView DevTools.
pub const ENV_DEVTOOLS: &str = "DESKTOP_SHELL_DEVTOOLS";

/// Seconds to wait before showing the window if the first page load never fires.
pub const SHOW_WINDOW_FALLBACK_SECS: u64 = 3;

/// Evergreen bootstrapper for the WebView2 runtime.
pub const RUNTIME_INSTALLER_URL: &str = "https://go.microsoft.com/fwlink/p/?LinkId=2124703";

/// Background painted behind the webview in dark mode.
pub const DARK_BACKGROUND: (u8, u8, u8) = (25, 25, 25);

/// Background painted behind the webview in light mode.
pub const LIGHT_BACKGROUND: (u8, u8, u8) = (255, 255, 255);

/// Embedded shell assets (bridge script, fallback page).
pub static ASSETS: include_dir::Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");
