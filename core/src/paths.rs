//! Per-application user data directory.
//!
//! Holds the web engine profile and the saved window placement. Never the
//! install directory, which may be read-only.

use std::env;
use std::path::PathBuf;

const FALLBACK_NAME: &str = "desktop-shell";

/// Directory name safe for every platform's filesystem.
fn sanitize(app_name: &str) -> String {
    let cleaned: String = app_name
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.');
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(target_os = "windows")]
fn platform_base() -> Option<PathBuf> {
    env::var_os("LOCALAPPDATA").map(PathBuf::from)
}

#[cfg(target_os = "macos")]
fn platform_base() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join("Library/Application Support"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_base() -> Option<PathBuf> {
    env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share")))
}

fn dir_name(app: &str) -> String {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        app.to_string()
    } else {
        app.to_lowercase().replace(' ', "-")
    }
}

/// Returns the user data directory for `app_name`, creating it if needed.
/// Falls back to a directory under the system temp dir.
#[must_use]
pub fn user_data_dir(app_name: &str) -> PathBuf {
    let name = dir_name(&sanitize(app_name));
    if let Some(dir) = platform_base().map(|base| base.join(&name)) {
        match std::fs::create_dir_all(&dir) {
            Ok(()) => return dir,
            Err(e) => log::warn!("Could not create {}: {}", dir.display(), e),
        }
    }
    let fallback = env::temp_dir().join(&name);
    if let Err(e) = std::fs::create_dir_all(&fallback) {
        log::warn!("Could not create {}: {}", fallback.display(), e);
    }
    fallback
}
