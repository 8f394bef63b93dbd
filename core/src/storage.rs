//! Persisted window placement (JSON in the user data dir).
//!
//! Saved when the window closes and restored on the next start, so the shell
//! reopens where the user left it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const STATE_FILENAME: &str = "window-state.json";

/// Window placement (physical position and inner size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlacement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub maximized: bool,
}

/// Reads and writes placement for one application.
#[derive(Debug, Clone)]
pub struct PlacementStore {
    path: PathBuf,
}

impl PlacementStore {
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STATE_FILENAME),
        }
    }

    /// Returns saved placement, or `None` when missing, unreadable or degenerate.
    #[must_use]
    pub fn load(&self) -> Option<WindowPlacement> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<WindowPlacement>(&content) {
            Ok(p) if p.width > 0 && p.height > 0 => Some(p),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Ignoring corrupt window state {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Saves placement. Logs and ignores errors.
    pub fn save(&self, placement: &WindowPlacement) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(placement) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    log::warn!("Failed to save window state: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to serialize window state: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlacementStore::new(dir.path());
        assert_eq!(store.load(), None);
        let placement = WindowPlacement {
            x: -10,
            y: 20,
            width: 1280,
            height: 720,
            maximized: true,
        };
        store.save(&placement);
        assert_eq!(store.load(), Some(placement));
    }

    #[test]
    fn corrupt_or_empty_state_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlacementStore::new(dir.path());
        fs::write(dir.path().join(STATE_FILENAME), "{").unwrap();
        assert_eq!(store.load(), None);
        fs::write(
            dir.path().join(STATE_FILENAME),
            r#"{"x":0,"y":0,"width":0,"height":10}"#,
        )
        .unwrap();
        assert_eq!(store.load(), None);
    }
}
