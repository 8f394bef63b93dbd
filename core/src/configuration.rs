//! Flat key-value configuration.
//!
//! Keys are `:`-separated paths (`window:height`) and compare case-insensitively.
//! Sources are layered in the order they are added; later sources overwrite
//! earlier ones. Values are stored as strings and parsed on read, so a bad value
//! only fails when something actually asks for it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Layered key-value configuration.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    values: HashMap<String, String>,
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

impl Configuration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any value from an earlier source.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&normalize_key(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw string value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// String value; infallible but kept in `Result` form to match the other getters.
    pub fn get_str(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.get(key).map(str::to_string))
    }

    /// Integer value. Absent is `Ok(None)`; a value that does not parse is an error.
    pub fn get_i32(&self, key: &str) -> Result<Option<i32>, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        raw.trim().parse::<i32>().map(Some).map_err(|_| ConfigError::Parse {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "an integer",
        })
    }

    /// Boolean value (`true`/`false`, any case).
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ConfigError::Parse {
                key: key.to_string(),
                value: raw.to_string(),
                expected: "true or false",
            }),
        }
    }

    /// Merges a JSON settings file. Missing optional files are skipped.
    pub fn add_json_file(&mut self, path: &Path, optional: bool) -> Result<(), ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if optional && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("Optional configuration file {} not found", path.display());
                return Ok(());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let json: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        self.add_json(&json);
        log::debug!("Loaded configuration from {}", path.display());
        Ok(())
    }

    /// Merges a JSON value, flattening nested objects and arrays with `:`.
    pub fn add_json(&mut self, json: &serde_json::Value) {
        flatten_json("", json, self);
    }

    /// Merges environment variables starting with `prefix`. The prefix is
    /// stripped and `__` becomes `:`.
    pub fn add_env_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            self.set(&rest.replace("__", ":"), value);
        }
    }

    /// Merges command-line arguments: `key=value`, `--key=value` and `--key value`.
    /// Anything else is ignored.
    pub fn add_command_line<I>(&mut self, args: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter().peekable();
        while let Some(arg) = args.next() {
            let (dashed, body) = match arg.strip_prefix("--") {
                Some(body) => (true, body),
                None => (false, arg.as_str()),
            };
            if let Some((key, value)) = body.split_once('=') {
                if !key.is_empty() {
                    self.set(key, value);
                }
                continue;
            }
            if dashed && !body.is_empty() {
                let takes_value = args.peek().is_some_and(|next| !next.starts_with("--"));
                if takes_value && let Some(value) = args.next() {
                    self.set(body, value);
                }
            }
        }
    }
}

fn flatten_json(prefix: &str, value: &serde_json::Value, out: &mut Configuration) {
    let join = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{prefix}:{segment}")
        }
    };
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                flatten_json(&join(k), v, out);
            }
        }
        serde_json::Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten_json(&join(&i.to_string()), v, out);
            }
        }
        serde_json::Value::Null => {
            if !prefix.is_empty() {
                out.set(prefix, "");
            }
        }
        serde_json::Value::String(s) => out.set(prefix, s.clone()),
        other => out.set(prefix, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        let mut c = Configuration::new();
        c.set("Window:Height", "600");
        assert_eq!(c.get("window:height"), Some("600"));
        assert_eq!(c.get_i32("WINDOW:HEIGHT").unwrap(), Some(600));
    }

    #[test]
    fn typed_getters_report_parse_errors() {
        let mut c = Configuration::new();
        c.set("window:frame", "yes");
        c.set("window:width", "wide");
        assert!(matches!(c.get_bool("window:frame"), Err(ConfigError::Parse { .. })));
        assert!(matches!(c.get_i32("window:width"), Err(ConfigError::Parse { .. })));
        assert_eq!(c.get_bool("window:resizeable").unwrap(), None);
    }

    #[test]
    fn bool_parsing_ignores_case() {
        let mut c = Configuration::new();
        c.set("window:frame", "False");
        assert_eq!(c.get_bool("window:frame").unwrap(), Some(false));
    }

    #[test]
    fn json_is_flattened_with_colons() {
        let mut c = Configuration::new();
        c.add_json(&serde_json::json!({
            "window": { "title": "Demo", "height": 500, "frame": false },
            "list": ["a", "b"]
        }));
        assert_eq!(c.get("window:title"), Some("Demo"));
        assert_eq!(c.get_i32("window:height").unwrap(), Some(500));
        assert_eq!(c.get_bool("window:frame").unwrap(), Some(false));
        assert_eq!(c.get("list:1"), Some("b"));
    }

    #[test]
    fn later_sources_win() {
        let mut c = Configuration::new();
        c.add_json(&serde_json::json!({ "window": { "width": 800 } }));
        c.add_command_line(["--window:width=1024".to_string()]);
        assert_eq!(c.get_i32("window:width").unwrap(), Some(1024));
    }

    #[test]
    fn env_vars_need_prefix_and_map_double_underscore() {
        let mut c = Configuration::new();
        c.add_env_vars(
            "DESKTOP_SHELL_",
            [
                ("DESKTOP_SHELL_WINDOW__TITLE".to_string(), "From env".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
                ("DESKTOP_SHELL_".to_string(), "ignored".to_string()),
            ],
        );
        assert_eq!(c.get("window:title"), Some("From env"));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn command_line_forms() {
        let mut c = Configuration::new();
        c.add_command_line(
            ["environment=Development", "--webroot", "site", "--flag", "--window:frame=false"]
                .map(String::from),
        );
        assert_eq!(c.get("environment"), Some("Development"));
        assert_eq!(c.get("webroot"), Some("site"));
        assert!(!c.contains("flag"));
        assert_eq!(c.get_bool("window:frame").unwrap(), Some(false));
    }

    #[test]
    fn missing_optional_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = Configuration::new();
        c.add_json_file(&dir.path().join("appsettings.json"), true).unwrap();
        assert!(c.is_empty());
        assert!(c.add_json_file(&dir.path().join("appsettings.json"), false).is_err());
    }

    #[test]
    fn invalid_json_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appsettings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut c = Configuration::new();
        assert!(matches!(
            c.add_json_file(&path, true),
            Err(ConfigError::Json { .. })
        ));
    }
}
