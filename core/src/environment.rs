//! Host environment: application name, environment name, content and web roots.

use std::path::{Path, PathBuf};

use crate::config::{
    DEFAULT_ENVIRONMENT, DEFAULT_WEB_ROOT_DIR, KEY_APPLICATION_NAME, KEY_CONTENT_ROOT,
    KEY_ENVIRONMENT, KEY_WEB_ROOT,
};
use crate::configuration::Configuration;
use crate::error::HostError;

/// Where the shell finds its files and what it is called.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    pub application_name: String,
    pub environment_name: String,
    pub content_root: PathBuf,
    pub web_root: PathBuf,
}

impl HostEnvironment {
    /// Resolves the environment from configuration.
    ///
    /// An explicitly configured content or web root must be an existing
    /// directory. The default web root (`<content_root>/wwwroot`) is not checked.
    pub fn from_configuration(config: &Configuration) -> Result<Self, HostError> {
        let content_root = match config.get(KEY_CONTENT_ROOT) {
            Some(path) => existing_dir(Path::new(path))?,
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        let web_root = match config.get(KEY_WEB_ROOT) {
            Some(path) => {
                let path = Path::new(path);
                if path.is_absolute() {
                    existing_dir(path)?
                } else {
                    existing_dir(&content_root.join(path))?
                }
            }
            None => content_root.join(DEFAULT_WEB_ROOT_DIR),
        };

        let application_name = config
            .get(KEY_APPLICATION_NAME)
            .map(str::to_string)
            .unwrap_or_else(default_application_name);

        let environment_name = config
            .get(KEY_ENVIRONMENT)
            .unwrap_or(DEFAULT_ENVIRONMENT)
            .to_string();

        Ok(Self {
            application_name,
            environment_name,
            content_root,
            web_root,
        })
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.is_environment("Development")
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.is_environment("Production")
    }

    #[must_use]
    pub fn is_environment(&self, name: &str) -> bool {
        self.environment_name.eq_ignore_ascii_case(name)
    }
}

fn existing_dir(path: &Path) -> Result<PathBuf, HostError> {
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(HostError::DirectoryNotFound(path.to_path_buf()))
    }
}

fn default_application_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_web_root_under_content_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Configuration::new();
        config.set(KEY_CONTENT_ROOT, dir.path().to_string_lossy());
        let env = HostEnvironment::from_configuration(&config).unwrap();
        assert_eq!(env.content_root, dir.path());
        assert_eq!(env.web_root, dir.path().join("wwwroot"));
        assert!(env.is_production());
    }

    #[test]
    fn missing_explicit_web_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Configuration::new();
        config.set(KEY_CONTENT_ROOT, dir.path().to_string_lossy());
        config.set(KEY_WEB_ROOT, "does-not-exist");
        let err = HostEnvironment::from_configuration(&config).unwrap_err();
        assert!(matches!(err, HostError::DirectoryNotFound(p) if p.ends_with("does-not-exist")));
    }

    #[test]
    fn missing_explicit_content_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Configuration::new();
        config.set(KEY_CONTENT_ROOT, dir.path().join("gone").to_string_lossy());
        assert!(matches!(
            HostEnvironment::from_configuration(&config),
            Err(HostError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn relative_web_root_resolves_against_content_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("site")).unwrap();
        let mut config = Configuration::new();
        config.set(KEY_CONTENT_ROOT, dir.path().to_string_lossy());
        config.set(KEY_WEB_ROOT, "site");
        config.set(KEY_ENVIRONMENT, "development");
        config.set(KEY_APPLICATION_NAME, "Demo");
        let env = HostEnvironment::from_configuration(&config).unwrap();
        assert_eq!(env.web_root, dir.path().join("site"));
        assert_eq!(env.application_name, "Demo");
        assert!(env.is_development());
    }
}
