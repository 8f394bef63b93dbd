//! Error types for the shell.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause attached to wrapped errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that terminate host startup.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error("Invalid root component: {0}")]
    InvalidComponent(String),

    #[error("Failed to create window: {0}")]
    Window(#[from] tao::error::OsError),

    #[error("Failed to build webview: {0}")]
    WebView(#[from] wry::Error),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration source and value errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for '{key}': expected {expected}")]
    Parse {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Browser-runtime installer failures.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Failed to download the WebView runtime installer: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to install the WebView runtime: {message}")]
    Operation {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("WebView runtime installation was cancelled")]
    Cancelled,
}

impl InstallError {
    pub(crate) fn network(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            message: message.into(),
            source: source.into(),
        }
    }

    pub(crate) fn operation(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Operation {
            message: message.into(),
            source: source.into(),
        }
    }

    /// True when the failure is a cancellation rather than an error.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors raised while rendering a root component.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Wraps a failure raised inside the component's own render code.
    #[error("Component '{component}' failed during invocation")]
    Invocation {
        component: String,
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    Failed(String),
}

/// Errors from the platform capability layer.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct PlatformError(pub String);
