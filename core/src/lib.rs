//! Desktop shell: hosts web UI components in a native window (tao + wry).
//!
//! Build a [`HostBuilder`], register root components, then [`Host::run`] on
//! the main thread.

pub mod bridge;
pub mod cancel;
pub mod chrome;
pub mod components;
pub mod config;
pub mod configuration;
pub mod environment;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod host;
pub mod installer;
pub mod lifetime;
pub mod paths;
pub mod platform;
pub mod protocol;
pub mod storage;
pub mod theme;
pub mod window;

#[cfg(test)]
mod protocol_tests;

pub use cancel::CancelToken;
pub use chrome::{ChromeController, ChromeState, FullscreenChanged};
pub use components::{Component, Html, Parameters, RootComponentMapping, RootComponentMappingCollection};
pub use configuration::Configuration;
pub use environment::HostEnvironment;
pub use error::{ConfigError, HostError, InstallError, RenderError};
pub use geometry::{ChromePolicy, SizeBounds, Thickness};
pub use host::{ConfigureWindowBuilder, Host, HostBuilder};
pub use lifetime::{ApplicationLifetime, StoppingRegistration};
