//! Sample shell: one root component mounted into the host page's `#app`.
//!
//! Configure with `appsettings.json` next to the working directory,
//! `DESKTOP_SHELL_*` env vars, or `key=value` arguments.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use desktop_shell::host::init_fallback_logging;
use desktop_shell::{Host, HostBuilder, HostError, Html};

/// Logs the error, tells the user and exits with code 1.
fn exit_fatal(error: &HostError) -> ! {
    // Configuration errors surface before `build` installs the logger.
    init_fallback_logging();
    log::error!("{}", error);
    let _ = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("Desktop Shell")
        .set_description(error.to_string())
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
    std::process::exit(1);
}

fn build() -> Result<Host, HostError> {
    let mut builder = HostBuilder::create_default(std::env::args().skip(1))?;
    builder.root_components().add(
        Html(String::from(
            "<h1>Desktop Shell</h1><p>Press F11 for fullscreen. Drag the window by its header.</p>",
        )),
        "#app",
    )?;
    if builder.host_environment().is_development() {
        builder.use_developer_tools();
    }
    builder.on_fullscreen_changed(|changed| log::info!("Fullscreen: {}", changed.fullscreen));
    builder.build()
}

fn main() {
    let host = build().unwrap_or_else(|e| exit_fatal(&e));
    if let Err(e) = host.run() {
        exit_fatal(&e);
    }
}
