//! Host builder and host: configuration, environment and root components in;
//! one native window running the web UI out.
//!
//! `Host::run` runs the optional runtime installer on a current-thread tokio
//! runtime, then creates the tao event loop on the calling thread and never
//! returns once the UI is up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tao::event_loop::EventLoopBuilder;
use wry::WebViewBuilder;

use crate::bridge::{init_script, EventForwarder};
use crate::chrome::{ChromeController, FullscreenChanged};
use crate::config::{
    ENV_DEVTOOLS, ENV_PREFIX, KEY_FRAME, KEY_HEIGHT, KEY_ICON, KEY_INSTALLER_ENABLED,
    KEY_INSTALLER_SILENT, KEY_LOG_LEVEL, KEY_MAX_HEIGHT, KEY_MAX_WIDTH, KEY_MIN_HEIGHT,
    KEY_MIN_WIDTH, KEY_RESIZABLE, KEY_TITLE, KEY_WIDTH, SHOW_WINDOW_FALLBACK_SECS,
};
use crate::components::RootComponentMappingCollection;
use crate::configuration::Configuration;
use crate::environment::HostEnvironment;
use crate::error::HostError;
use crate::event_loop::{register_shutdown, run_event_loop, Dispatch, FullscreenListener, Shell, UserEvent};
use crate::geometry::ChromePolicy;
use crate::installer::InstallerOptions;
use crate::lifetime::ApplicationLifetime;
use crate::paths::user_data_dir;
use crate::platform::{NativeWindow, WindowState};
use crate::protocol;
use crate::storage::PlacementStore;
use crate::theme::ThemeWatcher;
use crate::window::{resolve_icon_path, window_builder, window_icon, WindowOptions};

const SETTINGS_FILE: &str = "appsettings";

pub struct HostBuilder {
    configuration: Configuration,
    environment: HostEnvironment,
    root_components: RootComponentMappingCollection,
    developer_tools: bool,
    policy: ChromePolicy,
    on_fullscreen_changed: Option<FullscreenListener>,
}

impl HostBuilder {
    /// Builder with configuration from settings files, `DESKTOP_SHELL_*`
    /// environment variables and `args`, in that order of precedence (last wins).
    pub fn create_default<I, S>(args: I) -> Result<Self, HostError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_sources(args.into_iter().map(Into::into), std::env::vars())
    }

    fn from_sources<A, V>(args: A, vars: V) -> Result<Self, HostError>
    where
        A: IntoIterator<Item = String>,
        V: IntoIterator<Item = (String, String)>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        // Content root and environment name decide which settings files exist.
        let mut bootstrap = Configuration::new();
        bootstrap.add_env_vars(ENV_PREFIX, vars.iter().cloned());
        bootstrap.add_command_line(args.iter().cloned());
        let initial = HostEnvironment::from_configuration(&bootstrap)?;

        let mut configuration = Configuration::new();
        let root = &initial.content_root;
        configuration.add_json_file(&root.join(format!("{SETTINGS_FILE}.json")), true)?;
        configuration.add_json_file(
            &root.join(format!("{SETTINGS_FILE}.{}.json", initial.environment_name)),
            true,
        )?;
        configuration.add_env_vars(ENV_PREFIX, vars);
        configuration.add_command_line(args);

        let environment = HostEnvironment::from_configuration(&configuration)?;
        Ok(Self {
            configuration,
            environment,
            root_components: RootComponentMappingCollection::new(),
            developer_tools: false,
            policy: ChromePolicy::default(),
            on_fullscreen_changed: None,
        })
    }

    pub fn configuration(&mut self) -> &mut Configuration {
        &mut self.configuration
    }

    #[must_use]
    pub fn host_environment(&self) -> &HostEnvironment {
        &self.environment
    }

    pub fn root_components(&mut self) -> &mut RootComponentMappingCollection {
        &mut self.root_components
    }

    /// Window options, written as configuration overrides.
    pub fn window(&mut self) -> ConfigureWindowBuilder<'_> {
        ConfigureWindowBuilder {
            config: &mut self.configuration,
        }
    }

    pub fn use_developer_tools(&mut self) -> &mut Self {
        self.developer_tools = true;
        self
    }

    /// Installs the WebView runtime at startup when it is missing.
    pub fn use_webview_installer(&mut self, silent: bool) -> &mut Self {
        self.configuration.set(KEY_INSTALLER_ENABLED, "true");
        self.configuration.set(KEY_INSTALLER_SILENT, silent.to_string());
        self
    }

    pub fn use_chrome_policy(&mut self, policy: ChromePolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Called on the UI thread after every fullscreen toggle.
    pub fn on_fullscreen_changed<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(FullscreenChanged) + 'static,
    {
        self.on_fullscreen_changed = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<Host, HostError> {
        init_logging(&self.configuration);

        let window = WindowOptions::from_configuration(
            &self.configuration,
            &self.environment.application_name,
        )?;
        let installer = InstallerOptions::from_configuration(&self.configuration)?;
        let developer_tools =
            self.developer_tools || std::env::var(ENV_DEVTOOLS).as_deref() == Ok("1");

        log::info!(
            "Hosting environment: {}, content root: {}",
            self.environment.environment_name,
            self.environment.content_root.display()
        );

        Ok(Host {
            configuration: self.configuration,
            environment: self.environment,
            root_components: self.root_components,
            window,
            installer,
            policy: self.policy,
            developer_tools,
            on_fullscreen_changed: self.on_fullscreen_changed,
            lifetime: ApplicationLifetime::new(),
        })
    }
}

/// `RUST_LOG` wins, then `logging:level`, then `warn`. Only the first call
/// in a process installs the logger.
fn init_logging(config: &Configuration) {
    install_logger(config.get(KEY_LOG_LEVEL).unwrap_or("warn"));
}

/// Logger for failures that happen before [`HostBuilder::build`] ran, such as
/// a missing content root or a malformed settings file. `RUST_LOG` wins, then
/// `error`. Does nothing once a logger is installed.
pub fn init_fallback_logging() {
    install_logger("error");
}

fn install_logger(default_filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}

/// Fluent window options; each call writes a `window:*` key.
pub struct ConfigureWindowBuilder<'a> {
    config: &'a mut Configuration,
}

impl ConfigureWindowBuilder<'_> {
    pub fn use_title(self, title: &str) -> Self {
        self.config.set(KEY_TITLE, title);
        self
    }

    pub fn use_height(self, height: i32) -> Self {
        self.config.set(KEY_HEIGHT, height.to_string());
        self
    }

    pub fn use_width(self, width: i32) -> Self {
        self.config.set(KEY_WIDTH, width.to_string());
        self
    }

    pub fn use_min_height(self, height: i32) -> Self {
        self.config.set(KEY_MIN_HEIGHT, height.to_string());
        self
    }

    pub fn use_min_width(self, width: i32) -> Self {
        self.config.set(KEY_MIN_WIDTH, width.to_string());
        self
    }

    pub fn use_max_height(self, height: i32) -> Self {
        self.config.set(KEY_MAX_HEIGHT, height.to_string());
        self
    }

    pub fn use_max_width(self, width: i32) -> Self {
        self.config.set(KEY_MAX_WIDTH, width.to_string());
        self
    }

    pub fn use_frame(self, frame: bool) -> Self {
        self.config.set(KEY_FRAME, frame.to_string());
        self
    }

    pub fn use_resizable(self, resizable: bool) -> Self {
        self.config.set(KEY_RESIZABLE, resizable.to_string());
        self
    }

    /// Icon path relative to the web root.
    pub fn use_icon(self, icon: &str) -> Self {
        self.config.set(KEY_ICON, icon);
        self
    }
}

pub struct Host {
    configuration: Configuration,
    environment: HostEnvironment,
    root_components: RootComponentMappingCollection,
    window: WindowOptions,
    installer: InstallerOptions,
    policy: ChromePolicy,
    developer_tools: bool,
    on_fullscreen_changed: Option<FullscreenListener>,
    lifetime: ApplicationLifetime,
}

impl Host {
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    #[must_use]
    pub fn host_environment(&self) -> &HostEnvironment {
        &self.environment
    }

    #[must_use]
    pub fn window_options(&self) -> &WindowOptions {
        &self.window
    }

    #[must_use]
    pub fn installer_options(&self) -> InstallerOptions {
        self.installer
    }

    /// Lifetime handle; clone it to stop the application from any thread.
    #[must_use]
    pub fn lifetime(&self) -> ApplicationLifetime {
        self.lifetime.clone()
    }

    /// Runs the application on the calling thread (the main thread on macOS).
    ///
    /// Returns `Ok(())` only when the application was stopped before the UI
    /// started. Once the event loop runs, the process exits with it.
    pub fn run(self) -> Result<(), HostError> {
        self.ensure_runtime()?;
        if self.lifetime.is_stopping() {
            log::info!("Stopped during startup");
            return Ok(());
        }
        self.run_ui()
    }

    #[cfg(windows)]
    fn ensure_runtime(&self) -> Result<(), HostError> {
        use crate::installer::{InstallOutcome, RuntimeInstaller};

        if !self.installer.enabled {
            return Ok(());
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(HostError::Runtime)?;
        let installer = RuntimeInstaller::new(self.installer);
        match runtime.block_on(installer.ensure_installed(&self.lifetime.startup_token())) {
            Ok(InstallOutcome::Installed) => log::info!("WebView runtime is ready"),
            Ok(outcome) => log::debug!("WebView runtime check: {:?}", outcome),
            Err(e) if e.is_cancelled() => log::info!("{}", e),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    #[cfg(not(windows))]
    fn ensure_runtime(&self) -> Result<(), HostError> {
        if self.installer.enabled {
            log::debug!("WebView runtime ships with the OS here; skipping installer");
        }
        Ok(())
    }

    fn run_ui(self) -> Result<(), HostError> {
        let Self {
            environment,
            root_components,
            window: options,
            policy,
            developer_tools,
            on_fullscreen_changed,
            lifetime,
            ..
        } = self;

        let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
        let proxy = event_loop.create_proxy();

        let data_dir = user_data_dir(&environment.application_name);
        let placement = PlacementStore::new(&data_dir);
        let icon = resolve_icon_path(&environment.web_root, options.icon.as_deref())
            .and_then(|path| window_icon(&path));
        let saved = placement.load();
        let restored_state = match &saved {
            Some(p) if p.maximized => WindowState::Maximized,
            _ => WindowState::Normal,
        };
        let window = window_builder(&options, &policy, icon, saved).build(&event_loop)?;

        let rendered = root_components.render_all();
        log::debug!("Rendered {} of {} root components", rendered.len(), root_components.len());

        let web_root = environment.web_root.clone();
        let protocol_handler = move |_: wry::WebViewId<'_>, request: wry::http::Request<Vec<u8>>| {
            protocol::response(protocol::serve(&web_root, request.uri().path()))
        };

        let navigation_handler = |url: String| {
            if protocol::is_app_url(&url) || url.starts_with("about:") {
                return true;
            }
            if protocol::is_external_url(&url) {
                if let Err(e) = opener::open(&url) {
                    log::warn!("Could not open {} in the browser: {}", url, e);
                }
            } else {
                log::warn!("Blocked navigation to {}", url);
            }
            false
        };

        let forwarder = EventForwarder::new(proxy.clone());
        let ipc_handler = move |req: wry::http::Request<String>| {
            forwarder.handle(req.body());
        };

        let shown = Arc::new(AtomicBool::new(false));
        let on_page_load = {
            let proxy = proxy.clone();
            let shown = Arc::clone(&shown);
            move |event: wry::PageLoadEvent, _url: String| {
                if matches!(event, wry::PageLoadEvent::Finished) && !shown.swap(true, Ordering::AcqRel) {
                    proxy.dispatch(UserEvent::ShowWindow);
                }
            }
        };
        {
            let proxy = proxy.clone();
            let shown = Arc::clone(&shown);
            thread::spawn(move || {
                thread::sleep(Duration::from_secs(SHOW_WINDOW_FALLBACK_SECS));
                if !shown.swap(true, Ordering::AcqRel) {
                    log::warn!("Page load did not complete, showing window anyway");
                    proxy.dispatch(UserEvent::ShowWindow);
                }
            });
        }

        let mut web_context = wry::WebContext::new(Some(data_dir));
        let builder = WebViewBuilder::new_with_web_context(&mut web_context)
            .with_custom_protocol(protocol::SCHEME.to_string(), protocol_handler)
            .with_url(protocol::START_URL)
            .with_ipc_handler(ipc_handler)
            .with_initialization_script(init_script(&rendered))
            .with_navigation_handler(navigation_handler)
            .with_on_page_load_handler(on_page_load)
            .with_devtools(developer_tools);

        #[cfg(any(target_os = "windows", target_os = "macos"))]
        let webview = builder.build_as_child(&window)?;

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let webview = {
            use tao::platform::unix::WindowExtUnix;
            use wry::WebViewBuilderExtUnix;
            let vbox = window
                .default_vbox()
                .ok_or_else(|| {
                    crate::error::PlatformError("GTK container for the webview is missing".into())
                })?;
            builder.build_gtk(vbox)?
        };

        let native = NativeWindow::new(window, webview);
        native.relayout();
        let controller =
            ChromeController::new(native, options.frame, policy).with_restored_state(restored_state);

        let theme = ThemeWatcher::system().subscribe(proxy.clone());

        // Registered after the window exists: a stop that fired during the
        // build posts its shutdown here.
        let stopping = register_shutdown(&lifetime, proxy);

        run_event_loop(
            event_loop,
            Shell {
                controller,
                placement,
                on_fullscreen_changed,
                lifetime,
                theme,
                stopping,
                web_context,
            },
        )
    }
}
