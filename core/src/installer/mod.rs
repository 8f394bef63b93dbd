//! One-shot startup check for the embedded browser runtime.
//!
//! When enabled, detects the WebView2 runtime and, if it is missing, downloads
//! the evergreen bootstrapper to a temporary file and runs it elevated. The
//! temporary file is removed on every exit path. Detection, download and launch
//! sit behind [`RuntimeProbe`], [`Downloader`] and [`Launcher`].

use std::future::Future;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::config::{KEY_INSTALLER_ENABLED, KEY_INSTALLER_SILENT, RUNTIME_INSTALLER_URL};
use crate::configuration::Configuration;
use crate::error::{BoxError, ConfigError, InstallError};

const DOWNLOAD_CHUNK: usize = 64 * 1024;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("desktop-shell/", env!("CARGO_PKG_VERSION"));

/// Installer switches, from `installer:*` keys or `HostBuilder::use_webview_installer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallerOptions {
    pub enabled: bool,
    pub silent: bool,
}

impl InstallerOptions {
    pub fn from_configuration(config: &Configuration) -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: config.get_bool(KEY_INSTALLER_ENABLED)?.unwrap_or(false),
            silent: config.get_bool(KEY_INSTALLER_SILENT)?.unwrap_or(false),
        })
    }

    /// Bootstrapper arguments.
    #[must_use]
    pub fn arguments(&self) -> &'static [&'static str] {
        if self.silent {
            &["/silent", "/install"]
        } else {
            &["/install"]
        }
    }
}

/// What `ensure_installed` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Disabled,
    AlreadyInstalled(String),
    Installed,
}

/// Reports the installed runtime version. An empty string means absent.
pub trait RuntimeProbe {
    fn installed_version(&self) -> Result<String, BoxError>;
}

/// Streams `url` into `out`. Blocking; runs on the blocking pool.
///
/// Implementations check `cancel` between chunks and return
/// [`InstallError::Cancelled`] once it is set.
pub trait Downloader: Send + Sync + 'static {
    fn download(&self, url: &str, out: &mut dyn Write, cancel: &CancelToken) -> Result<u64, InstallError>;
}

/// Runs the downloaded bootstrapper and resolves to its exit code.
pub trait Launcher {
    fn launch(&self, exe: &Path, args: &[&str]) -> impl Future<Output = io::Result<i32>>;
}

/// Runtime detection through wry.
#[derive(Debug, Clone, Copy, Default)]
pub struct WryProbe;

impl RuntimeProbe for WryProbe {
    fn installed_version(&self) -> Result<String, BoxError> {
        wry::webview_version().map_err(|e| e.to_string().into())
    }
}

/// HTTP download with ureq.
pub struct UreqDownloader {
    agent: ureq::Agent,
}

impl Default for UreqDownloader {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(CONNECT_TIMEOUT)
                .timeout_read(READ_TIMEOUT)
                .user_agent(USER_AGENT)
                .build(),
        }
    }
}

impl Downloader for UreqDownloader {
    fn download(&self, url: &str, out: &mut dyn Write, cancel: &CancelToken) -> Result<u64, InstallError> {
        let resp = self
            .agent
            .get(url)
            .call()
            .map_err(|e| InstallError::network(format!("request to {url} failed"), e))?;
        copy_with_cancel(&mut resp.into_reader(), out, cancel)
    }
}

/// Copies `reader` into `out` chunk by chunk, stopping when `cancel` is set.
pub(crate) fn copy_with_cancel(
    reader: &mut dyn Read,
    out: &mut dyn Write,
    cancel: &CancelToken,
) -> Result<u64, InstallError> {
    let mut buf = vec![0u8; DOWNLOAD_CHUNK];
    let mut total = 0u64;
    loop {
        if cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(InstallError::network("reading response body failed", e)),
        };
        out.write_all(&buf[..n])
            .map_err(|e| InstallError::network("writing installer to disk failed", e))?;
        total += n as u64;
    }
}

/// Starts the bootstrapper through an elevation prompt and waits for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElevatedLauncher;

/// Single-quoted PowerShell literal.
fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn elevated_command(exe: &Path, args: &[&str]) -> String {
    let mut command = format!(
        "$p = Start-Process -FilePath {} -Verb RunAs -Wait -PassThru",
        ps_quote(&exe.display().to_string())
    );
    if !args.is_empty() {
        let list: Vec<String> = args.iter().map(|a| ps_quote(a)).collect();
        command.push_str(" -ArgumentList ");
        command.push_str(&list.join(","));
    }
    command.push_str("; exit $p.ExitCode");
    command
}

impl Launcher for ElevatedLauncher {
    async fn launch(&self, exe: &Path, args: &[&str]) -> io::Result<i32> {
        let mut cmd = tokio::process::Command::new("powershell");
        cmd.args(["-NoProfile", "-NonInteractive", "-Command"])
            .arg(elevated_command(exe, args))
            .kill_on_drop(true);
        #[cfg(windows)]
        cmd.creation_flags(0x0800_0000); // CREATE_NO_WINDOW
        let status = cmd.status().await?;
        Ok(status.code().unwrap_or(-1))
    }
}

pub struct RuntimeInstaller<P = WryProbe, D = UreqDownloader, L = ElevatedLauncher> {
    options: InstallerOptions,
    url: String,
    temp_dir: PathBuf,
    probe: P,
    downloader: Arc<D>,
    launcher: L,
}

impl RuntimeInstaller {
    #[must_use]
    pub fn new(options: InstallerOptions) -> Self {
        Self::with_parts(options, WryProbe, UreqDownloader::default(), ElevatedLauncher)
    }
}

impl<P, D, L> RuntimeInstaller<P, D, L>
where
    P: RuntimeProbe,
    D: Downloader,
    L: Launcher,
{
    pub fn with_parts(options: InstallerOptions, probe: P, downloader: D, launcher: L) -> Self {
        Self {
            options,
            url: RUNTIME_INSTALLER_URL.to_string(),
            temp_dir: std::env::temp_dir(),
            probe,
            downloader: Arc::new(downloader),
            launcher,
        }
    }

    /// Directory for the downloaded bootstrapper.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Makes sure the runtime is present, installing it when allowed.
    pub async fn ensure_installed(&self, cancel: &CancelToken) -> Result<InstallOutcome, InstallError> {
        if !self.options.enabled {
            return Ok(InstallOutcome::Disabled);
        }
        if cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }
        match self.probe.installed_version() {
            Ok(version) if !version.trim().is_empty() => {
                log::debug!("WebView runtime {} is installed", version);
                return Ok(InstallOutcome::AlreadyInstalled(version));
            }
            Ok(_) => log::debug!("WebView runtime reported an empty version"),
            Err(e) => log::debug!("WebView runtime not detected: {}", e),
        }

        log::info!(
            "Installing WebView runtime ({})",
            if self.options.silent { "silent" } else { "interactive" }
        );
        let temp = tempfile::Builder::new()
            .prefix("webview-runtime-setup-")
            .suffix(".exe")
            .tempfile_in(&self.temp_dir)
            .map_err(|e| InstallError::network("could not create a temporary file", e))?;
        // The path guard deletes the file when dropped, whichever way we leave.
        let (file, path) = temp.into_parts();

        let bytes = self.download(file, cancel).await?;
        log::debug!("Downloaded {} bytes to {}", bytes, path.display());

        let args = self.options.arguments();
        let exit = tokio::select! {
            result = self.launcher.launch(&path, args) => result,
            () = cancel.cancelled() => return Err(InstallError::Cancelled),
        };
        match exit {
            Ok(0) => {}
            Ok(code) => {
                return Err(InstallError::operation(
                    format!("installer exited with code {code}"),
                    io::Error::other(format!("exit code {code}")),
                ));
            }
            Err(e) => return Err(InstallError::operation("could not launch the installer", e)),
        }

        if let Err(e) = path.close() {
            log::warn!("Could not delete installer: {}", e);
        }
        log::info!("WebView runtime installed");
        Ok(InstallOutcome::Installed)
    }

    async fn download(&self, file: std::fs::File, cancel: &CancelToken) -> Result<u64, InstallError> {
        let downloader = Arc::clone(&self.downloader);
        let url = self.url.clone();
        let token = cancel.clone();
        tokio::task::spawn_blocking(move || -> Result<u64, InstallError> {
            // The file is closed when the writer drops, before the launch.
            let mut out = BufWriter::new(file);
            let n = downloader.download(&url, &mut out, &token)?;
            out.flush()
                .map_err(|e| InstallError::network("writing installer to disk failed", e))?;
            Ok(n)
        })
        .await
        .map_err(|e| InstallError::network("download task failed", e))?
    }
}
