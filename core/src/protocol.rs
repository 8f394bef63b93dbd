// app:// protocol: serve the web root from disk, CSP, no traversal outside it.

use std::borrow::Cow;
use std::path::{Component, Path};

use crate::config::{ASSETS, HOST_PAGE};

/// Scheme registered with the webview.
pub const SCHEME: &str = "app";

/// Start URL of the host page.
pub const START_URL: &str = "app://localhost/index.html";

/// Path served for `/` and empty paths.
pub const INDEX_PATH: &str = HOST_PAGE;

/// Embedded page served when the web root has no host page.
const FALLBACK_PAGE: &str = "fallback.html";

/// CSP for app://. Inline styles and scripts are allowed since host pages
/// commonly carry them; network access stays on the app origin.
pub const CSP: &str = "default-src 'self' app:; script-src 'self' 'unsafe-inline' app:; style-src 'self' 'unsafe-inline' app:; img-src 'self' data: app:;";

pub enum ServeResult {
    Found {
        body: Cow<'static, [u8]>,
        mime_type: &'static str,
    },
    NotFound,
}

#[must_use]
pub fn mime_from_path(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html" | "htm") => "text/html",
        Some("js" | "mjs") => "application/javascript",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",
        Some("ico") => "image/x-icon",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Turns a URI path into a relative file path. `None` for anything that could
/// leave the web root: traversal, a root, a drive or UNC prefix.
#[must_use]
pub fn normalize_path(uri_path: &str) -> Option<&str> {
    let path = uri_path.strip_prefix('/').unwrap_or(uri_path).trim_end_matches('/');
    if path.is_empty() {
        return Some(INDEX_PATH);
    }
    if path.split('/').any(|seg| seg.trim() == ".." || seg.contains(['\\', ':'])) {
        return None;
    }
    // A root or prefix component makes `Path::join` discard the web root.
    if !Path::new(path).components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(path)
}

/// Serves one request from `web_root`. When the host page itself is missing
/// the embedded fallback page is returned instead of a 404.
#[must_use]
pub fn serve(web_root: &Path, uri_path: &str) -> ServeResult {
    let Some(path) = normalize_path(uri_path) else {
        log::warn!("Rejected path outside web root: {}", uri_path);
        return ServeResult::NotFound;
    };
    let file = web_root.join(path);
    match std::fs::read(&file) {
        Ok(bytes) => ServeResult::Found {
            body: Cow::Owned(bytes),
            mime_type: mime_from_path(path),
        },
        Err(_) if path == INDEX_PATH => match ASSETS.get_file(FALLBACK_PAGE) {
            Some(page) => {
                log::warn!("Host page {} not found, serving fallback page", file.display());
                ServeResult::Found {
                    body: Cow::Borrowed(page.contents()),
                    mime_type: "text/html",
                }
            }
            None => ServeResult::NotFound,
        },
        Err(e) => {
            log::debug!("Not found {}: {}", file.display(), e);
            ServeResult::NotFound
        }
    }
}

/// Builds the HTTP response for a serve result with CSP and Content-Type.
#[must_use]
pub fn response(result: ServeResult) -> http::Response<Cow<'static, [u8]>> {
    let (status, body, mime_type) = match result {
        ServeResult::Found { body, mime_type } => (200, body, mime_type),
        ServeResult::NotFound => (404, Cow::Borrowed(b"Not Found".as_slice()), "text/plain"),
    };
    http::Response::builder()
        .status(status)
        .header("Content-Type", mime_type)
        .header("Content-Security-Policy", CSP)
        .header("X-Content-Type-Options", "nosniff")
        .body(body)
        .unwrap_or_else(|e| {
            log::error!("Protocol response build failed: {}", e);
            let mut fallback = http::Response::new(Cow::Borrowed(b"Internal Server Error".as_slice()));
            *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

/// True for navigations that stay inside the app.
#[must_use]
pub fn is_app_url(url: &str) -> bool {
    url.starts_with("app://") || url.starts_with("http://app.localhost") || url.starts_with("https://app.localhost")
}

/// True for external links that should open in the system browser.
#[must_use]
pub fn is_external_url(url: &str) -> bool {
    !is_app_url(url) && (url.starts_with("https://") || url.starts_with("http://"))
}
