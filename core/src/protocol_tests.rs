//! Unit tests for the app:// protocol (path normalization, serve, MIME).

#[cfg(test)]
mod tests {
    use crate::protocol::{
        is_app_url, is_external_url, mime_from_path, normalize_path, response, serve, ServeResult,
        INDEX_PATH,
    };

    #[test]
    fn normalize_path_default_index() {
        assert_eq!(normalize_path("/"), Some(INDEX_PATH));
        assert_eq!(normalize_path(""), Some(INDEX_PATH));
        assert_eq!(normalize_path("///"), Some(INDEX_PATH));
        assert_eq!(normalize_path("/css/site.css"), Some("css/site.css"));
    }

    #[test]
    fn normalize_path_rejects_traversal() {
        assert_eq!(normalize_path("/.."), None);
        assert_eq!(normalize_path("/a/../b"), None);
        assert_eq!(normalize_path("/.. /index.html"), None);
        assert_eq!(normalize_path("/a\\..\\b"), None);
    }

    #[test]
    fn normalize_path_rejects_absolute_and_prefixed_paths() {
        assert_eq!(normalize_path("/C:/Windows/win.ini"), None);
        assert_eq!(normalize_path("/c:"), None);
        assert_eq!(normalize_path("//server/share/file.txt"), None);
        assert_eq!(normalize_path("///etc/passwd"), None);
        assert_eq!(normalize_path("/./index.html"), None);
        assert_eq!(normalize_path("/css/"), Some("css"));
    }

    #[test]
    fn serve_refuses_absolute_path_outside_root() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        let uri = format!("/{}", outside.path().join("secret.txt").display());
        assert!(matches!(serve(root.path(), &uri), ServeResult::NotFound));
    }

    #[test]
    fn serve_not_found_for_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let r = serve(dir.path(), "/../etc/passwd");
        assert!(matches!(r, ServeResult::NotFound));
    }

    #[test]
    fn serve_not_found_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let r = serve(dir.path(), "/nonexistent.foo");
        assert!(matches!(r, ServeResult::NotFound));
    }

    #[test]
    fn serve_reads_from_web_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css/app.css"), "body{}").unwrap();
        match serve(dir.path(), "/css/app.css") {
            ServeResult::Found { body, mime_type } => {
                assert_eq!(mime_type, "text/css");
                assert_eq!(&*body, b"body{}");
            }
            ServeResult::NotFound => panic!("expected css file"),
        }
    }

    #[test]
    fn serve_falls_back_when_host_page_missing() {
        let dir = tempfile::tempdir().unwrap();
        match serve(dir.path(), "/") {
            ServeResult::Found { body, mime_type } => {
                assert_eq!(mime_type, "text/html");
                assert!(String::from_utf8_lossy(&body).contains("Host page not found"));
            }
            ServeResult::NotFound => panic!("expected fallback page"),
        }
    }

    #[test]
    fn response_sets_security_headers() {
        let r = response(ServeResult::NotFound);
        assert_eq!(r.status(), 404);
        assert!(r.headers().contains_key("Content-Security-Policy"));
        assert_eq!(r.headers()["X-Content-Type-Options"], "nosniff");
    }

    #[test]
    fn mime_from_path_known_extensions() {
        assert_eq!(mime_from_path("a.html"), "text/html");
        assert_eq!(mime_from_path("b.js"), "application/javascript");
        assert_eq!(mime_from_path("c.css"), "text/css");
        assert_eq!(mime_from_path("d.png"), "image/png");
        assert_eq!(mime_from_path("e.woff2"), "font/woff2");
        assert_eq!(mime_from_path("F.ICO"), "image/x-icon");
        assert_eq!(mime_from_path("f.unknown"), "application/octet-stream");
        assert_eq!(mime_from_path("noext"), "application/octet-stream");
    }

    #[test]
    fn navigation_classification() {
        assert!(is_app_url("app://localhost/index.html"));
        assert!(is_app_url("http://app.localhost/index.html"));
        assert!(is_external_url("https://example.com"));
        assert!(!is_external_url("app://localhost/counter"));
        assert!(!is_external_url("file:///etc/passwd"));
    }
}
