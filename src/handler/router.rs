//! Request dispatch module
//!
//! Entry point for HTTP request processing: method check, path resolution, and
//! dispatch to the directory lister or the file streamer.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::resolve::{self, ResolvedTarget};
use crate::handler::{listing, static_files};
use crate::http::ResponseBody;
use crate::logger::{self, AccessLogEntry};
use hyper::header::HeaderMap;
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// URI path, still percent-encoded
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
///
/// Always produces exactly one response; per-request failures become error
/// responses and never propagate to the connection.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    // Requests are retrievals only; the body is never read
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let path = parts.uri.path();

    logger::log_request(method.as_str(), path, &peer_addr);

    let ctx = RequestContext {
        path,
        is_head: *method == Method::HEAD,
        range_header: header_string(&parts.headers, "range"),
    };

    let result = match method {
        &Method::GET | &Method::HEAD => dispatch(&ctx, &state).await,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Err(ServeError::MethodNotAllowed)
        }
    };

    let response = result.unwrap_or_else(|err| {
        match &err {
            ServeError::DirectoryRead(_) | ServeError::FileOpen(_) => {
                logger::log_error(&format!("{path}: {err}"));
            }
            _ => logger::log_debug(&format!("{path}: {err}")),
        }
        err.into_response()
    });

    if state.access_log() {
        let mut entry = access_entry(&parts, &ctx, &response, peer_addr);
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the path and hand off to the matching responder
async fn dispatch(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Result<Response<ResponseBody>, ServeError> {
    match resolve::resolve(&state.root, ctx.path).await {
        ResolvedTarget::Directory(dir) => listing::serve_directory(ctx, &dir).await,
        ResolvedTarget::File { path, size } => {
            static_files::serve_file(ctx, state, &path, size).await
        }
        ResolvedTarget::Missing => Err(ServeError::NotFound),
    }
}

/// Access-log record for a finished request; HEAD responses sent no body bytes
fn access_entry(
    parts: &Parts,
    ctx: &RequestContext<'_>,
    response: &Response<ResponseBody>,
    peer_addr: SocketAddr,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        parts.method.to_string(),
        ctx.path.to_string(),
    );
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = if ctx.is_head {
        0
    } else {
        content_length(response)
    };
    entry.range.clone_from(&ctx.range_header);
    entry.referer = header_string(&parts.headers, "referer");
    entry.user_agent = header_string(&parts.headers, "user-agent");
    entry
}

fn content_length(response: &Response<ResponseBody>) -> u64 {
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use std::path::Path;

    const CONTENT: &[u8] = b"0123456789";

    fn test_state(root: &Path) -> Arc<AppState> {
        let overrides = Overrides {
            use_https: false,
            root: Some(root.to_string_lossy().into_owned()),
        };
        let missing = root.join("no-such-config");
        let mut cfg = Config::load_from(missing.to_str().unwrap(), &overrides).unwrap();
        cfg.logging.access_log = false;
        // Small chunks so multi-chunk streaming is exercised
        cfg.performance.stream_chunk_size = 3;
        Arc::new(AppState::new(&cfg).unwrap())
    }

    fn fixture() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ten.bin"), CONTENT).unwrap();
        std::fs::write(dir.path().join("my file.txt"), b"spaced").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("inner.txt"), b"inner").unwrap();
        let state = test_state(dir.path());
        (dir, state)
    }

    fn peer() -> SocketAddr {
        "[::1]:40000".parse().unwrap()
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        path: &str,
        range: Option<&str>,
    ) -> (Response<()>, Bytes) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(r) = range {
            builder = builder.header("Range", r);
        }
        let req = builder.body(()).unwrap();
        let resp = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let (parts, body) = resp.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (Response::from_parts(parts, ()), bytes)
    }

    async fn get(state: &Arc<AppState>, path: &str, range: Option<&str>) -> (Response<()>, Bytes) {
        send(state, Method::GET, path, range).await
    }

    #[tokio::test]
    async fn test_full_file() {
        let (_dir, state) = fixture();
        let (resp, body) = get(&state, "/ten.bin", None).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Length"], "10");
        assert_eq!(resp.headers()["Content-Type"], "application/octet-stream");
        assert_eq!(resp.headers()["Accept-Ranges"], "bytes");
        assert_eq!(body, CONTENT);
    }

    #[tokio::test]
    async fn test_partial_content() {
        let (_dir, state) = fixture();
        let (resp, body) = get(&state, "/ten.bin", Some("bytes=2-5")).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["Content-Range"], "bytes 2-5/10");
        assert_eq!(resp.headers()["Content-Length"], "4");
        assert_eq!(resp.headers()["Accept-Ranges"], "bytes");
        assert_eq!(body, &CONTENT[2..=5]);
    }

    #[tokio::test]
    async fn test_open_ended_tail() {
        let (_dir, state) = fixture();
        let (resp, body) = get(&state, "/ten.bin", Some("bytes=8-")).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["Content-Range"], "bytes 8-9/10");
        assert_eq!(resp.headers()["Content-Length"], "2");
        assert_eq!(body, &b"89"[..]);
    }

    #[tokio::test]
    async fn test_last_byte() {
        let (_dir, state) = fixture();
        let (resp, body) = get(&state, "/ten.bin", Some("bytes=9-9")).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(body, &b"9"[..]);
    }

    #[tokio::test]
    async fn test_split_ranges_rebuild_file() {
        let (_dir, state) = fixture();
        for k in 0..9 {
            let (_, head) = get(&state, "/ten.bin", Some(&format!("bytes=0-{k}"))).await;
            let (_, tail) = get(&state, "/ten.bin", Some(&format!("bytes={}-9", k + 1))).await;
            let mut joined = head.to_vec();
            joined.extend_from_slice(&tail);
            assert_eq!(joined, CONTENT, "split at {k}");
        }
    }

    #[tokio::test]
    async fn test_range_not_satisfiable() {
        let (_dir, state) = fixture();
        for range in [
            "bytes=10-",
            "bytes=0-10",
            "bytes=12-20",
            "bytes=7-3",
            "bytes=99999999999999999999-",
            "bytes=0-99999999999999999999",
        ] {
            let (resp, body) = get(&state, "/ten.bin", Some(range)).await;
            assert_eq!(resp.status(), 416, "{range}");
            assert_eq!(resp.headers()["Content-Range"], "bytes */10");
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_malformed_range_serves_full_file() {
        let (_dir, state) = fixture();
        for range in ["bytes=x-3", "bytes=-3", "bytes=0-1,4-5", "lines=1-2"] {
            let (resp, body) = get(&state, "/ten.bin", Some(range)).await;
            assert_eq!(resp.status(), 200, "{range}");
            assert_eq!(body, CONTENT);
        }
    }

    #[tokio::test]
    async fn test_root_listing() {
        let (_dir, state) = fixture();
        let (resp, body) = get(&state, "/", None).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.starts_with("<h1>Directory Listing</h1><ul>"));
        assert_eq!(html.matches("<li>").count(), 3);
        assert!(html.contains("<a href=\"/ten.bin\">ten.bin</a>"));
        assert!(html.contains("<a href=\"/my%20file.txt\">my file.txt</a>"));
        assert!(html.contains("<a href=\"/sub\">sub</a>"));
    }

    #[tokio::test]
    async fn test_subdirectory_listing() {
        let (_dir, state) = fixture();
        let (resp, body) = get(&state, "/sub/", None).await;
        assert_eq!(resp.status(), 200);
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<a href=\"/sub/inner.txt\">inner.txt</a>"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (_dir, state) = fixture();
        let (resp, body) = get(&state, "/does-not-exist.txt", None).await;
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.headers()["Content-Type"], "text/plain");
        assert_eq!(body, &b"File Not Found"[..]);
    }

    #[tokio::test]
    async fn test_traversal_is_not_found() {
        let (dir, state) = fixture();
        let secret_name = dir
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        for path in [
            "/../etc/passwd".to_string(),
            "/%2e%2e/etc/passwd".to_string(),
            format!("/../{secret_name}/ten.bin"),
        ] {
            let (resp, _) = get(&state, &path, None).await;
            assert_eq!(resp.status(), 404, "{path}");
        }
    }

    #[tokio::test]
    async fn test_percent_encoded_name() {
        let (_dir, state) = fixture();
        let (resp, body) = get(&state, "/my%20file.txt", None).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/plain; charset=utf-8");
        assert_eq!(body, &b"spaced"[..]);
    }

    #[tokio::test]
    async fn test_head_request() {
        let (_dir, state) = fixture();
        let (resp, body) = send(&state, Method::HEAD, "/ten.bin", Some("bytes=0-3")).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(resp.headers()["Content-Length"], "4");
        assert!(body.is_empty());
    }

    #[test]
    fn test_access_entry_counts_no_body_for_head() {
        let response = Response::builder()
            .status(206)
            .header("Content-Length", "4")
            .body(crate::http::body::empty())
            .unwrap();

        for (method, expected) in [(Method::GET, 4), (Method::HEAD, 0)] {
            let (parts, ()) = Request::builder()
                .method(method.clone())
                .uri("/ten.bin")
                .header("Range", "bytes=0-3")
                .header("User-Agent", "curl/8.0")
                .body(())
                .unwrap()
                .into_parts();
            let ctx = RequestContext {
                path: parts.uri.path(),
                is_head: method == Method::HEAD,
                range_header: header_string(&parts.headers, "range"),
            };

            let entry = access_entry(&parts, &ctx, &response, peer());
            assert_eq!(entry.status, 206);
            assert_eq!(entry.body_bytes, expected, "{method}");
            assert_eq!(entry.range.as_deref(), Some("bytes=0-3"));
            assert_eq!(entry.user_agent.as_deref(), Some("curl/8.0"));
        }
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let (_dir, state) = fixture();
        let (resp, _) = send(&state, Method::POST, "/ten.bin", None).await;
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["Allow"], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_custom_mime_lookup() {
        fn everything_is_video(_: &Path) -> Option<&'static str> {
            Some("video/mp4")
        }

        let (dir, _) = fixture();
        let state = Arc::try_unwrap(test_state(dir.path()))
            .ok()
            .unwrap()
            .with_mime_lookup(everything_is_video);
        let state = Arc::new(state);

        let (resp, _) = get(&state, "/ten.bin", None).await;
        assert_eq!(resp.headers()["Content-Type"], "video/mp4");
    }

    #[tokio::test]
    async fn test_empty_file() {
        let (dir, state) = fixture();
        std::fs::write(dir.path().join("empty"), b"").unwrap();

        let (resp, body) = get(&state, "/empty", None).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Length"], "0");
        assert!(body.is_empty());

        let (resp, _) = get(&state, "/empty", Some("bytes=0-")).await;
        assert_eq!(resp.status(), 416);
        assert_eq!(resp.headers()["Content-Range"], "bytes */0");
    }
}
