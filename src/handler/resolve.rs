//! Path resolution module
//!
//! Maps a request path onto the served root and classifies what is there.
//! Filesystem metadata is queried fresh for every request.

use crate::logger;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What a request path points at
#[derive(Debug, PartialEq, Eq)]
pub enum ResolvedTarget {
    Directory(PathBuf),
    File { path: PathBuf, size: u64 },
    Missing,
}

/// Resolve `request_path` (URI path, still percent-encoded) under `root`
///
/// `root` must already be canonical. Paths that climb above the root, either
/// lexically through `..` or through a symlink, resolve to `Missing`.
pub async fn resolve(root: &Path, request_path: &str) -> ResolvedTarget {
    let Some(relative) = normalize(request_path) else {
        logger::log_debug(&format!("Rejected request path: {request_path}"));
        return ResolvedTarget::Missing;
    };

    // "/" is always the listing root
    if relative.as_os_str().is_empty() {
        return ResolvedTarget::Directory(root.to_path_buf());
    }

    let candidate = root.join(&relative);
    let Ok(metadata) = fs::metadata(&candidate).await else {
        return ResolvedTarget::Missing;
    };

    match fs::canonicalize(&candidate).await {
        Ok(canonical) if canonical.starts_with(root) => {}
        Ok(canonical) => {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                request_path,
                canonical.display()
            ));
            return ResolvedTarget::Missing;
        }
        Err(_) => return ResolvedTarget::Missing,
    }

    if metadata.is_dir() {
        ResolvedTarget::Directory(candidate)
    } else if metadata.is_file() {
        ResolvedTarget::File {
            path: candidate,
            size: metadata.len(),
        }
    } else {
        ResolvedTarget::Missing
    }
}

/// Percent-decode and lexically normalize a request path into a relative path
///
/// Returns `None` when the path is not valid UTF-8 after decoding, contains a
/// backslash or NUL, or uses `..` to leave the root.
pub fn normalize(request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s if s.contains(['\\', '\0']) => return None,
            s => segments.push(s),
        }
    }

    Some(segments.iter().collect())
}
