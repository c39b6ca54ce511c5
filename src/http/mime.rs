//! MIME type detection module
//!
//! Maps file extensions to Content-Type values.

use std::path::Path;

/// Content type sent when the lookup has no answer
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Pluggable MIME lookup capability carried in the application state
pub type MimeLookup = fn(&Path) -> Option<&'static str>;

/// Look up the MIME type for a path by its extension
///
/// # Examples
/// ```
/// use dualserve::http::mime::lookup;
/// use std::path::Path;
/// assert_eq!(lookup(Path::new("movie.MP4")), Some("video/mp4"));
/// assert_eq!(lookup(Path::new("README")), None);
/// ```
pub fn lookup(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    extension_type(&ext)
}

/// Resolve the Content-Type through a lookup, falling back to the default
pub fn content_type(lookup: MimeLookup, path: &Path) -> &'static str {
    lookup(path).unwrap_or(DEFAULT_CONTENT_TYPE)
}

fn extension_type(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "vtt" => "text/vtt",
        "srt" => "application/x-subrip",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Video
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "ts" => "video/mp2t",
        "m3u8" => "application/vnd.apple.mpegurl",

        // Audio
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "opus" => "audio/opus",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "iso" => "application/x-iso9660-image",

        _ => return None,
    };
    Some(mime)
}
