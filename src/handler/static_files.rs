//! Static file serving module
//!
//! Emits whole-file, partial-content and unsatisfiable-range responses for a
//! resolved file, streaming the bytes from disk.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::{self, body, mime, ResponseBody};
use crate::http::range::RangeParseResult;
use crate::logger;
use hyper::Response;
use std::path::Path;

/// Serve `path` (of `size` bytes), honouring the request's Range header
pub async fn serve_file(
    ctx: &RequestContext<'_>,
    state: &AppState,
    path: &Path,
    size: u64,
) -> Result<Response<ResponseBody>, ServeError> {
    let content_type = mime::content_type(state.mime_lookup, path);

    match http::parse_range_header(ctx.range_header.as_deref(), size) {
        RangeParseResult::Valid(range) => {
            logger::log_debug(&format!(
                "Serving {} of {}",
                range.content_range(),
                path.display()
            ));
            let body = open_body(ctx, path, range.start, range.len(), state.chunk_size()).await?;
            Ok(http::build_partial_response(body, content_type, &range))
        }
        RangeParseResult::NotSatisfiable => Err(ServeError::RangeNotSatisfiable { total: size }),
        RangeParseResult::None => {
            if let Some(header) = ctx.range_header.as_deref() {
                logger::log_debug(&format!("Ignoring malformed Range header: {header}"));
            }
            let body = open_body(ctx, path, 0, size, state.chunk_size()).await?;
            Ok(http::build_file_response(body, content_type, size))
        }
    }
}

/// Body for the interval, or nothing for HEAD requests
async fn open_body(
    ctx: &RequestContext<'_>,
    path: &Path,
    start: u64,
    len: u64,
    chunk_size: usize,
) -> Result<ResponseBody, ServeError> {
    if ctx.is_head {
        return Ok(body::empty());
    }
    body::file_slice(path, start, len, chunk_size)
        .await
        .map_err(ServeError::FileOpen)
}
