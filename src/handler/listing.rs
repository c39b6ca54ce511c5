//! Directory listing module
//!
//! Enumerates a directory and renders it as a list of links. Entries appear in
//! filesystem enumeration order, which differs between filesystems.

use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::{self, ResponseBody};
use hyper::Response;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use tokio::fs;

/// Serve the listing for `dir`, reached through `ctx.path`
pub async fn serve_directory(
    ctx: &RequestContext<'_>,
    dir: &Path,
) -> Result<Response<ResponseBody>, ServeError> {
    let names = read_entries(dir).await.map_err(ServeError::DirectoryRead)?;
    Ok(http::build_html_response(
        render_listing(ctx.path, &names),
        ctx.is_head,
    ))
}

/// Entry names of `dir`, unfiltered and unsorted
pub async fn read_entries(dir: &Path) -> io::Result<Vec<OsString>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name());
    }
    Ok(names)
}

/// Link text is the lossy display form; the href keeps the raw name bytes
pub fn render_listing(request_path: &str, names: &[OsString]) -> String {
    let mut html = String::from("<h1>Directory Listing</h1><ul>");
    for name in names {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>",
            htmlescape::encode_minimal(&entry_href(request_path, name)),
            htmlescape::encode_minimal(&name.to_string_lossy())
        ));
    }
    html.push_str("</ul>");
    html
}

/// Join the (still encoded) request path with an entry name
fn entry_href(request_path: &str, name: &OsStr) -> String {
    format!(
        "{}/{}",
        request_path.trim_end_matches('/'),
        urlencoding::encode_binary(name.as_encoded_bytes())
    )
}
