//! Response body types
//!
//! Every response carries a boxed body: either a fixed buffer or a lazily read
//! slice of a file on disk.

use futures_util::TryStreamExt;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Body type shared by all responses
pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// Fixed in-memory body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Zero-length body
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

/// Open `path` and stream `len` bytes starting at `start`
///
/// The file is read one chunk at a time, only when the connection polls for
/// more data. The handle lives inside the body and is closed when the body is
/// dropped.
pub async fn file_slice(
    path: &Path,
    start: u64,
    len: u64,
    chunk_size: usize,
) -> io::Result<ResponseBody> {
    let mut file = File::open(path).await?;
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }

    let stream = ReaderStream::with_capacity(file.take(len), chunk_size).map_ok(Frame::data);
    Ok(StreamBody::new(stream).boxed())
}
