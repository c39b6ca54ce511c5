//! Per-request error taxonomy
//!
//! Every variant is scoped to a single request and maps to exactly one response.

use crate::http::{self, ResponseBody};
use hyper::Response;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("resource not found")]
    NotFound,

    #[error("failed to read directory: {0}")]
    DirectoryRead(#[source] io::Error),

    #[error("range not satisfiable for {total} bytes")]
    RangeNotSatisfiable { total: u64 },

    #[error("failed to open file: {0}")]
    FileOpen(#[source] io::Error),

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl ServeError {
    /// Convert the error into the response the client sees
    pub fn into_response(self) -> Response<ResponseBody> {
        match self {
            Self::NotFound => http::build_404_response(),
            Self::DirectoryRead(_) => http::build_500_response("Error reading directory"),
            Self::RangeNotSatisfiable { total } => http::build_416_response(total),
            // File removed between classification and open
            Self::FileOpen(e) if e.kind() == io::ErrorKind::NotFound => {
                http::build_404_response()
            }
            Self::FileOpen(_) => http::build_500_response("Error reading file"),
            Self::MethodNotAllowed => http::build_405_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServeError::NotFound.into_response().status(), 404);
        assert_eq!(
            ServeError::DirectoryRead(io::Error::from(io::ErrorKind::PermissionDenied))
                .into_response()
                .status(),
            500
        );
        let resp = ServeError::RangeNotSatisfiable { total: 10 }.into_response();
        assert_eq!(resp.status(), 416);
        assert_eq!(resp.headers()["Content-Range"], "bytes */10");
        assert_eq!(
            ServeError::FileOpen(io::Error::from(io::ErrorKind::NotFound))
                .into_response()
                .status(),
            404
        );
        assert_eq!(
            ServeError::FileOpen(io::Error::from(io::ErrorKind::PermissionDenied))
                .into_response()
                .status(),
            500
        );
        let resp = ServeError::MethodNotAllowed.into_response();
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["Allow"], "GET, HEAD");
    }
}
