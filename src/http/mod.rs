//! HTTP protocol layer module
//!
//! Range parsing, MIME lookup, body types and response builders, independent of
//! how requests are mapped onto the filesystem.

pub mod body;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_404_response, build_405_response, build_416_response, build_500_response,
    build_file_response, build_html_response, build_partial_response,
};
