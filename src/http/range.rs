//! HTTP Range request parsing module
//!
//! Single `bytes=start-end` range parsing, validated against the real file size.

use std::num::IntErrorKind;

/// Validated byte interval, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset
    pub start: u64,
    /// Last byte offset (inclusive)
    pub end: u64,
    /// Total size of the resource
    pub total: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value, e.g. `bytes 0-99/1000`
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(ByteRange),
    /// Range outside the file, or start after end - should return 416
    NotSatisfiable,
    /// No Range header or malformed (ignore, return full content)
    None,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end of file
///
/// Suffix ranges (`bytes=-500`), multiple ranges and other units are treated
/// as malformed and ignored.
///
/// # Examples
/// ```
/// use dualserve::http::range::{parse_range_header, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert!(matches!(result, RangeParseResult::Valid(_)));
///
/// let result = parse_range_header(None, 1000);
/// assert!(matches!(result, RangeParseResult::None));
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(header) = header.trim().strip_prefix("bytes=") else {
        return RangeParseResult::None; // Not bytes unit, ignore
    };

    if header.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = header.split_once('-') else {
        return RangeParseResult::None;
    };

    parse_standard_range(start_str.trim(), end_str.trim(), file_size)
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, file_size: u64) -> RangeParseResult {
    // `u64::from_str` accepts a leading '+', the header grammar does not
    if !is_digits(start_str) {
        return RangeParseResult::None;
    }
    let Some(start) = parse_offset(start_str) else {
        return RangeParseResult::None;
    };

    let end = if end_str.is_empty() {
        match file_size.checked_sub(1) {
            Some(last) => last,
            None => return RangeParseResult::NotSatisfiable,
        }
    } else {
        if !is_digits(end_str) {
            return RangeParseResult::None;
        }
        let Some(e) = parse_offset(end_str) else {
            return RangeParseResult::None;
        };
        e
    };

    if start >= file_size || end >= file_size || start > end {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange {
        start,
        end,
        total: file_size,
    })
}

/// Offsets too large for `u64` saturate, so they land past the end of any file
fn parse_offset(s: &str) -> Option<u64> {
    match s.parse::<u64>() {
        Ok(v) => Some(v),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
        Err(_) => None,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
