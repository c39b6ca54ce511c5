//! Request handler module
//!
//! Path resolution, directory listings and file streaming, tied together by the
//! request dispatcher.

pub mod listing;
pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
