//! Static file server for a local directory tree.
//!
//! Serves directory listings, whole files and single byte ranges (`206 Partial
//! Content`) streamed from disk, on an IPv6 and an IPv4 listener at the same
//! time, over plain HTTP or TLS.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
