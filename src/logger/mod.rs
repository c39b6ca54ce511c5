//! Logger module
//!
//! Logging utilities for the server:
//! - Listener lifecycle logging
//! - Per-request and access logging with multiple formats
//! - Error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write(level: Level, message: &str) {
    if let Some(w) = writer::get() {
        w.write(level, message);
    } else if level <= Level::Warn {
        eprintln!("{message}");
    } else if level == Level::Info {
        println!("{message}");
    }
}

pub fn log_server_start(config: &Config) {
    write(Level::Info, "======================================");
    write(Level::Info, "Static file server starting");
    write(Level::Info, &format!("Serving root: {}", config.server.root));
    write(Level::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write(Level::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write(Level::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write(Level::Info, &format!("Error log: {path}"));
    }
    write(Level::Info, "======================================");
}

/// `Serving HTTP on http://[::]:8000 (IPv6)`
pub fn log_listening(addr: &SocketAddr, protocol: &str) {
    let family = if addr.is_ipv6() { "IPv6" } else { "IPv4" };
    write(
        Level::Info,
        &format!(
            "Serving {protocol} on {}://{addr} ({family})",
            protocol.to_ascii_lowercase()
        ),
    );
}

pub fn log_request(method: &str, path: &str, peer_addr: &SocketAddr) {
    write(
        Level::Info,
        &format!("[Request] {method} {path} from {peer_addr}"),
    );
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    if let Some(w) = writer::get() {
        w.write_access(&line);
    } else {
        println!("{line}");
    }
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write(Level::Debug, &format!("[Connection] Closed with error: {err}"));
}

pub fn log_tls_handshake_failed(peer_addr: &SocketAddr, err: &std::io::Error) {
    write(
        Level::Warn,
        &format!("[WARN] TLS handshake with {peer_addr} failed: {err}"),
    );
}

pub fn log_shutdown(reason: &str) {
    write(Level::Info, &format!("[Shutdown] {reason}, stopping listeners"));
}

pub fn log_error(message: &str) {
    write(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_debug(message: &str) {
    write(Level::Debug, &format!("[DEBUG] {message}"));
}
