// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub tls: TlsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener and served-root configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Directory tree served to clients
    pub root: String,
    pub ipv6_host: String,
    pub ipv6_port: u16,
    pub ipv4_host: String,
    pub ipv4_port: u16,
    pub workers: Option<usize>,
}

/// TLS configuration, applied to both listeners when enabled
#[derive(Debug, Deserialize, Clone)]
pub struct TlsConfig {
    pub enabled: bool,
    /// PEM certificate chain
    pub cert_path: Option<String>,
    /// PEM private key (PKCS#1, PKCS#8 or SEC1, unencrypted)
    pub key_path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level written: error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Whole-connection timeout in seconds, 0 disables it
    pub connection_timeout: u64,
    /// Read buffer size used when streaming files
    pub stream_chunk_size: usize,
    /// Per-listener connection cap
    pub max_connections: Option<u64>,
}
