// Configuration module entry point
// Loads layered configuration and builds the shared runtime state

mod state;
mod types;

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig, TlsConfig};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `FILESERVER_SERVER__IPV4_PORT=9001`
const ENV_PREFIX: &str = "FILESERVER";

/// Values supplied on the command line, applied over every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub use_https: bool,
    pub root: Option<String>,
}

impl Config {
    /// Load configuration from specified file path
    ///
    /// Sources, lowest priority first: built-in defaults, the config file (if it
    /// exists), `FILESERVER_*` environment variables, command line overrides.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.root", ".")?
            .set_default("server.ipv6_host", "::")?
            .set_default("server.ipv6_port", 8000)?
            .set_default("server.ipv4_host", "0.0.0.0")?
            .set_default("server.ipv4_port", 8001)?
            .set_default("tls.enabled", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 0)?
            .set_default("performance.stream_chunk_size", 64 * 1024)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        if overrides.use_https {
            builder = builder.set_override("tls.enabled", true)?;
        }
        if let Some(root) = &overrides.root {
            builder = builder.set_override("server.root", root.as_str())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check values that deserialization alone cannot
    fn validate(&self) -> Result<(), config::ConfigError> {
        self.ipv6_socket_addr().map_err(config::ConfigError::Message)?;
        self.ipv4_socket_addr().map_err(config::ConfigError::Message)?;
        if self.performance.stream_chunk_size == 0 {
            return Err(config::ConfigError::Message(
                "performance.stream_chunk_size must be greater than 0".to_string(),
            ));
        }
        if !matches!(
            self.logging.level.as_str(),
            "error" | "warn" | "info" | "debug"
        ) {
            return Err(config::ConfigError::Message(format!(
                "Unknown logging.level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    pub fn ipv6_socket_addr(&self) -> Result<SocketAddr, String> {
        let host = self.server.ipv6_host.trim_start_matches('[').trim_end_matches(']');
        host.parse::<Ipv6Addr>()
            .map(|ip| SocketAddr::new(IpAddr::V6(ip), self.server.ipv6_port))
            .map_err(|e| format!("Invalid IPv6 host '{}': {e}", self.server.ipv6_host))
    }

    pub fn ipv4_socket_addr(&self) -> Result<SocketAddr, String> {
        self.server
            .ipv4_host
            .parse::<Ipv4Addr>()
            .map(|ip| SocketAddr::new(IpAddr::V4(ip), self.server.ipv4_port))
            .map_err(|e| format!("Invalid IPv4 host '{}': {e}", self.server.ipv4_host))
    }

    /// Certificate and key paths, if TLS is enabled and both files exist
    pub fn tls_material(&self) -> Result<Option<(&Path, &Path)>, String> {
        if !self.tls.enabled {
            return Ok(None);
        }
        match (&self.tls.cert_path, &self.tls.key_path) {
            (Some(cert), Some(key)) if Path::new(cert).is_file() && Path::new(key).is_file() => {
                Ok(Some((Path::new(cert), Path::new(key))))
            }
            _ => Err("SSL certificate or key file not found.".to_string()),
        }
    }

    /// Scheme name used in startup logs
    pub const fn protocol(&self) -> &'static str {
        if self.tls.enabled {
            "HTTPS"
        } else {
            "HTTP"
        }
    }
}
