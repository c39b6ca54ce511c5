//! Command line arguments

use clap::Parser;

use crate::config::{Overrides, DEFAULT_CONFIG_PATH};

/// Serve a directory over HTTP(S) on an IPv6 and an IPv4 endpoint
#[derive(Debug, Parser)]
#[command(name = "dualserve", version, about)]
pub struct Cli {
    /// Serve over HTTPS using the configured certificate and key
    #[arg(long)]
    pub use_https: bool,

    /// Config file path; the extension may be omitted
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Directory to serve, overriding `server.root`
    #[arg(short, long)]
    pub root: Option<String>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            use_https: self.use_https,
            root: self.root.clone(),
        }
    }
}
