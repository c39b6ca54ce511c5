//! Server module entry point
//!
//! Binds the IPv6 and IPv4 listeners, loads TLS material, and runs one accept
//! loop per listener against the same shared state.

pub mod connection;
pub mod listener;
pub mod signal;
pub mod tls;

// `loop` is a keyword, so the module is exposed as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

pub use listener::create_listener;
pub use server_loop::start_server_loop;

use crate::config::AppState;
use crate::logger;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Config(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Tls(#[from] tls::TlsError),
}

/// Both bound listeners plus everything needed to serve them
pub struct Server {
    listeners: Vec<TcpListener>,
    state: Arc<AppState>,
    tls: Option<TlsAcceptor>,
}

impl Server {
    /// Load TLS material (if enabled) and bind the IPv6 then the IPv4 listener
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn bind(state: Arc<AppState>) -> Result<Self, ServerError> {
        let config = &state.config;

        let tls = match config.tls_material().map_err(ServerError::Config)? {
            Some((cert, key)) => Some(tls::load_acceptor(cert, key)?),
            None => None,
        };

        let addrs = [
            config.ipv6_socket_addr().map_err(ServerError::Config)?,
            config.ipv4_socket_addr().map_err(ServerError::Config)?,
        ];

        let listeners = addrs
            .into_iter()
            .map(|addr| create_listener(addr).map_err(|source| ServerError::Bind { addr, source }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            listeners,
            state,
            tls,
        })
    }

    /// Actual bound addresses, IPv6 first
    pub fn local_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        self.listeners.iter().map(TcpListener::local_addr).collect()
    }

    /// Serve until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        let protocol = self.state.config.protocol();
        let mut loops = JoinSet::new();

        for listener in self.listeners {
            if let Ok(addr) = listener.local_addr() {
                logger::log_listening(&addr, protocol);
            }
            loops.spawn(start_server_loop(
                listener,
                Arc::clone(&self.state),
                self.tls.clone(),
                shutdown.clone(),
            ));
        }

        while let Some(result) = loops.join_next().await {
            if let Err(e) = result {
                logger::log_error(&format!("Listener task failed: {e}"));
                // One dead listener takes the other down with it
                shutdown.cancel();
            }
        }
    }
}
