// Application state module
// Immutable per-process state shared by both listeners

use std::io;
use std::path::PathBuf;

use super::types::Config;
use crate::http::mime::{self, MimeLookup};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical served root; every resolved path must stay under it
    pub root: PathBuf,
    /// MIME lookup capability used by the content streamer
    pub mime_lookup: MimeLookup,
}

impl AppState {
    /// Create `AppState`, canonicalizing the served root
    pub fn new(config: &Config) -> io::Result<Self> {
        let root = PathBuf::from(&config.server.root).canonicalize()?;
        Ok(Self {
            config: config.clone(),
            root,
            mime_lookup: mime::lookup,
        })
    }

    /// Replace the MIME lookup capability
    #[must_use]
    pub fn with_mime_lookup(mut self, lookup: MimeLookup) -> Self {
        self.mime_lookup = lookup;
        self
    }

    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }

    pub const fn chunk_size(&self) -> usize {
        self.config.performance.stream_chunk_size
    }
}
