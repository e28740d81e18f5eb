//! Runtime configuration.

use std::net::SocketAddr;

use crate::error::{Error, Result};
use crate::phase::Timings;
use crate::playback::PlaybackSpeed;

/// Visualizer configuration.
#[derive(Debug, Clone)]
pub struct VisConfig {
    /// Address the HTTP/WebSocket server binds to.
    pub listen_addr: SocketAddr,
    /// Base URL of the routing backend.
    pub backend_url: String,
    /// Initial playback speed.
    pub speed: PlaybackSpeed,
    /// Choreography constants.
    pub timings: Timings,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            backend_url: "http://127.0.0.1:5000".to_string(),
            speed: PlaybackSpeed::Normal,
            timings: Timings::default(),
        }
    }
}

impl VisConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("LINKSTATE_LISTEN_ADDR") {
            config.listen_addr = addr
                .parse()
                .map_err(|e| Error::Config(format!("invalid LINKSTATE_LISTEN_ADDR {addr:?}: {e}")))?;
        }

        if let Some(url) = lookup("LINKSTATE_BACKEND_URL") {
            let url = url.trim().trim_end_matches('/');
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "invalid LINKSTATE_BACKEND_URL {url:?}: expected http(s) URL"
                )));
            }
            config.backend_url = url.to_string();
        }

        if let Some(speed) = lookup("LINKSTATE_SPEED") {
            config.speed = speed.parse().map_err(Error::Config)?;
        }

        Ok(config)
    }
}
