//! Error types for the visualizer.

use linkstate_topology::TopologyError;
use thiserror::Error;

/// Result type for visualizer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the visualizer.
#[derive(Debug, Error)]
pub enum Error {
    /// No source router selected
    #[error("Please select a source router")]
    NoSource,

    /// Topology has no routers
    #[error("Please add some routers first")]
    NoRouters,

    /// Topology has no links
    #[error("Please add some links first")]
    NoLinks,

    /// Destructive request without confirmation
    #[error("Clearing the network requires confirmation")]
    Unconfirmed,

    /// Another phase is still animating
    #[error("Another phase is still running")]
    Busy,

    /// Topology mutation rejected
    #[error("Topology rejected: {0}")]
    Topology(#[from] TopologyError),

    /// Backend unreachable or request failed
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned status {0}")]
    Status(u16),

    /// Backend body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error is a user-facing precondition rather than a failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::NoSource
                | Error::NoRouters
                | Error::NoLinks
                | Error::Unconfirmed
                | Error::Topology(_)
        )
    }
}
