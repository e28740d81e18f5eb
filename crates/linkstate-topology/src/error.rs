//! Error types for linkstate-topology.

use thiserror::Error;

/// Result type for topology mutations.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Reasons a topology mutation was rejected.
///
/// A rejected mutation leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A router name or link endpoint was empty.
    #[error("empty router name")]
    EmptyName,

    /// A router with this name already exists.
    #[error("router {0} already exists")]
    DuplicateRouter(String),

    /// No router with this name exists.
    #[error("unknown router {0}")]
    UnknownRouter(String),

    /// Both link endpoints were the same router.
    #[error("link from {0} to itself")]
    SelfLoop(String),

    /// The cost was not a positive integer.
    #[error("link cost must be a positive integer")]
    InvalidCost,

    /// A link already joins this pair, in either orientation.
    #[error("link {0} already exists")]
    DuplicateLink(String),

    /// No link with this identifier exists.
    #[error("unknown link {0}")]
    UnknownLink(String),
}
