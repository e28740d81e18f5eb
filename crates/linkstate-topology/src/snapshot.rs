//! Serializable views of the topology.
//!
//! `TopologySnapshot` is the `{routers, links}` body sent to the routing
//! backend; `Selections` feeds the router and link pickers.

use crate::{LinkId, RouterId};

/// A link as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkSpec {
    pub source: RouterId,
    pub target: RouterId,
    pub cost: u32,
}

/// Routers and links in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopologySnapshot {
    pub routers: Vec<RouterId>,
    pub links: Vec<LinkSpec>,
}

/// One entry of the link picker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkOption {
    pub id: LinkId,
    pub text: String,
}

/// Contents of every router/link picker, refreshed after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selections {
    pub routers: Vec<RouterId>,
    pub links: Vec<LinkOption>,
}
