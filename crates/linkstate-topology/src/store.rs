//! The topology store.
//!
//! Owns routers and links and enforces the graph invariants:
//!
//! - router identifiers are unique and non-empty
//! - links never loop back to their source
//! - at most one link joins any unordered pair of routers
//! - every link endpoint is a stored router (removing a router removes its
//!   incident links in the same call)
//!
//! Collections keep insertion order, which is the order routers and links
//! are listed in backend requests and pickers.

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::link::parse_cost;
use crate::snapshot::{LinkOption, LinkSpec, Selections, TopologySnapshot};
use crate::{Link, LinkId, Router, RouterId};

/// In-memory router/link graph.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    routers: Vec<Router>,
    links: Vec<Link>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a router named `name`.
    pub fn add_router(&mut self, name: &str) -> Result<&Router> {
        if name.is_empty() {
            return Err(TopologyError::EmptyName);
        }
        if self.contains_router(name) {
            return Err(TopologyError::DuplicateRouter(name.to_string()));
        }
        self.routers.push(Router::new(RouterId::new(name)));
        Ok(&self.routers[self.routers.len() - 1])
    }

    /// Remove a router and every link touching it.
    ///
    /// Returns the identifiers of the removed links.
    pub fn remove_router(&mut self, name: &str) -> Result<Vec<LinkId>> {
        let index = self
            .routers
            .iter()
            .position(|r| r.id() == &name)
            .ok_or_else(|| TopologyError::UnknownRouter(name.to_string()))?;
        self.routers.remove(index);

        let mut removed = Vec::new();
        self.links.retain(|link| {
            if link.touches(name) {
                removed.push(link.id().clone());
                false
            } else {
                true
            }
        });
        debug!(router = name, incident_links = removed.len(), "router removed");
        Ok(removed)
    }

    /// Insert a link from `source` to `target`.
    ///
    /// Rejected when an endpoint is empty or unknown, when both endpoints are
    /// the same router, when `cost` is below [`crate::MIN_LINK_COST`], or
    /// when a link already joins the pair in either orientation.
    pub fn add_link(&mut self, source: &str, target: &str, cost: u32) -> Result<&Link> {
        if source.is_empty() || target.is_empty() {
            return Err(TopologyError::EmptyName);
        }
        if source == target {
            return Err(TopologyError::SelfLoop(source.to_string()));
        }
        if cost < crate::MIN_LINK_COST {
            return Err(TopologyError::InvalidCost);
        }
        for endpoint in [source, target] {
            if !self.contains_router(endpoint) {
                return Err(TopologyError::UnknownRouter(endpoint.to_string()));
            }
        }
        if let Some(existing) = self.link_between(source, target) {
            return Err(TopologyError::DuplicateLink(existing.id().to_string()));
        }

        self.links
            .push(Link::new(RouterId::new(source), RouterId::new(target), cost));
        Ok(&self.links[self.links.len() - 1])
    }

    /// Insert a link whose cost comes from user text input.
    ///
    /// The cost is parsed with [`parse_cost`]; unparsable or non-positive
    /// input is rejected with [`TopologyError::InvalidCost`].
    pub fn add_link_from_input(&mut self, source: &str, target: &str, cost: &str) -> Result<&Link> {
        let cost = parse_cost(cost).ok_or(TopologyError::InvalidCost)?;
        self.add_link(source, target, cost)
    }

    /// Remove the link with identifier `id`.
    pub fn remove_link(&mut self, id: &str) -> Result<Link> {
        let index = self
            .links
            .iter()
            .position(|l| l.id() == &id)
            .ok_or_else(|| TopologyError::UnknownLink(id.to_string()))?;
        Ok(self.links.remove(index))
    }

    /// Remove every router and link.
    pub fn clear(&mut self) {
        debug!(
            routers = self.routers.len(),
            links = self.links.len(),
            "topology cleared"
        );
        self.routers.clear();
        self.links.clear();
    }

    /// Look up a router by name.
    pub fn router(&self, name: &str) -> Option<&Router> {
        self.routers.iter().find(|r| r.id() == &name)
    }

    /// Whether a router named `name` exists.
    pub fn contains_router(&self, name: &str) -> bool {
        self.router(name).is_some()
    }

    /// Look up a link by identifier.
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id() == &id)
    }

    /// The link joining `a` and `b`, trying the `a-b` orientation first and
    /// falling back to `b-a`.
    ///
    /// Lookup is by identifier, and identifiers are ambiguous once router
    /// names contain `-`: `A` + `B-C` and `A-B` + `C` both give `A-B-C`.
    pub fn link_between(&self, a: &str, b: &str) -> Option<&Link> {
        let forward = LinkId::between(a, b);
        let reverse = LinkId::between(b, a);
        self.link(forward.as_str())
            .or_else(|| self.link(reverse.as_str()))
    }

    /// Routers in insertion order.
    pub fn routers(&self) -> impl Iterator<Item = &Router> {
        self.routers.iter()
    }

    /// Links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    /// Number of routers.
    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether the topology has no routers (and therefore no links).
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Distinct routers joined to `router` by a link, in link order.
    pub fn neighbors(&self, router: &str) -> Vec<RouterId> {
        let mut neighbors: Vec<RouterId> = Vec::new();
        for link in &self.links {
            if let Some(other) = link.other_end(router) {
                if !neighbors.contains(other) {
                    neighbors.push(other.clone());
                }
            }
        }
        neighbors
    }

    /// The `{routers, links}` view sent to the routing backend.
    pub fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot {
            routers: self.routers.iter().map(|r| r.id().clone()).collect(),
            links: self
                .links
                .iter()
                .map(|l| LinkSpec {
                    source: l.source().clone(),
                    target: l.target().clone(),
                    cost: l.cost(),
                })
                .collect(),
        }
    }

    /// Current contents of the router and link pickers.
    pub fn selections(&self) -> Selections {
        Selections {
            routers: self.routers.iter().map(|r| r.id().clone()).collect(),
            links: self
                .links
                .iter()
                .map(|l| LinkOption {
                    id: l.id().clone(),
                    text: l.describe(),
                })
                .collect(),
        }
    }
}
