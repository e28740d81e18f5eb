//! Local LSP flooding walk.
//!
//! Decides which links light up, and when, while one router's link-state
//! packet floods the network. The walk is independent of whatever flooding
//! trace the backend returned; it only looks at the current topology.
//!
//! Starting at the source, every expansion of a router at level `L` sends one
//! LSP marker over each link that has not been animated yet towards each
//! neighbor that has not yet expanded, delayed by
//! `base_delay + L * propagation_delay`. When a marker arrives, its target
//! expands at level `L + 1`. Both orientations of a link are recorded as
//! visited, so a physical link is animated at most once per walk, and the walk
//! ends because the visited set only grows.

use std::collections::HashSet;
use std::time::Duration;

use linkstate_topology::{RouterId, Topology};
use tracing::trace;

/// One link traversal produced by an expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodHop {
    pub from: RouterId,
    pub to: RouterId,
    /// Level of the expanding router (0 for the source).
    pub level: u32,
    /// Delay from the expansion until the marker launches.
    pub delay: Duration,
}

/// State of one router's flood.
#[derive(Debug, Clone)]
pub struct FloodWalk {
    source: RouterId,
    base_delay: Duration,
    propagation_delay: Duration,
    seen: HashSet<RouterId>,
    visited_pairs: HashSet<(RouterId, RouterId)>,
}

impl FloodWalk {
    /// Create a walk for `source`.
    pub fn new(source: RouterId, base_delay: Duration, propagation_delay: Duration) -> Self {
        Self {
            source,
            base_delay,
            propagation_delay,
            seen: HashSet::new(),
            visited_pairs: HashSet::new(),
        }
    }

    /// The flooding router.
    pub fn source(&self) -> &RouterId {
        &self.source
    }

    /// Expand the source router at level 0.
    pub fn start(&mut self, topology: &Topology) -> Vec<FloodHop> {
        let source = self.source.clone();
        self.expand(&source, 0, topology)
    }

    /// Expand `current` at `level` and return the hops to animate.
    pub fn expand(&mut self, current: &RouterId, level: u32, topology: &Topology) -> Vec<FloodHop> {
        self.seen.insert(current.clone());
        let delay = self.base_delay + self.propagation_delay * level;

        let mut hops = Vec::new();
        for neighbor in topology.neighbors(current.as_str()) {
            let forward = (current.clone(), neighbor.clone());
            if self.visited_pairs.contains(&forward) || self.seen.contains(&neighbor) {
                continue;
            }
            self.visited_pairs.insert((neighbor.clone(), current.clone()));
            self.visited_pairs.insert(forward);

            trace!(from = %current, to = %neighbor, level, "flood hop");
            hops.push(FloodHop {
                from: current.clone(),
                to: neighbor,
                level,
                delay,
            });
        }
        hops
    }

    /// Whether the link between `a` and `b` has been animated.
    #[cfg(test)]
    pub fn has_visited(&self, a: &RouterId, b: &RouterId) -> bool {
        self.visited_pairs.contains(&(a.clone(), b.clone()))
    }

    /// Number of physical links animated so far.
    pub fn visited_links(&self) -> usize {
        self.visited_pairs.len() / 2
    }
}
