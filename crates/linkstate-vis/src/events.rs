//! Visualization events for the playback log.

use linkstate_topology::{LinkId, RouterId};
use serde::{Deserialize, Serialize};

use crate::marker::MarkerId;
use crate::phase::Phase;
use crate::style::MarkerRole;

/// Observable steps of the choreography, stamped with animation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VisEvent {
    /// A phase began animating
    PhaseStarted {
        phase: Phase,
        at_ms: u64,
        estimated_ms: u64,
    },

    /// A packet marker left its source
    MarkerLaunched {
        marker: MarkerId,
        role: MarkerRole,
        source: RouterId,
        target: RouterId,
        at_ms: u64,
    },

    /// A packet marker reached its target and was removed
    MarkerArrived {
        marker: MarkerId,
        role: MarkerRole,
        source: RouterId,
        target: RouterId,
        at_ms: u64,
    },

    /// An LSP crossed a link during flooding
    LinkFlooded {
        link: Option<LinkId>,
        origin: RouterId,
        from: RouterId,
        to: RouterId,
        level: u32,
        at_ms: u64,
    },

    /// A phase has no pending work and no marker in flight
    PhaseSettled {
        phase: Phase,
        at_ms: u64,
        elapsed_ms: u64,
        estimated_ms: u64,
    },

    /// Routers or links were added or removed
    TopologyChanged {
        routers: usize,
        links: usize,
        at_ms: u64,
    },
}

impl VisEvent {
    /// Get the animation time of this event in milliseconds.
    pub fn at_ms(&self) -> u64 {
        match self {
            VisEvent::PhaseStarted { at_ms, .. } => *at_ms,
            VisEvent::MarkerLaunched { at_ms, .. } => *at_ms,
            VisEvent::MarkerArrived { at_ms, .. } => *at_ms,
            VisEvent::LinkFlooded { at_ms, .. } => *at_ms,
            VisEvent::PhaseSettled { at_ms, .. } => *at_ms,
            VisEvent::TopologyChanged { at_ms, .. } => *at_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization() {
        let event = VisEvent::PhaseSettled {
            phase: Phase::Flooding,
            at_ms: 9000,
            elapsed_ms: 7000,
            estimated_ms: 8000,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"PhaseSettled\""));
        assert!(json.contains("\"phase\":\"flooding\""));

        let parsed: VisEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.at_ms(), 9000);
        assert_eq!(parsed, event);
    }

    #[test]
    fn marker_event_carries_role() {
        let event = VisEvent::MarkerLaunched {
            marker: MarkerId::new(MarkerRole::Reply, "B", "A", 2000, 3),
            role: MarkerRole::Reply,
            source: "B".into(),
            target: "A".into(),
            at_ms: 2000,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["role"], "reply");
        assert_eq!(value["marker"], "reply-B-A-2000-3");
    }
}
