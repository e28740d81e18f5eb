//! Protocol phases and their timing.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What the visualizer is currently animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Discovering,
    Flooding,
    BuildingTables,
}

impl Phase {
    pub fn is_idle(self) -> bool {
        self == Phase::Idle
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Discovering => "discovering",
            Phase::Flooding => "flooding",
            Phase::BuildingTables => "building_tables",
        };
        f.write_str(name)
    }
}

/// A phase that can be requested on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    Discovery,
    Flooding,
    RoutingTables,
}

impl PhaseKind {
    /// Pipeline order.
    pub const ALL: [PhaseKind; 3] = [
        PhaseKind::Discovery,
        PhaseKind::Flooding,
        PhaseKind::RoutingTables,
    ];

    /// The phase state while this kind animates.
    pub fn phase(self) -> Phase {
        match self {
            PhaseKind::Discovery => Phase::Discovering,
            PhaseKind::Flooding => Phase::Flooding,
            PhaseKind::RoutingTables => Phase::BuildingTables,
        }
    }

    /// URL segment and log name.
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseKind::Discovery => "discovery",
            PhaseKind::Flooding => "flooding",
            PhaseKind::RoutingTables => "routing-tables",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovery" => Ok(PhaseKind::Discovery),
            "flooding" => Ok(PhaseKind::Flooding),
            "routing-tables" => Ok(PhaseKind::RoutingTables),
            other => Err(format!("unknown phase: {other}")),
        }
    }
}

/// Every constant of the choreography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Flight time of hello and reply markers.
    pub hello_duration: Duration,
    /// Flight time of LSP markers.
    pub lsp_duration: Duration,
    /// Pause between a marker's removal and its continuation.
    pub settle_delay: Duration,
    /// Offset between discovery steps.
    pub discovery_step: Duration,
    /// Offset between hellos of one router.
    pub hello_stagger: Duration,
    /// Offset between replies of one router.
    pub reply_stagger: Duration,
    /// Reply offset relative to the step start.
    pub reply_offset: Duration,
    /// Offset between flooding steps.
    pub flooding_step: Duration,
    /// Extra delay per flooding level.
    pub propagation_delay: Duration,
    /// Pause between pipeline phases once the previous one settled.
    pub phase_buffer: Duration,
    /// Per-step allowance of the discovery estimate.
    pub discovery_step_estimate: Duration,
    /// Per-neighbor allowance of the discovery estimate.
    pub discovery_neighbor_estimate: Duration,
    /// Per-router allowance of the flooding estimate.
    pub flooding_router_estimate: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            hello_duration: Duration::from_millis(1500),
            lsp_duration: Duration::from_millis(800),
            settle_delay: Duration::from_millis(100),
            discovery_step: Duration::from_millis(3000),
            hello_stagger: Duration::from_millis(2300),
            reply_stagger: Duration::from_millis(2000),
            reply_offset: Duration::from_millis(2000),
            flooding_step: Duration::from_millis(5000),
            propagation_delay: Duration::from_millis(1000),
            phase_buffer: Duration::from_millis(500),
            discovery_step_estimate: Duration::from_millis(4000),
            discovery_neighbor_estimate: Duration::from_millis(2500),
            flooding_router_estimate: Duration::from_millis(1000),
        }
    }
}

impl Timings {
    /// Delay of the hello from the `step`-th router to its `neighbor`-th neighbor.
    pub fn hello_delay(&self, step: u32, neighbor: u32) -> Duration {
        self.discovery_step * step + self.hello_stagger * neighbor
    }

    /// Delay of the matching reply.
    pub fn reply_delay(&self, step: u32, neighbor: u32) -> Duration {
        self.discovery_step * step + self.reply_stagger * neighbor + self.reply_offset
    }

    /// Base delay of the `step`-th flooding walk.
    pub fn flooding_base(&self, step: u32) -> Duration {
        self.flooding_step * step
    }

    /// Heuristic length of a discovery phase, given each step's neighbor count.
    pub fn discovery_estimate(&self, neighbor_counts: &[usize]) -> Duration {
        let neighbors: usize = neighbor_counts.iter().sum();
        self.discovery_step_estimate * count(neighbor_counts.len())
            + self.discovery_neighbor_estimate * count(neighbors)
    }

    /// Heuristic length of a flooding phase.
    pub fn flooding_estimate(&self, steps: usize, router_count: usize) -> Duration {
        self.flooding_step * count(steps) + self.flooding_router_estimate * count(router_count)
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
