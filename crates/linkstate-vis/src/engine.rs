//! Choreography engine.
//!
//! [`Visualizer`] owns the topology, the render surface and a virtual-time
//! [`Timeline`]. Phases and path results are turned into timeline entries
//! (marker launches, marker frames, flooding continuations) which run when the
//! owner advances time. Nothing here sleeps; the async session maps virtual
//! time onto the wall clock.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use linkstate_topology::{RouterId, Topology, TopologyError, TopologySnapshot};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::events::VisEvent;
use crate::flood::{FloodHop, FloodWalk};
use crate::highlight::{highlight_paths, reset_styles};
use crate::marker::{MarkerAnimation, MarkerId};
use crate::phase::{Phase, Timings};
use crate::playback::{PlaybackSpeed, PlaybackStatus};
use crate::report;
use crate::style::MarkerRole;
use crate::surface::RenderSurface;
use crate::timeline::Timeline;
use crate::wire::{
    CalculateRequest, CalculateResponse, DiscoveryStep, FloodingStep, RoutingTablesResponse,
};

/// Oldest events are dropped beyond this many.
const EVENT_LOG_LIMIT: usize = 10_000;

/// Work deferred until a marker has landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Expand flooding walk `walk` from `router` at `level`.
    Flood {
        walk: usize,
        router: RouterId,
        level: u32,
    },
}

#[derive(Debug)]
enum Task {
    Launch {
        role: MarkerRole,
        source: RouterId,
        target: RouterId,
        then: Option<Continuation>,
    },
    Frame(MarkerId),
    Continue(Continuation),
}

#[derive(Debug)]
struct InFlight {
    animation: MarkerAnimation,
    then: Option<Continuation>,
}

/// Topology, render surface and animation state of one visualizer.
#[derive(Debug)]
pub struct Visualizer<S> {
    topology: Topology,
    surface: S,
    timings: Timings,
    timeline: Timeline<Task>,
    markers: HashMap<MarkerId, InFlight>,
    walks: HashMap<usize, FloodWalk>,
    phase: Phase,
    phase_started: Duration,
    phase_estimate: Duration,
    events: VecDeque<VisEvent>,
    step_log: String,
    path_results: String,
    next_marker: u64,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl<S: RenderSurface> Visualizer<S> {
    /// Create a visualizer with default timings.
    pub fn new(surface: S) -> Self {
        Self::with_timings(surface, Timings::default())
    }

    pub fn with_timings(surface: S, timings: Timings) -> Self {
        Self {
            topology: Topology::new(),
            surface,
            timings,
            timeline: Timeline::new(),
            markers: HashMap::new(),
            walks: HashMap::new(),
            phase: Phase::Idle,
            phase_started: Duration::ZERO,
            phase_estimate: Duration::ZERO,
            events: VecDeque::new(),
            step_log: String::new(),
            path_results: String::new(),
            next_marker: 0,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current animation time.
    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Event log, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &VisEvent> {
        self.events.iter()
    }

    /// Text log of the last phase or path search.
    pub fn step_log(&self) -> &str {
        &self.step_log
    }

    /// Text of the last path results.
    pub fn path_results(&self) -> &str {
        &self.path_results
    }

    /// Number of markers currently flying.
    pub fn in_flight(&self) -> usize {
        self.markers.len()
    }

    /// Number of pending timeline entries.
    pub fn pending(&self) -> usize {
        self.timeline.len()
    }

    /// No pending entries and no marker in flight.
    pub fn is_settled(&self) -> bool {
        self.timeline.is_empty() && self.markers.is_empty()
    }

    pub fn status(&self, speed: PlaybackSpeed) -> PlaybackStatus {
        PlaybackStatus {
            phase: self.phase,
            speed,
            now_ms: millis(self.now()),
            pending: self.pending(),
            in_flight: self.in_flight(),
            settled: self.is_settled(),
        }
    }

    fn record(&mut self, event: VisEvent) {
        if self.events.len() == EVENT_LOG_LIMIT {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn topology_changed(&mut self) {
        let event = VisEvent::TopologyChanged {
            routers: self.topology.router_count(),
            links: self.topology.link_count(),
            at_ms: millis(self.now()),
        };
        self.record(event);
    }

    // Topology editing. Rejections leave everything unchanged.

    /// Add a router and draw it.
    pub fn add_router(&mut self, name: &str) -> std::result::Result<(), TopologyError> {
        match self.topology.add_router(name) {
            Ok(router) => self.surface.add_router(router),
            Err(e) => {
                debug!(name, error = %e, "router rejected");
                return Err(e);
            }
        }
        self.topology_changed();
        Ok(())
    }

    /// Remove a router and every link touching it.
    pub fn remove_router(&mut self, name: &str) -> std::result::Result<(), TopologyError> {
        let removed = self.topology.remove_router(name).inspect_err(|e| {
            debug!(name, error = %e, "router removal rejected");
        })?;
        for link in &removed {
            self.surface.remove_link(link);
        }
        self.surface.remove_router(&RouterId::new(name));
        self.topology_changed();
        Ok(())
    }

    /// Add a link with a numeric cost.
    pub fn add_link(
        &mut self,
        source: &str,
        target: &str,
        cost: u32,
    ) -> std::result::Result<(), TopologyError> {
        match self.topology.add_link(source, target, cost) {
            Ok(link) => self.surface.add_link(link),
            Err(e) => {
                debug!(source, target, cost, error = %e, "link rejected");
                return Err(e);
            }
        }
        self.topology_changed();
        Ok(())
    }

    /// Add a link whose cost is still the text the user typed.
    pub fn add_link_from_input(
        &mut self,
        source: &str,
        target: &str,
        cost: &str,
    ) -> std::result::Result<(), TopologyError> {
        match self.topology.add_link_from_input(source, target, cost) {
            Ok(link) => self.surface.add_link(link),
            Err(e) => {
                debug!(source, target, cost, error = %e, "link rejected");
                return Err(e);
            }
        }
        self.topology_changed();
        Ok(())
    }

    pub fn remove_link(&mut self, id: &str) -> std::result::Result<(), TopologyError> {
        let link = self.topology.remove_link(id).inspect_err(|e| {
            debug!(id, error = %e, "link removal rejected");
        })?;
        self.surface.remove_link(link.id());
        self.topology_changed();
        Ok(())
    }

    /// Drop the whole topology and cancel every pending animation.
    pub fn clear(&mut self) {
        let cancelled = self.timeline.cancel_all();
        for id in self.markers.keys() {
            self.surface.remove_marker(id);
        }
        self.markers.clear();
        self.walks.clear();
        self.phase = Phase::Idle;
        self.topology.clear();
        self.surface.clear();
        info!(cancelled, "topology cleared");
        self.topology_changed();
    }

    /// Re-run the force layout.
    pub fn reset_layout(&mut self) {
        self.surface.stabilize();
    }

    // Requests to the backend.

    /// Body of a phase request: the current routers and links.
    pub fn phase_request(&self) -> TopologySnapshot {
        self.topology.snapshot()
    }

    /// Body of a path request, after checking there is something to compute.
    pub fn path_request(&self, source: Option<&str>) -> Result<CalculateRequest> {
        let source = source.filter(|s| !s.is_empty()).ok_or(Error::NoSource)?;
        if self.topology.router_count() == 0 {
            return Err(Error::NoRouters);
        }
        if self.topology.link_count() == 0 {
            return Err(Error::NoLinks);
        }
        Ok(CalculateRequest {
            topology: self.topology.snapshot(),
            source: RouterId::new(source),
        })
    }

    /// Fail with [`Error::Busy`] unless no phase is animating.
    pub fn ensure_idle(&self) -> Result<()> {
        if self.phase.is_idle() {
            Ok(())
        } else {
            Err(Error::Busy)
        }
    }

    // Phases.

    fn start_phase(&mut self, phase: Phase, estimate: Duration) {
        self.phase = phase;
        self.phase_started = self.now();
        self.phase_estimate = estimate;
        info!(%phase, estimated_ms = millis(estimate), "phase started");
        self.record(VisEvent::PhaseStarted {
            phase,
            at_ms: millis(self.phase_started),
            estimated_ms: millis(estimate),
        });
    }

    fn settle_if_done(&mut self) {
        if self.phase.is_idle() || !self.is_settled() {
            return;
        }
        let phase = self.phase;
        let now = self.now();
        let elapsed = now.saturating_sub(self.phase_started);
        info!(
            %phase,
            elapsed_ms = millis(elapsed),
            estimated_ms = millis(self.phase_estimate),
            "phase settled"
        );
        self.record(VisEvent::PhaseSettled {
            phase,
            at_ms: millis(now),
            elapsed_ms: millis(elapsed),
            estimated_ms: millis(self.phase_estimate),
        });
        self.walks.clear();
        self.phase = Phase::Idle;
    }

    /// Schedule hello and reply markers for every discovered neighbor.
    pub fn begin_discovery(&mut self, steps: &[DiscoveryStep]) -> Result<()> {
        self.ensure_idle()?;
        reset_styles(&self.topology, &mut self.surface);
        self.step_log = report::discovery_steps(steps);

        for (i, step) in (0u32..).zip(steps) {
            for (n, neighbor) in (0u32..).zip(&step.discovered_neighbors) {
                self.timeline.schedule(
                    self.timings.hello_delay(i, n),
                    Task::Launch {
                        role: MarkerRole::Hello,
                        source: step.router.clone(),
                        target: neighbor.clone(),
                        then: None,
                    },
                );
                self.timeline.schedule(
                    self.timings.reply_delay(i, n),
                    Task::Launch {
                        role: MarkerRole::Reply,
                        source: neighbor.clone(),
                        target: step.router.clone(),
                        then: None,
                    },
                );
            }
        }

        let counts: Vec<usize> = steps.iter().map(|s| s.discovered_neighbors.len()).collect();
        let estimate = self.timings.discovery_estimate(&counts);
        self.start_phase(Phase::Discovering, estimate);
        self.settle_if_done();
        Ok(())
    }

    /// Start one flooding walk per step, each offset by its step index.
    pub fn begin_flooding(&mut self, steps: &[FloodingStep]) -> Result<()> {
        self.ensure_idle()?;
        reset_styles(&self.topology, &mut self.surface);
        self.step_log = report::flooding_steps(steps);
        self.walks.clear();

        let estimate = self
            .timings
            .flooding_estimate(steps.len(), self.topology.router_count());
        self.start_phase(Phase::Flooding, estimate);

        for (i, step) in (0u32..).zip(steps) {
            let mut walk = FloodWalk::new(
                step.source_router.clone(),
                self.timings.flooding_base(i),
                self.timings.propagation_delay,
            );
            let key = i as usize;
            let hops = walk.start(&self.topology);
            self.walks.insert(key, walk);
            self.schedule_hops(key, hops);
        }

        self.settle_if_done();
        Ok(())
    }

    /// Render routing tables. Nothing animates, so the phase settles at once.
    pub fn show_routing_tables(&mut self, tables: &RoutingTablesResponse) -> Result<()> {
        self.ensure_idle()?;
        reset_styles(&self.topology, &mut self.surface);
        self.step_log = report::routing_tables(&tables.routing_tables);
        self.start_phase(Phase::BuildingTables, Duration::ZERO);
        self.settle_if_done();
        Ok(())
    }

    /// Render path results and highlight every path.
    pub fn show_paths(&mut self, response: &CalculateResponse) {
        self.path_results = report::path_results(response);
        self.step_log = report::path_history(&response.history);
        highlight_paths(&self.topology, &mut self.surface, &response.paths);
        info!(paths = response.paths.len(), "paths highlighted");
    }

    // Animation.

    /// Launch a marker from `source` to `target` now.
    pub fn animate_marker(&mut self, source: &str, target: &str, role: MarkerRole) -> MarkerId {
        self.launch(role, RouterId::new(source), RouterId::new(target), None)
    }

    fn launch(
        &mut self,
        role: MarkerRole,
        source: RouterId,
        target: RouterId,
        then: Option<Continuation>,
    ) -> MarkerId {
        let now = millis(self.now());
        let id = MarkerId::new(role, source.as_str(), target.as_str(), now, self.next_marker);
        self.next_marker += 1;

        if let Some(Continuation::Flood { walk, level, .. }) = &then {
            if let Some(origin) = self.walks.get(walk).map(|w| w.source().clone()) {
                let link = self
                    .topology
                    .link_between(source.as_str(), target.as_str())
                    .map(|l| l.id().clone());
                self.record(VisEvent::LinkFlooded {
                    link,
                    origin,
                    from: source.clone(),
                    to: target.clone(),
                    level: level.saturating_sub(1),
                    at_ms: now,
                });
            }
        }

        let duration = match role {
            MarkerRole::Lsp => self.timings.lsp_duration,
            MarkerRole::Hello | MarkerRole::Reply => self.timings.hello_duration,
        };
        let mut animation = MarkerAnimation::launch(
            &mut self.surface,
            id.clone(),
            role,
            source.clone(),
            target.clone(),
            duration,
        );
        debug!(marker = %id, "marker launched");
        self.record(VisEvent::MarkerLaunched {
            marker: id.clone(),
            role,
            source,
            target,
            at_ms: now,
        });

        animation.step(&mut self.surface);
        self.timeline
            .schedule(animation.frame_delay(), Task::Frame(id.clone()));
        self.markers.insert(id.clone(), InFlight { animation, then });
        id
    }

    fn step_marker(&mut self, id: &MarkerId) {
        let Some(flight) = self.markers.get_mut(id) else {
            return;
        };
        if flight.animation.step(&mut self.surface) {
            let delay = flight.animation.frame_delay();
            self.timeline.schedule(delay, Task::Frame(id.clone()));
            return;
        }

        let Some(flight) = self.markers.remove(id) else {
            return;
        };
        debug!(marker = %id, "marker arrived");
        self.record(VisEvent::MarkerArrived {
            marker: id.clone(),
            role: flight.animation.role(),
            source: flight.animation.source().clone(),
            target: flight.animation.target().clone(),
            at_ms: millis(self.now()),
        });
        if let Some(then) = flight.then {
            self.timeline
                .schedule(self.timings.settle_delay, Task::Continue(then));
        }
    }

    fn expand_flood(&mut self, key: usize, router: &RouterId, level: u32) {
        let Some(walk) = self.walks.get_mut(&key) else {
            return;
        };
        let hops = walk.expand(router, level, &self.topology);
        self.schedule_hops(key, hops);
    }

    fn schedule_hops(&mut self, key: usize, hops: Vec<FloodHop>) {
        for hop in hops {
            let then = Continuation::Flood {
                walk: key,
                router: hop.to.clone(),
                level: hop.level + 1,
            };
            self.timeline.schedule(
                hop.delay,
                Task::Launch {
                    role: MarkerRole::Lsp,
                    source: hop.from,
                    target: hop.to,
                    then: Some(then),
                },
            );
        }
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Launch {
                role,
                source,
                target,
                then,
            } => {
                self.launch(role, source, target, then);
            }
            Task::Frame(id) => self.step_marker(&id),
            Task::Continue(Continuation::Flood {
                walk,
                router,
                level,
            }) => self.expand_flood(walk, &router, level),
        }
    }

    // Time.

    /// Due time of the next pending entry.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_due()
    }

    /// Run every entry due at or before `until`, then move the clock there.
    /// Returns how many entries ran.
    pub fn advance_to(&mut self, until: Duration) -> usize {
        let mut processed = 0;
        while let Some((_, task)) = self.timeline.pop_due(until) {
            self.run(task);
            processed += 1;
            self.settle_if_done();
        }
        self.timeline.advance_clock(until);
        processed
    }

    /// Advance the clock by `delta`.
    pub fn advance_by(&mut self, delta: Duration) -> usize {
        self.advance_to(self.now() + delta)
    }

    /// Run the timeline to completion and return the time it settled at.
    pub fn run_until_settled(&mut self) -> Duration {
        while let Some(due) = self.next_deadline() {
            self.advance_to(due);
        }
        self.settle_if_done();
        self.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::style::{LinkStyle, NodeStyle, PATH_PALETTE};
    use crate::wire::{Ordered, PathInfo};
    use serde_json::json;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn vis(routers: &[&str], links: &[(&str, &str, u32)]) -> Visualizer<Scene> {
        let mut vis = Visualizer::new(Scene::new());
        for r in routers {
            vis.add_router(r).unwrap();
        }
        for (a, b, cost) in links {
            vis.add_link(a, b, *cost).unwrap();
        }
        vis
    }

    fn discovery(steps: serde_json::Value) -> Vec<DiscoveryStep> {
        serde_json::from_value(steps).unwrap()
    }

    fn flooding(sources: &[&str]) -> Vec<FloodingStep> {
        sources
            .iter()
            .map(|s| FloodingStep {
                source_router: RouterId::new(*s),
                lsp: json!({}),
                reached_routers: Vec::new(),
            })
            .collect()
    }

    fn count(vis: &Visualizer<Scene>, pred: impl Fn(&VisEvent) -> bool) -> usize {
        vis.events().filter(|e| pred(e)).count()
    }

    #[test]
    fn topology_edits_are_mirrored_on_the_surface() {
        let mut vis = vis(&["A", "B", "C"], &[("A", "B", 5), ("C", "A", 2)]);
        assert_eq!(vis.surface().links().len(), 2);

        assert!(vis.add_link("B", "A", 7).is_err());
        assert_eq!(vis.topology().link_between("A", "B").unwrap().cost(), 5);

        vis.remove_router("A").unwrap();
        assert!(vis.surface().router("A").is_none());
        assert!(vis.surface().links().is_empty());
        assert_eq!(vis.topology().link_count(), 0);
    }

    #[test]
    fn rejected_edits_change_nothing() {
        let mut vis = vis(&["A"], &[]);
        let before = vis.events().count();

        assert!(vis.add_router("A").is_err());
        assert!(vis.add_router("").is_err());
        assert!(vis.add_link_from_input("A", "A", "3").is_err());
        assert!(vis.remove_link("A-B").is_err());

        assert_eq!(vis.events().count(), before);
        assert_eq!(vis.surface().routers().len(), 1);
    }

    #[test]
    fn path_request_preconditions() {
        let mut vis = vis(&[], &[]);
        assert!(matches!(vis.path_request(None), Err(Error::NoSource)));
        assert!(matches!(vis.path_request(Some("")), Err(Error::NoSource)));
        assert!(matches!(vis.path_request(Some("A")), Err(Error::NoRouters)));

        vis.add_router("A").unwrap();
        assert!(matches!(vis.path_request(Some("A")), Err(Error::NoLinks)));
    }

    #[test]
    fn end_to_end_path_highlight() {
        let mut vis = vis(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 1)]);

        let request = vis.path_request(Some("A")).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "routers": ["A", "B", "C"],
                "links": [
                    {"source": "A", "target": "B", "cost": 1},
                    {"source": "B", "target": "C", "cost": 1}
                ],
                "source": "A"
            })
        );

        let mut paths = Ordered::new();
        paths.push(
            "C",
            PathInfo {
                path: vec!["A".into(), "B".into(), "C".into()],
                cost: 2u64.into(),
                hops: 2u64.into(),
            },
        );
        vis.show_paths(&CalculateResponse {
            paths,
            history: Vec::new(),
            distances: Ordered::new(),
            timestamp: None,
        });

        for link in ["A-B", "B-C"] {
            assert_eq!(vis.surface().link(link).unwrap().style, LinkStyle::path(PATH_PALETTE[0]));
        }
        for router in ["A", "B", "C"] {
            assert_eq!(
                vis.surface().router(router).unwrap().style,
                NodeStyle::solid(PATH_PALETTE[0])
            );
        }
        assert!(vis.path_results().contains("Route: A → B → C"));
    }

    #[test]
    fn marker_frames_then_removal() {
        let mut vis = vis(&["A", "B"], &[("A", "B", 1)]);
        let target = vis.surface().router("B").unwrap().position;
        let id = vis.animate_marker("A", "B", MarkerRole::Hello);
        assert_eq!(vis.in_flight(), 1);

        vis.advance_to(ms(1500));
        let at = vis.surface().marker(&id).unwrap().position;
        assert!((at.x - target.x).abs() < 1e-9 && (at.y - target.y).abs() < 1e-9);

        vis.advance_to(ms(1524));
        assert_eq!(vis.in_flight(), 1);
        vis.advance_to(ms(1525));
        assert_eq!(vis.in_flight(), 0);
        assert!(vis.surface().markers().is_empty());
        assert!(vis.is_settled());
    }

    #[test]
    fn discovery_schedules_hellos_and_replies() {
        let mut vis = vis(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 2)]);
        let steps = discovery(json!([
            {"router": "A", "discovered_neighbors": ["B"], "costs": {"B": 1}},
            {"router": "B", "discovered_neighbors": ["A", "C"], "costs": {"A": 1, "C": 2}}
        ]));

        vis.begin_discovery(&steps).unwrap();
        assert_eq!(vis.phase(), Phase::Discovering);
        assert!(vis.step_log().contains("Step 2: Router B"));
        assert!(matches!(
            vis.events().last(),
            Some(VisEvent::PhaseStarted { estimated_ms: 15_500, .. })
        ));
        assert!(matches!(vis.begin_flooding(&[]), Err(Error::Busy)));

        // Last reply launches at 3000 + 2000 + 2000 and needs 1525 ms to clear.
        let settled = vis.run_until_settled();
        assert_eq!(settled, ms(8525));
        assert_eq!(vis.phase(), Phase::Idle);

        let hellos = count(&vis, |e| {
            matches!(e, VisEvent::MarkerLaunched { role: MarkerRole::Hello, .. })
        });
        let replies = count(&vis, |e| {
            matches!(e, VisEvent::MarkerArrived { role: MarkerRole::Reply, .. })
        });
        assert_eq!((hellos, replies), (3, 3));
        assert!(matches!(
            vis.events().last(),
            Some(VisEvent::PhaseSettled { elapsed_ms: 8525, .. })
        ));
    }

    #[test]
    fn empty_phase_settles_immediately() {
        let mut vis = vis(&["A"], &[]);
        vis.begin_discovery(&[]).unwrap();
        assert_eq!(vis.phase(), Phase::Idle);
        assert!(vis.ensure_idle().is_ok());
    }

    #[test]
    fn flooding_lights_every_link_once_per_source() {
        let mut vis = vis(
            &["A", "B", "C", "D"],
            &[("A", "B", 1), ("B", "C", 1), ("C", "A", 1), ("C", "D", 1)],
        );
        vis.begin_flooding(&flooding(&["A", "D"])).unwrap();
        vis.run_until_settled();

        for origin in ["A", "D"] {
            let mut links: Vec<String> = vis
                .events()
                .filter_map(|e| match e {
                    VisEvent::LinkFlooded { origin: o, link, .. } if o == origin => {
                        link.as_ref().map(|l| l.to_string())
                    }
                    _ => None,
                })
                .collect();
            links.sort();
            assert_eq!(links, ["A-B", "B-C", "C-A", "C-D"], "flood from {origin}");
        }
        assert_eq!(vis.phase(), Phase::Idle);
        assert!(vis.surface().markers().is_empty());
    }

    #[test]
    fn flooding_hop_timing() {
        let mut vis = vis(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 1)]);
        vis.begin_flooding(&flooding(&["B", "A"])).unwrap();
        vis.run_until_settled();

        let launches: Vec<(String, u64)> = vis
            .events()
            .filter_map(|e| match e {
                VisEvent::LinkFlooded { origin, from, at_ms, .. } => {
                    Some((format!("{origin}:{from}"), *at_ms))
                }
                _ => None,
            })
            .collect();

        // Second walk starts 5 s later; its level-1 hop waits 1 s more after
        // the first marker lands (~813 ms) and settles (100 ms).
        assert_eq!(launches[0], ("B:B".to_string(), 0));
        assert_eq!(launches[1], ("B:B".to_string(), 0));
        assert_eq!(launches[2], ("A:A".to_string(), 5000));
        assert_eq!(launches[3].0, "A:B");
        assert_eq!(launches[3].1, 5000 + 913 + 6000);
    }

    #[test]
    fn routing_tables_settle_at_once() {
        let mut vis = vis(&["A", "B"], &[("A", "B", 1)]);
        let tables: RoutingTablesResponse = serde_json::from_value(json!({
            "routing_tables": {"A": {"B": {"next_hop": "B", "cost": 1}}}
        }))
        .unwrap();

        vis.show_routing_tables(&tables).unwrap();
        assert_eq!(vis.phase(), Phase::Idle);
        assert!(vis.step_log().contains("Routing Table for A"));
        assert!(matches!(
            vis.events().last(),
            Some(VisEvent::PhaseSettled { phase: Phase::BuildingTables, elapsed_ms: 0, .. })
        ));
    }

    #[test]
    fn phases_reset_highlighting() {
        let mut vis = vis(&["A", "B"], &[("A", "B", 1)]);
        let mut paths = Ordered::new();
        paths.push("B", PathInfo { path: vec!["A".into(), "B".into()], cost: 1u64.into(), hops: 1u64.into() });
        vis.show_paths(&CalculateResponse {
            paths,
            history: Vec::new(),
            distances: Ordered::new(),
            timestamp: None,
        });
        assert_ne!(vis.surface().link("A-B").unwrap().style, LinkStyle::default());

        vis.begin_discovery(&[]).unwrap();
        assert_eq!(vis.surface().link("A-B").unwrap().style, LinkStyle::default());
        assert_eq!(vis.surface().router("A").unwrap().style, NodeStyle::default());
    }

    #[test]
    fn clear_cancels_pending_animation() {
        let mut vis = vis(&["A", "B"], &[("A", "B", 1)]);
        vis.begin_flooding(&flooding(&["A", "B"])).unwrap();
        vis.advance_to(ms(400));
        assert_eq!(vis.in_flight(), 1);

        vis.clear();
        assert_eq!((vis.pending(), vis.in_flight()), (0, 0));
        assert_eq!(vis.phase(), Phase::Idle);
        assert!(vis.surface().markers().is_empty());

        vis.advance_to(ms(60_000));
        assert!(vis.surface().routers().is_empty());
        assert!(!vis
            .events()
            .any(|e| matches!(e, VisEvent::MarkerLaunched { at_ms, .. } if *at_ms > 400)));
    }

    #[test]
    fn removed_router_ends_its_branch() {
        let mut vis = vis(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 1)]);
        vis.begin_flooding(&flooding(&["A"])).unwrap();
        vis.advance_to(ms(100));
        vis.remove_router("B").unwrap();

        vis.run_until_settled();
        let flooded = count(&vis, |e| matches!(e, VisEvent::LinkFlooded { .. }));
        assert_eq!(flooded, 1);
        assert_eq!(vis.phase(), Phase::Idle);
    }
}
