//! In-memory render surface.
//!
//! `Scene` keeps everything a front end needs to draw one frame and is
//! serialized as-is for the REST and WebSocket API. Router positions come
//! from a force-directed layout that runs only when [`RenderSurface::stabilize`]
//! is called; markers are excluded from the physics.

use std::collections::HashMap;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use linkstate_topology::{Link, LinkId, Router, RouterId};
use serde::{Deserialize, Serialize};

use crate::marker::MarkerId;
use crate::style::{LinkStyle, MarkerStyle, NodeStyle};
use crate::surface::{Point, RenderSurface};

/// Distance scale used to place newly added routers.
const PLACEMENT_SPACING: f64 = 100.0;
/// Angle between consecutive placements (golden angle, in radians).
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
/// Solver steps per stabilization.
const STABILIZE_ITERATIONS: usize = 300;
/// Solver time step.
const STABILIZE_DT: f32 = 0.016;

/// A router as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRouter {
    pub id: RouterId,
    pub label: String,
    pub title: String,
    pub style: NodeStyle,
    pub position: Point,
}

/// A link as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLink {
    pub id: LinkId,
    pub source: RouterId,
    pub target: RouterId,
    pub label: String,
    pub title: String,
    pub style: LinkStyle,
}

/// An in-flight packet marker as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMarker {
    pub id: MarkerId,
    pub style: MarkerStyle,
    pub position: Point,
}

/// Routers, links and markers of the current frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    routers: Vec<SceneRouter>,
    links: Vec<SceneLink>,
    markers: Vec<SceneMarker>,
    #[serde(skip)]
    placed: usize,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routers in insertion order.
    pub fn routers(&self) -> &[SceneRouter] {
        &self.routers
    }

    /// Links in insertion order.
    pub fn links(&self) -> &[SceneLink] {
        &self.links
    }

    /// Markers currently in flight.
    pub fn markers(&self) -> &[SceneMarker] {
        &self.markers
    }

    /// Look up a drawn router.
    pub fn router(&self, id: &str) -> Option<&SceneRouter> {
        self.routers.iter().find(|r| r.id == id)
    }

    /// Look up a drawn link.
    pub fn link(&self, id: &str) -> Option<&SceneLink> {
        self.links.iter().find(|l| l.id.as_str() == id)
    }

    /// Look up a drawn marker.
    pub fn marker(&self, id: &MarkerId) -> Option<&SceneMarker> {
        self.markers.iter().find(|m| &m.id == id)
    }

    /// Place a router on a spiral around the origin so that new routers never
    /// start on top of each other.
    fn next_placement(&mut self) -> Point {
        let i = self.placed as f64;
        self.placed += 1;
        let radius = PLACEMENT_SPACING * (i + 1.0).sqrt();
        let angle = i * GOLDEN_ANGLE;
        Point::new(radius * angle.cos(), radius * angle.sin())
    }

    fn router_mut(&mut self, id: &RouterId) -> Option<&mut SceneRouter> {
        self.routers.iter_mut().find(|r| &r.id == id)
    }

    fn link_mut(&mut self, id: &LinkId) -> Option<&mut SceneLink> {
        self.links.iter_mut().find(|l| &l.id == id)
    }

    fn marker_mut(&mut self, id: &MarkerId) -> Option<&mut SceneMarker> {
        self.markers.iter_mut().find(|m| &m.id == id)
    }
}

impl RenderSurface for Scene {
    fn add_router(&mut self, router: &Router) {
        if self.router(router.id().as_str()).is_some() {
            return;
        }
        let position = self.next_placement();
        self.routers.push(SceneRouter {
            id: router.id().clone(),
            label: router.label().to_string(),
            title: router.title().to_string(),
            style: NodeStyle::default(),
            position,
        });
    }

    fn remove_router(&mut self, id: &RouterId) {
        self.routers.retain(|r| &r.id != id);
    }

    fn add_link(&mut self, link: &Link) {
        if self.link(link.id().as_str()).is_some() {
            return;
        }
        self.links.push(SceneLink {
            id: link.id().clone(),
            source: link.source().clone(),
            target: link.target().clone(),
            label: link.label().to_string(),
            title: link.title().to_string(),
            style: LinkStyle::default(),
        });
    }

    fn remove_link(&mut self, id: &LinkId) {
        self.links.retain(|l| &l.id != id);
    }

    fn set_router_style(&mut self, id: &RouterId, style: NodeStyle) {
        if let Some(router) = self.router_mut(id) {
            router.style = style;
        }
    }

    fn set_link_style(&mut self, id: &LinkId, style: LinkStyle) {
        if let Some(link) = self.link_mut(id) {
            link.style = style;
        }
    }

    fn add_marker(&mut self, id: &MarkerId, style: MarkerStyle, at: Point) {
        self.markers.push(SceneMarker {
            id: id.clone(),
            style,
            position: at,
        });
    }

    fn move_marker(&mut self, id: &MarkerId, at: Point) {
        if let Some(marker) = self.marker_mut(id) {
            marker.position = at;
        }
    }

    fn remove_marker(&mut self, id: &MarkerId) {
        self.markers.retain(|m| &m.id != id);
    }

    fn position(&self, id: &RouterId) -> Option<Point> {
        self.router(id.as_str()).map(|r| r.position)
    }

    fn stabilize(&mut self) {
        if self.routers.is_empty() {
            return;
        }

        let mut graph: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
            force_charge: 150.0,
            force_spring: 0.05,
            force_max: 100.0,
            node_speed: 3000.0,
            damping_factor: 0.9,
        });
        let mut index = HashMap::new();
        for (i, router) in self.routers.iter().enumerate() {
            let idx = graph.add_node(NodeData {
                x: router.position.x as f32,
                y: router.position.y as f32,
                mass: 10.0,
                is_anchor: false,
                user_data: i,
            });
            index.insert(router.id.clone(), idx);
        }
        for link in &self.links {
            if let (Some(&src), Some(&tgt)) = (index.get(&link.source), index.get(&link.target)) {
                graph.add_edge(src, tgt, EdgeData::default());
            }
        }

        for _ in 0..STABILIZE_ITERATIONS {
            graph.update(STABILIZE_DT);
        }

        let routers = &mut self.routers;
        graph.visit_nodes(|node| {
            if let Some(router) = routers.get_mut(node.data.user_data) {
                router.position = Point::new(node.x() as f64, node.y() as f64);
            }
        });
        tracing::debug!(routers = self.routers.len(), "layout stabilized");
    }

    fn clear(&mut self) {
        self.routers.clear();
        self.links.clear();
        self.markers.clear();
        self.placed = 0;
    }
}
