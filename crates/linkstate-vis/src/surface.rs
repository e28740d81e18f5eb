//! Boundary to the graph-rendering widget.
//!
//! The choreography engine never draws anything itself. It holds a
//! [`RenderSurface`] and tells it which entities exist, how they are styled
//! and where markers are; the surface owns positions and the force layout.

use linkstate_topology::{Link, LinkId, Router, RouterId};
use serde::{Deserialize, Serialize};

use crate::marker::MarkerId;
use crate::style::{LinkStyle, MarkerStyle, NodeStyle};

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The canvas origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation: `self + (to - self) * t`.
    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// Rendering widget collaborator.
///
/// Implementations hold router points, link relations and marker points with
/// arbitrary style attributes, report the current coordinates of a router,
/// and re-stabilize their layout on demand. Calls naming an unknown entity
/// are ignored.
pub trait RenderSurface {
    /// Add a router point with the default style.
    fn add_router(&mut self, router: &Router);

    /// Remove a router point.
    fn remove_router(&mut self, id: &RouterId);

    /// Add a link relation with the default style.
    fn add_link(&mut self, link: &Link);

    /// Remove a link relation.
    fn remove_link(&mut self, id: &LinkId);

    /// Restyle a router.
    fn set_router_style(&mut self, id: &RouterId, style: NodeStyle);

    /// Restyle a link.
    fn set_link_style(&mut self, id: &LinkId, style: LinkStyle);

    /// Add a marker point at `at`. Markers take no part in the layout.
    fn add_marker(&mut self, id: &MarkerId, style: MarkerStyle, at: Point);

    /// Move a marker.
    fn move_marker(&mut self, id: &MarkerId, at: Point);

    /// Remove a marker.
    fn remove_marker(&mut self, id: &MarkerId);

    /// Current coordinates of a router, if it is on the surface.
    fn position(&self, id: &RouterId) -> Option<Point>;

    /// Run the force layout until it settles.
    fn stabilize(&mut self);

    /// Remove every router, link and marker.
    fn clear(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Point::new(0.0, 10.0);
        let b = Point::new(60.0, -20.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Point::new(30.0, -5.0));
    }
}
