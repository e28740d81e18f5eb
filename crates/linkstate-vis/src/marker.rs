//! Point-to-point packet marker animation.
//!
//! A marker is created at the source router, moved in a straight line to the
//! target over a fixed number of frames, and deleted after the last frame.
//! Endpoint coordinates are sampled once at launch; if the layout moves while
//! the marker is in flight the marker keeps its original track.

use std::fmt;
use std::time::Duration;

use linkstate_topology::RouterId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::style::MarkerRole;
use crate::surface::{Point, RenderSurface};

/// Frames per marker flight.
pub const MARKER_FRAMES: u32 = 60;

/// Unique identifier of one marker flight.
///
/// Built from the role, both endpoints, the launch time in milliseconds and a
/// launch sequence number, so two markers over the same link in the same
/// millisecond still differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(String);

impl MarkerId {
    /// Synthesize an identifier.
    pub fn new(role: MarkerRole, source: &str, target: &str, launched_ms: u64, seq: u64) -> Self {
        Self(format!("{}-{source}-{target}-{launched_ms}-{seq}", role.tag()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One marker flight between two routers.
#[derive(Debug, Clone)]
pub struct MarkerAnimation {
    id: MarkerId,
    role: MarkerRole,
    source: RouterId,
    target: RouterId,
    from: Point,
    to: Point,
    frame: u32,
    frames: u32,
    frame_delay: Duration,
}

impl MarkerAnimation {
    /// Resolve endpoint coordinates and put the marker on the surface.
    ///
    /// A missing endpoint is not an error: the flight degenerates to a
    /// zero-length motion at whichever endpoint exists, or at the origin.
    pub fn launch<S: RenderSurface + ?Sized>(
        surface: &mut S,
        id: MarkerId,
        role: MarkerRole,
        source: RouterId,
        target: RouterId,
        duration: Duration,
    ) -> Self {
        let source_pos = surface.position(&source);
        let target_pos = surface.position(&target);
        if source_pos.is_none() || target_pos.is_none() {
            debug!(marker = %id, "endpoint missing, marker degenerates");
        }
        let from = source_pos.or(target_pos).unwrap_or(Point::ORIGIN);
        let to = target_pos.unwrap_or(from);

        surface.add_marker(&id, role.style(), from);

        let frames = MARKER_FRAMES;
        Self {
            id,
            role,
            source,
            target,
            from,
            to,
            frame: 0,
            frames,
            frame_delay: duration / frames,
        }
    }

    /// Render the next frame.
    ///
    /// Returns `true` while the marker is still flying (the caller schedules
    /// another step after [`frame_delay`](Self::frame_delay)). The call after
    /// the final frame removes the marker and returns `false`.
    pub fn step<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if self.frame <= self.frames {
            surface.move_marker(&self.id, self.position_at(self.frame));
            self.frame += 1;
            true
        } else {
            surface.remove_marker(&self.id);
            false
        }
    }

    /// Interpolated position at `frame`.
    pub fn position_at(&self, frame: u32) -> Point {
        self.from.lerp(self.to, f64::from(frame) / f64::from(self.frames))
    }

    /// Delay between two frames.
    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    pub fn id(&self) -> &MarkerId {
        &self.id
    }

    pub fn role(&self) -> MarkerRole {
        self.role
    }

    pub fn source(&self) -> &RouterId {
        &self.source
    }

    pub fn target(&self) -> &RouterId {
        &self.target
    }

    /// Whether the flight has zero length.
    #[cfg(test)]
    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }
}
