//! Shortest-path highlighting.

use linkstate_topology::Topology;
use tracing::trace;

use crate::style::{path_color, LinkStyle, NodeStyle};
use crate::surface::RenderSurface;
use crate::wire::{Ordered, PathInfo};

/// Put every router and link back to its default style.
pub fn reset_styles<S: RenderSurface + ?Sized>(topology: &Topology, surface: &mut S) {
    for link in topology.links() {
        surface.set_link_style(link.id(), LinkStyle::default());
    }
    for router in topology.routers() {
        surface.set_router_style(router.id(), NodeStyle::default());
    }
}

/// Reset styles, then color each path with the next palette color.
///
/// Paths are processed in the order given. A router or link shared by several
/// paths keeps the color of the last one. Consecutive routers with no link
/// between them are skipped.
pub fn highlight_paths<S: RenderSurface + ?Sized>(
    topology: &Topology,
    surface: &mut S,
    paths: &Ordered<PathInfo>,
) {
    reset_styles(topology, surface);

    for (index, (destination, info)) in paths.iter().enumerate() {
        let color = path_color(index);
        trace!(destination, color, "highlighting path");

        for router in &info.path {
            surface.set_router_style(router, NodeStyle::solid(color));
        }
        for hop in info.path.windows(2) {
            if let Some(link) = topology.link_between(hop[0].as_str(), hop[1].as_str()) {
                surface.set_link_style(link.id(), LinkStyle::path(color));
            }
        }
    }
}
