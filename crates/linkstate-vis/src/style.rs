//! Visual styles for routers, links and packet markers.

use serde::{Deserialize, Serialize};

/// Default router fill.
pub const ROUTER_BACKGROUND: &str = "#4CAF50";
/// Default router border.
pub const ROUTER_BORDER: &str = "#45a049";
/// Default link color.
pub const LINK_COLOR: &str = "#848484";
/// Default link width.
pub const LINK_WIDTH: u32 = 2;
/// Width of a link on a highlighted path.
pub const PATH_LINK_WIDTH: u32 = 4;

/// Colors cycled through when highlighting one path per destination.
pub const PATH_PALETTE: [&str; 5] = ["#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00"];

/// Palette color for the `index`-th highlighted path.
pub fn path_color(index: usize) -> &'static str {
    PATH_PALETTE[index % PATH_PALETTE.len()]
}

/// Fill and border of a router node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub background: String,
    pub border: String,
}

impl NodeStyle {
    /// One color for both fill and border.
    pub fn solid(color: &str) -> Self {
        Self {
            background: color.to_string(),
            border: color.to_string(),
        }
    }
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            background: ROUTER_BACKGROUND.to_string(),
            border: ROUTER_BORDER.to_string(),
        }
    }
}

/// Color and width of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStyle {
    pub color: String,
    pub width: u32,
}

impl LinkStyle {
    /// Style of a link that is part of a highlighted path.
    pub fn path(color: &str) -> Self {
        Self {
            color: color.to_string(),
            width: PATH_LINK_WIDTH,
        }
    }
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            color: LINK_COLOR.to_string(),
            width: LINK_WIDTH,
        }
    }
}

/// Shape a marker is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    Dot,
    Diamond,
}

/// What an in-flight packet marker represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerRole {
    /// Neighbor-discovery hello, router → neighbor.
    Hello,
    /// Neighbor-discovery reply, neighbor → router.
    Reply,
    /// Link-state packet being flooded.
    Lsp,
}

impl MarkerRole {
    /// Short tag used in marker identifiers and logs.
    pub fn tag(self) -> &'static str {
        match self {
            MarkerRole::Hello => "hello",
            MarkerRole::Reply => "reply",
            MarkerRole::Lsp => "lsp",
        }
    }

    /// Visual style of markers with this role.
    pub fn style(self) -> MarkerStyle {
        match self {
            MarkerRole::Hello => MarkerStyle {
                shape: MarkerShape::Dot,
                size: 8,
                background: "#FF0000".into(),
                border: "#FF0000".into(),
                label: None,
                font_size: 0,
            },
            MarkerRole::Reply => MarkerStyle {
                shape: MarkerShape::Dot,
                size: 6,
                background: "#00FF00".into(),
                border: "#00FF00".into(),
                label: None,
                font_size: 0,
            },
            MarkerRole::Lsp => MarkerStyle {
                shape: MarkerShape::Diamond,
                size: 10,
                background: "#FFA500".into(),
                border: "#FF8C00".into(),
                label: Some("LSP".into()),
                font_size: 8,
            },
        }
    }
}

/// Appearance of a packet marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub size: u32,
    pub background: String,
    pub border: String,
    pub label: Option<String>,
    pub font_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps() {
        assert_eq!(path_color(0), "#e41a1c");
        assert_eq!(path_color(1), "#377eb8");
        assert_eq!(path_color(5), "#e41a1c");
        assert_eq!(path_color(7), "#4daf4a");
    }

    #[test]
    fn role_styles() {
        let hello = MarkerRole::Hello.style();
        let reply = MarkerRole::Reply.style();
        let lsp = MarkerRole::Lsp.style();

        assert_eq!(hello.shape, MarkerShape::Dot);
        assert!(reply.size < hello.size);
        assert_eq!(lsp.shape, MarkerShape::Diamond);
        assert_eq!(lsp.label.as_deref(), Some("LSP"));
        assert_ne!(lsp.background, lsp.border);
    }

    #[test]
    fn defaults_match_reset_palette() {
        assert_eq!(NodeStyle::default().background, ROUTER_BACKGROUND);
        assert_eq!(LinkStyle::default(), LinkStyle { color: LINK_COLOR.into(), width: 2 });
        assert_eq!(LinkStyle::path("#fff").width, PATH_LINK_WIDTH);
    }
}
