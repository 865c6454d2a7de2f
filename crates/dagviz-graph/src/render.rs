//! Commands consumed by the force-directed renderer.
//!
//! The graph never talks to a renderer directly. Every visible change is
//! appended to an outbox as a [`RenderCommand`]; the host drains the outbox
//! after each event and forwards the commands (the `dagviz-stream` binary
//! writes them as JSON lines).

use dagviz_types::{ParentRefType, VertexId};
use serde::Serialize;

use crate::color::Rgba;

/// Identifier of a link in the visual graph.
///
/// Assigned sequentially by the graph; never reused within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LinkId(pub u64);

impl core::fmt::Display for LinkId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "link-{}", self.0)
    }
}

/// Visual attributes of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeUi {
    /// Fill color.
    pub color: Rgba,
    /// Square side in pixels.
    pub size: u32,
}

/// Visual attributes of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkUi {
    /// Line color.
    pub color: Rgba,
    /// Line width in pixels, renderer default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Dash pattern, renderer default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_type: Option<&'static str>,
}

/// A single instruction for the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    /// A node appeared.
    AddNode {
        /// Node identifier.
        id: VertexId,
    },
    /// A node and all its links disappeared.
    RemoveNode {
        /// Node identifier.
        id: VertexId,
    },
    /// A node's visual attributes changed.
    NodeStyle {
        /// Node identifier.
        id: VertexId,
        /// New attributes.
        #[serde(flatten)]
        ui: NodeUi,
    },
    /// A directed link appeared.
    AddLink {
        /// Link identifier.
        link: LinkId,
        /// Parent endpoint.
        from: VertexId,
        /// Child endpoint.
        to: VertexId,
        /// Reference kind.
        kind: ParentRefType,
    },
    /// A link disappeared.
    RemoveLink {
        /// Link identifier.
        link: LinkId,
    },
    /// A link's visual attributes changed.
    LinkStyle {
        /// Link identifier.
        link: LinkId,
        /// New attributes.
        #[serde(flatten)]
        ui: LinkUi,
    },
    /// Move the camera to the center of the canvas.
    CenterView,
    /// Stop the layout simulation.
    Pause,
    /// Restart the layout simulation.
    Resume,
    /// Drop every node and link.
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_style_serializes_flat() {
        let command = RenderCommand::NodeStyle {
            id: VertexId::from("a"),
            ui: NodeUi {
                color: Rgba(0xff00_00ff),
                size: 20,
            },
        };
        let json = serde_json::to_value(&command).unwrap_or_default();
        assert_eq!(json["command"], "node_style");
        assert_eq!(json["id"], "a");
        assert_eq!(json["color"], 0xff00_00ff_u32);
        assert_eq!(json["size"], 20);
    }

    #[test]
    fn link_style_omits_unset_fields() {
        let command = RenderCommand::LinkStyle {
            link: LinkId(7),
            ui: LinkUi {
                color: Rgba(1),
                width: None,
                line_type: None,
            },
        };
        let json = serde_json::to_value(&command).unwrap_or_default();
        assert_eq!(json["link"], 7);
        assert!(json.get("width").is_none());
        assert!(json.get("line_type").is_none());
    }

    #[test]
    fn unit_commands_carry_only_tag() {
        let json = serde_json::to_string(&RenderCommand::CenterView).unwrap_or_default();
        assert_eq!(json, r#"{"command":"center_view"}"#);
    }
}
