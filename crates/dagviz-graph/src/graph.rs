//! The visual graph: vertices as nodes, parent references as directed links.
//!
//! [`GraphIndex`] is the only place adjacency and visual attributes are
//! mutated. Other components borrow it for the duration of one call and go
//! through its methods. Each node keeps the IDs of every link touching it,
//! in insertion order, which is also the order cone traversal visits them.
//!
//! Links always point from parent to child and are created lazily: a link
//! exists only if both endpoints had nodes when the child was materialized.
//! A parent that shows up later does not get the link retroactively unless
//! the late-parent backlog is switched on with
//! [`GraphIndex::set_resolve_late_parents`].
//!
//! The graph also owns the marker index: for each marker, the vertices that
//! reported it as one of their future markers.

use std::collections::BTreeMap;

use dagviz_types::{ParentRefType, Vertex, VertexId};
use tracing::{debug, trace};

use crate::color::Rgba;
use crate::render::{LinkId, LinkUi, NodeUi, RenderCommand};
use crate::style::{Palette, link_style, link_style_name};

/// A node of the visual graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Vertex the node represents.
    pub id: VertexId,
    /// Current visual attributes.
    pub ui: NodeUi,
    /// Links touching this node, inbound and outbound, in insertion order.
    pub links: Vec<LinkId>,
}

/// A directed link from a parent node to a child node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link identifier.
    pub id: LinkId,
    /// Parent endpoint.
    pub from: VertexId,
    /// Child endpoint.
    pub to: VertexId,
    /// Reference kind.
    pub kind: ParentRefType,
    /// Current visual attributes.
    pub ui: LinkUi,
}

/// The live visual graph plus the marker index.
#[derive(Debug, Clone)]
pub struct GraphIndex {
    /// Colors and sizes resolved from the style tables.
    palette: Palette,
    /// Nodes keyed by vertex.
    nodes: BTreeMap<VertexId, Node>,
    /// Links keyed by identifier.
    links: BTreeMap<LinkId, Link>,
    /// Next link identifier to hand out.
    next_link: u64,
    /// Marker -> vertices that named it as a future marker, in arrival order.
    markers: BTreeMap<VertexId, Vec<VertexId>>,
    /// Missing parent -> children waiting for it. `None` while disabled.
    backlog: Option<BTreeMap<VertexId, Vec<(VertexId, ParentRefType)>>>,
    /// Render commands not yet drained by the host.
    outbox: Vec<RenderCommand>,
}

impl GraphIndex {
    /// Create an empty graph using the given palette.
    pub const fn new(palette: Palette) -> Self {
        Self {
            palette,
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            next_link: 0,
            markers: BTreeMap::new(),
            backlog: None,
            outbox: Vec::new(),
        }
    }

    /// The palette used for every style decision.
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Enable or disable the late-parent backlog.
    ///
    /// Disabling drops every pending entry.
    pub fn set_resolve_late_parents(&mut self, enabled: bool) {
        match (enabled, self.backlog.is_some()) {
            (true, false) => self.backlog = Some(BTreeMap::new()),
            (false, true) => self.backlog = None,
            _ => {}
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Whether a node exists for the vertex.
    pub fn has_node(&self, id: &VertexId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get a node.
    pub fn node(&self, id: &VertexId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Visual attributes of a node.
    pub fn node_ui(&self, id: &VertexId) -> Option<NodeUi> {
        self.nodes.get(id).map(|node| node.ui)
    }

    /// Get a link.
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// Visual attributes of a link.
    pub fn link_ui(&self, id: LinkId) -> Option<LinkUi> {
        self.links.get(&id).map(|link| link.ui)
    }

    /// Links touching a node, empty for unknown nodes.
    pub fn links_of(&self, id: &VertexId) -> &[LinkId] {
        self.nodes
            .get(id)
            .map(|node| node.links.as_slice())
            .unwrap_or_default()
    }

    /// Iterate over all links.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Whether `child` already has an inbound link from `parent`, of any kind.
    pub fn has_link_from(&self, parent: &VertexId, child: &VertexId) -> bool {
        self.links_of(child)
            .iter()
            .filter_map(|id| self.links.get(id))
            .any(|link| link.from == *parent && link.to == *child)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Number of children waiting in the late-parent backlog.
    pub fn pending_link_count(&self) -> usize {
        self.backlog
            .as_ref()
            .map_or(0, |backlog| backlog.values().map(Vec::len).sum())
    }

    // -------------------------------------------------------------------
    // Structural mutation
    // -------------------------------------------------------------------

    /// Make sure a node exists for the vertex.
    ///
    /// An existing node is left untouched. A new node gets the default size
    /// and its color from [`recolor`](Self::recolor). Returns `true` if the
    /// node was created.
    pub fn ensure_vertex(&mut self, vertex: &Vertex) -> bool {
        if self.nodes.contains_key(&vertex.id) {
            return false;
        }

        self.nodes.insert(
            vertex.id.clone(),
            Node {
                id: vertex.id.clone(),
                ui: NodeUi {
                    color: self.palette.message_pending,
                    size: self.palette.default_size,
                },
                links: Vec::new(),
            },
        );
        self.outbox.push(RenderCommand::AddNode {
            id: vertex.id.clone(),
        });
        self.recolor(&vertex.id, Some(vertex));
        self.resolve_backlog(&vertex.id);
        true
    }

    /// Create the links from the vertex's parents to the vertex.
    ///
    /// Walks strong, weak, then liked parents. Empty IDs and parents that
    /// already have a link into this vertex are skipped. Parents without a
    /// node are skipped too, or parked in the backlog when it is enabled.
    /// Returns the number of links created.
    pub fn materialize_edges(&mut self, vertex: &Vertex) -> usize {
        if !self.nodes.contains_key(&vertex.id) {
            return 0;
        }

        let mut created = 0_usize;
        for kind in ParentRefType::ALL {
            for parent in vertex.parents(kind) {
                if parent.is_empty() || self.has_link_from(parent, &vertex.id) {
                    continue;
                }
                if self.nodes.contains_key(parent) {
                    self.add_link(parent, &vertex.id, kind);
                    created = created.saturating_add(1);
                } else if let Some(backlog) = self.backlog.as_mut() {
                    let waiting = backlog.entry(parent.clone()).or_default();
                    if !waiting.iter().any(|(child, _)| *child == vertex.id) {
                        waiting.push((vertex.id.clone(), kind));
                    }
                } else {
                    trace!(child = %vertex.id, parent = %parent, "parent not drawn, link skipped");
                }
            }
        }
        created
    }

    /// Remove a node and every link touching it.
    ///
    /// Returns `false` if the node did not exist.
    pub fn remove_node(&mut self, id: &VertexId) -> bool {
        let Some(node) = self.nodes.remove(id) else {
            return false;
        };

        for link_id in node.links {
            self.remove_link(link_id);
        }
        if let Some(backlog) = self.backlog.as_mut() {
            backlog.retain(|_, waiting| {
                waiting.retain(|(child, _)| child != id);
                !waiting.is_empty()
            });
        }
        self.outbox.push(RenderCommand::RemoveNode { id: id.clone() });
        true
    }

    /// Drop every node and link. The marker index is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        if let Some(backlog) = self.backlog.as_mut() {
            backlog.clear();
        }
        self.outbox.push(RenderCommand::Clear);
    }

    /// Drop every node, link, marker entry, and pending render command.
    pub fn reset(&mut self) {
        self.clear();
        self.markers.clear();
        self.outbox.clear();
        self.outbox.push(RenderCommand::Clear);
    }

    fn add_link(&mut self, from: &VertexId, to: &VertexId, kind: ParentRefType) -> LinkId {
        let id = LinkId(self.next_link);
        self.next_link = self.next_link.saturating_add(1);

        let ui = self.structural_link_ui(kind);
        self.links.insert(
            id,
            Link {
                id,
                from: from.clone(),
                to: to.clone(),
                kind,
                ui,
            },
        );
        if let Some(node) = self.nodes.get_mut(from) {
            node.links.push(id);
        }
        if from != to {
            if let Some(node) = self.nodes.get_mut(to) {
                node.links.push(id);
            }
        }

        self.outbox.push(RenderCommand::AddLink {
            link: id,
            from: from.clone(),
            to: to.clone(),
            kind,
        });
        self.outbox.push(RenderCommand::LinkStyle { link: id, ui });
        id
    }

    /// Remove a single link. Returns `false` if it did not exist.
    pub fn remove_link(&mut self, id: LinkId) -> bool {
        let Some(link) = self.links.remove(&id) else {
            return false;
        };
        for endpoint in [&link.from, &link.to] {
            if let Some(node) = self.nodes.get_mut(endpoint) {
                node.links.retain(|other| *other != id);
            }
        }
        self.outbox.push(RenderCommand::RemoveLink { link: id });
        true
    }

    fn resolve_backlog(&mut self, parent: &VertexId) {
        let Some(waiting) = self.backlog.as_mut().and_then(|backlog| backlog.remove(parent)) else {
            return;
        };
        for (child, kind) in waiting {
            if self.nodes.contains_key(&child) && !self.has_link_from(parent, &child) {
                debug!(parent = %parent, child = %child, kind = kind.as_str(), "late parent linked");
                self.add_link(parent, &child, kind);
            }
        }
    }

    // -------------------------------------------------------------------
    // Visual attributes
    // -------------------------------------------------------------------

    /// Recompute a node's color from the vertex flags.
    ///
    /// First match wins: no vertex record -> `unknown`, transaction ->
    /// `transactionPending`, everything else -> `messagePending`. The
    /// confirmed and tip styles are never chosen here.
    pub fn recolor(&mut self, id: &VertexId, vertex: Option<&Vertex>) {
        let color = match vertex {
            None => self.palette.unknown,
            Some(v) if v.is_tx => self.palette.transaction_pending,
            Some(_) => self.palette.message_pending,
        };
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.ui.color = color;
        self.outbox.push(RenderCommand::NodeStyle {
            id: id.clone(),
            ui: node.ui,
        });
    }

    /// Replace a node's visual attributes, returning the previous ones.
    pub fn set_node_ui(&mut self, id: &VertexId, ui: NodeUi) -> Option<NodeUi> {
        let node = self.nodes.get_mut(id)?;
        let previous = node.ui;
        node.ui = ui;
        self.outbox.push(RenderCommand::NodeStyle { id: id.clone(), ui });
        Some(previous)
    }

    /// Change a link's color. Returns `false` for unknown links.
    pub fn set_link_color(&mut self, id: LinkId, color: Rgba) -> bool {
        let Some(link) = self.links.get_mut(&id) else {
            return false;
        };
        link.ui.color = color;
        self.outbox.push(RenderCommand::LinkStyle { link: id, ui: link.ui });
        true
    }

    /// Restore a link's structural style. Returns `false` for unknown links.
    pub fn reset_link_color(&mut self, id: LinkId) -> bool {
        let Some(link) = self.links.get_mut(&id) else {
            return false;
        };
        link.ui = structural_ui(&self.palette, link.kind);
        self.outbox.push(RenderCommand::LinkStyle { link: id, ui: link.ui });
        true
    }

    /// Restore the structural style of every link.
    pub fn reset_link_colors(&mut self) {
        for link in self.links.values_mut() {
            link.ui = structural_ui(&self.palette, link.kind);
            self.outbox.push(RenderCommand::LinkStyle {
                link: link.id,
                ui: link.ui,
            });
        }
    }

    /// Structural style of a link with the given reference kind.
    pub fn structural_link_ui(&self, kind: ParentRefType) -> LinkUi {
        structural_ui(&self.palette, kind)
    }

    // -------------------------------------------------------------------
    // Marker index
    // -------------------------------------------------------------------

    /// Record that `member` named `marker` as one of its future markers.
    pub fn extend_past_cone(&mut self, marker: &VertexId, member: VertexId) {
        self.markers.entry(marker.clone()).or_default().push(member);
    }

    /// Drop a marker's entry, returning its past cone.
    pub fn remove_marker(&mut self, marker: &VertexId) -> Option<Vec<VertexId>> {
        self.markers.remove(marker)
    }

    /// Vertices that named `marker` as a future marker, in arrival order.
    pub fn past_cone(&self, marker: &VertexId) -> Option<&[VertexId]> {
        self.markers.get(marker).map(Vec::as_slice)
    }

    /// Number of markers with a past-cone entry.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    // -------------------------------------------------------------------
    // Render outbox
    // -------------------------------------------------------------------

    /// Queue a command that does not change graph state.
    pub fn push_command(&mut self, command: RenderCommand) {
        self.outbox.push(command);
    }

    /// Take every queued render command.
    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.outbox)
    }
}

fn structural_ui(palette: &Palette, kind: ParentRefType) -> LinkUi {
    let style = link_style(link_style_name(kind)).unwrap_or_default();
    LinkUi {
        color: palette.link_color(kind),
        width: style.width,
        line_type: style.line_type,
    }
}

impl Default for GraphIndex {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}
