//! Vertex selection and cone highlighting.
//!
//! Selecting a vertex paints it with the `selected` style, paints every link
//! touched by its future cone with `futureConeLink`, then every link touched
//! by its past cone with `pastConeLink`. A link touched by both ends up with
//! the past-cone color. The vertices in each cone are counted, the selected
//! vertex included.
//!
//! A selection made by clicking survives ordinary clears; only a forced
//! clear (a new click, a search, or an explicit force) removes it.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use dagviz_graph::cone::{self, ConeDirection};
use dagviz_graph::{GraphIndex, LinkId, NodeUi, Rgba};
use dagviz_types::VertexId;
use tracing::debug;

/// How the current selection was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    /// The operator clicked the node.
    Click,
    /// A search term matched the node.
    Search,
}

#[derive(Debug, Clone)]
struct Selection {
    id: VertexId,
    origin: SelectionOrigin,
    /// Node color before it was painted as selected.
    previous_color: Rgba,
    /// Links recolored while highlighting the cones.
    touched: BTreeSet<LinkId>,
}

/// Tracks at most one selected vertex and the highlight it caused.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    current: Option<Selection>,
    /// Vertices in the past cone, the selected one included.
    ancestors: usize,
    /// Vertices in the future cone, the selected one included.
    descendants: usize,
}

impl SelectionController {
    /// Create an idle controller.
    pub const fn new() -> Self {
        Self {
            current: None,
            ancestors: 0,
            descendants: 0,
        }
    }

    /// Select a vertex and highlight its cones.
    ///
    /// Returns `false` and leaves the current selection untouched if the
    /// vertex has no node. Otherwise any current selection is force-cleared
    /// first.
    pub fn select(&mut self, graph: &mut GraphIndex, id: &VertexId, origin: SelectionOrigin) -> bool {
        if !graph.has_node(id) {
            debug!(vertex_id = %id, "select: vertex not drawn");
            return false;
        }
        self.clear(graph, true);

        let Some(previous) = graph.node_ui(id) else {
            return false;
        };

        let palette = *graph.palette();
        let mut touched = BTreeSet::new();

        let mut descendants = 0_usize;
        let mut future_links = Vec::new();
        cone::walk(
            graph,
            id,
            ConeDirection::Future,
            |_| {
                descendants = descendants.saturating_add(1);
                ControlFlow::Continue(())
            },
            |link| future_links.push(link.id),
        );
        for link in future_links {
            graph.set_link_color(link, palette.future_cone_link);
            touched.insert(link);
        }

        let mut ancestors = 0_usize;
        let mut past_links = Vec::new();
        cone::walk(
            graph,
            id,
            ConeDirection::Past,
            |_| {
                ancestors = ancestors.saturating_add(1);
                ControlFlow::Continue(())
            },
            |link| past_links.push(link.id),
        );
        for link in past_links {
            graph.set_link_color(link, palette.past_cone_link);
            touched.insert(link);
        }

        graph.set_node_ui(
            id,
            NodeUi {
                color: palette.selected,
                size: palette.selected_size,
            },
        );

        debug!(
            vertex_id = %id,
            ?origin,
            ancestors,
            descendants,
            links = touched.len(),
            "vertex selected"
        );
        self.ancestors = ancestors;
        self.descendants = descendants;
        self.current = Some(Selection {
            id: id.clone(),
            origin,
            previous_color: previous.color,
            touched,
        });
        true
    }

    /// Remove the selection highlight.
    ///
    /// Does nothing when idle, or when the selection came from a click and
    /// `force` is false. If the selected node has disappeared meanwhile,
    /// every link in the graph gets its structural style back; otherwise
    /// the node and the links highlighted by [`select`](Self::select) are
    /// restored. Returns `true` if a selection was cleared.
    pub fn clear(&mut self, graph: &mut GraphIndex, force: bool) -> bool {
        let Some(selection) = self.current.take_if(|s| force || s.origin != SelectionOrigin::Click)
        else {
            return false;
        };

        self.ancestors = 0;
        self.descendants = 0;

        if graph.has_node(&selection.id) {
            let size = graph.palette().default_size;
            graph.set_node_ui(
                &selection.id,
                NodeUi {
                    color: selection.previous_color,
                    size,
                },
            );
            for link in selection.touched {
                graph.reset_link_color(link);
            }
        } else {
            graph.reset_link_colors();
        }
        debug!(vertex_id = %selection.id, "selection cleared");
        true
    }

    /// Select the vertex named by a search term.
    ///
    /// Surrounding whitespace is ignored. The current selection is always
    /// force-cleared, even when nothing matches. Returns `true` if a vertex
    /// was selected.
    pub fn search_and_highlight(&mut self, graph: &mut GraphIndex, term: &str) -> bool {
        let term = term.trim();
        self.clear(graph, true);
        if term.is_empty() {
            return false;
        }
        let id = VertexId::from(term);
        if !graph.has_node(&id) {
            debug!(term, "search: no such vertex");
            return false;
        }
        self.select(graph, &id, SelectionOrigin::Search)
    }

    /// The selected vertex, if any.
    pub fn selected(&self) -> Option<&VertexId> {
        self.current.as_ref().map(|s| &s.id)
    }

    /// How the current selection was made.
    pub fn origin(&self) -> Option<SelectionOrigin> {
        self.current.as_ref().map(|s| s.origin)
    }

    /// Size of the selection's past cone.
    pub const fn ancestor_count(&self) -> usize {
        self.ancestors
    }

    /// Size of the selection's future cone.
    pub const fn descendant_count(&self) -> usize {
        self.descendants
    }

    /// Forget the selection without touching the graph.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use dagviz_graph::{Palette, RenderCommand};
    use dagviz_types::Vertex;

    use super::*;

    fn id(raw: &str) -> VertexId {
        VertexId::from(raw)
    }

    fn draw(graph: &mut GraphIndex, raw: &str, strong: &[&str]) {
        let vertex = Vertex {
            strong_parents: strong.iter().copied().map(VertexId::from).collect(),
            ..Vertex::new(raw)
        };
        graph.ensure_vertex(&vertex);
        graph.materialize_edges(&vertex);
    }

    /// a <- b <- c, and x <- c.
    fn chain() -> GraphIndex {
        let mut graph = GraphIndex::new(Palette::load().unwrap_or_default());
        draw(&mut graph, "a", &[]);
        draw(&mut graph, "x", &[]);
        draw(&mut graph, "b", &["a"]);
        draw(&mut graph, "c", &["b", "x"]);
        graph
    }

    fn link_between(graph: &GraphIndex, from: &str, to: &str) -> Option<LinkId> {
        graph
            .links()
            .find(|link| link.from == id(from) && link.to == id(to))
            .map(|link| link.id)
    }

    fn link_color(graph: &GraphIndex, from: &str, to: &str) -> Option<Rgba> {
        link_between(graph, from, to).and_then(|link| graph.link_ui(link)).map(|ui| ui.color)
    }

    #[test]
    fn select_highlights_cones_and_counts() {
        let mut graph = chain();
        let palette = *graph.palette();
        let mut selection = SelectionController::new();

        assert!(selection.select(&mut graph, &id("b"), SelectionOrigin::Click));
        assert_eq!(selection.selected(), Some(&id("b")));
        assert_eq!(selection.descendant_count(), 2);
        assert_eq!(selection.ancestor_count(), 2);

        assert_eq!(
            graph.node_ui(&id("b")),
            Some(NodeUi {
                color: palette.selected,
                size: 30
            })
        );
        // b -> c is touched by both walks; the past walk runs last.
        assert_eq!(link_color(&graph, "b", "c"), Some(palette.past_cone_link));
        assert_eq!(link_color(&graph, "a", "b"), Some(palette.past_cone_link));
        // x -> c touches c, which is only in the future cone.
        assert_eq!(link_color(&graph, "x", "c"), Some(palette.future_cone_link));
    }

    #[test]
    fn click_selection_survives_unforced_clear() {
        let mut graph = chain();
        let mut selection = SelectionController::new();
        selection.select(&mut graph, &id("b"), SelectionOrigin::Click);

        assert!(!selection.clear(&mut graph, false));
        assert_eq!(selection.selected(), Some(&id("b")));

        assert!(selection.clear(&mut graph, true));
        assert_eq!(selection.selected(), None);
        assert_eq!(selection.ancestor_count(), 0);
        assert_eq!(selection.descendant_count(), 0);
    }

    #[test]
    fn search_selection_clears_without_force() {
        let mut graph = chain();
        let mut selection = SelectionController::new();
        assert!(selection.search_and_highlight(&mut graph, "  c \n"));
        assert_eq!(selection.origin(), Some(SelectionOrigin::Search));
        assert!(selection.clear(&mut graph, false));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn clear_restores_previous_style() {
        let mut graph = chain();
        let palette = *graph.palette();
        let before = graph.node_ui(&id("b"));
        let mut selection = SelectionController::new();
        selection.select(&mut graph, &id("b"), SelectionOrigin::Search);
        selection.clear(&mut graph, false);

        assert_eq!(graph.node_ui(&id("b")), before);
        assert_eq!(link_color(&graph, "a", "b"), Some(palette.strong_link));
        assert_eq!(link_color(&graph, "b", "c"), Some(palette.strong_link));
        assert_eq!(link_color(&graph, "x", "c"), Some(palette.strong_link));
    }

    #[test]
    fn clear_after_node_removed_resets_all_links() {
        let mut graph = chain();
        let palette = *graph.palette();
        let mut selection = SelectionController::new();
        selection.select(&mut graph, &id("b"), SelectionOrigin::Click);
        graph.remove_node(&id("b"));
        assert_eq!(link_color(&graph, "x", "c"), Some(palette.future_cone_link));

        assert!(selection.clear(&mut graph, true));
        assert_eq!(selection.selected(), None);
        assert_eq!(link_color(&graph, "x", "c"), Some(palette.strong_link));
    }

    #[test]
    fn selecting_unknown_vertex_stays_idle() {
        let mut graph = chain();
        let mut selection = SelectionController::new();
        graph.take_commands();
        assert!(!selection.select(&mut graph, &id("nope"), SelectionOrigin::Click));
        assert_eq!(selection.selected(), None);
        assert!(graph.take_commands().is_empty());
    }

    #[test]
    fn selecting_unknown_vertex_keeps_click_selection() {
        let mut graph = chain();
        let palette = *graph.palette();
        let mut selection = SelectionController::new();
        selection.select(&mut graph, &id("b"), SelectionOrigin::Click);
        graph.take_commands();

        assert!(!selection.select(&mut graph, &id("nope"), SelectionOrigin::Click));
        assert_eq!(selection.selected(), Some(&id("b")));
        assert_eq!(selection.ancestor_count(), 2);
        assert_eq!(graph.node_ui(&id("b")).map(|ui| ui.color), Some(palette.selected));
        assert!(graph.take_commands().is_empty());
    }

    #[test]
    fn missing_search_term_keeps_idle() {
        let mut graph = chain();
        let mut selection = SelectionController::new();
        assert!(!selection.search_and_highlight(&mut graph, "missing"));
        assert!(!selection.search_and_highlight(&mut graph, "   "));
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn search_replaces_click_selection() {
        let mut graph = chain();
        let mut selection = SelectionController::new();
        selection.select(&mut graph, &id("a"), SelectionOrigin::Click);
        assert!(!selection.search_and_highlight(&mut graph, "missing"));
        assert_eq!(selection.selected(), None);
        assert_eq!(graph.node_ui(&id("a")).map(|ui| ui.size), Some(20));
    }

    #[test]
    fn reselect_restores_first_node() {
        let mut graph = chain();
        let before = graph.node_ui(&id("a"));
        let mut selection = SelectionController::new();
        selection.select(&mut graph, &id("a"), SelectionOrigin::Click);
        selection.select(&mut graph, &id("c"), SelectionOrigin::Click);
        assert_eq!(graph.node_ui(&id("a")), before);
        assert_eq!(selection.selected(), Some(&id("c")));
        assert_eq!(selection.ancestor_count(), 4);
        assert_eq!(selection.descendant_count(), 1);
    }

    #[test]
    fn selection_emits_style_commands() {
        let mut graph = chain();
        graph.take_commands();
        let mut selection = SelectionController::new();
        selection.select(&mut graph, &id("a"), SelectionOrigin::Click);
        let commands = graph.take_commands();
        assert!(commands.iter().any(|c| matches!(c, RenderCommand::NodeStyle { id: node, .. } if *node == id("a"))));
        assert!(commands.iter().any(|c| matches!(c, RenderCommand::LinkStyle { .. })));
    }
}
