//! The tangle state facade.
//!
//! [`TangleState`] owns the store, the graph, the selection, and the frame
//! dispatcher, and is the only thing the host talks to. Everything runs on
//! the caller's thread; there are no locks and no timers. After each call
//! the host drains [`take_render_commands`](TangleState::take_render_commands)
//! and forwards the commands to the renderer.

use dagviz_graph::{GraphError, GraphIndex, Palette, RenderCommand};
use dagviz_types::{MsgType, TangleEvent, VertexId};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DagvizConfig;
use crate::dispatch::{DecodeError, EventDispatcher};
use crate::operator::OperatorCommand;
use crate::selection::{SelectionController, SelectionOrigin};
use crate::store::VertexStore;

/// A snapshot of the state counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TangleStats {
    /// Stored vertices.
    pub vertices: usize,
    /// Vertex limit.
    pub limit: usize,
    /// Drawn nodes.
    pub nodes: usize,
    /// Drawn links.
    pub links: usize,
    /// Markers with a past-cone entry.
    pub markers: usize,
    /// Links waiting for a late parent.
    pub pending_links: usize,
    /// Whether live drawing is on.
    pub live_draw: bool,
    /// Whether the layout is paused.
    pub paused: bool,
    /// Selected vertex, if any.
    pub selected: Option<VertexId>,
    /// Past-cone size of the selection.
    pub ancestors: usize,
    /// Future-cone size of the selection.
    pub descendants: usize,
    /// Events applied since the last reset.
    pub events: u64,
}

/// All visualizer state behind one owner.
#[derive(Debug, Clone)]
pub struct TangleState {
    store: VertexStore,
    graph: GraphIndex,
    selection: SelectionController,
    dispatcher: EventDispatcher,
    explorer_address: String,
    search: String,
    paused: bool,
    events: u64,
}

impl TangleState {
    /// Build the state from configuration.
    ///
    /// Fails only if the built-in style tables carry a malformed color.
    pub fn from_config(config: &DagvizConfig) -> Result<Self, GraphError> {
        let palette = Palette::load()?;
        let mut graph = GraphIndex::new(palette);
        graph.set_resolve_late_parents(config.graph.resolve_late_parents);

        Ok(Self {
            store: VertexStore::new(config.graph.limit(), config.graph.live_draw),
            graph,
            selection: SelectionController::new(),
            dispatcher: EventDispatcher::with_tangle_handlers(),
            explorer_address: config.explorer.address.clone(),
            search: String::new(),
            paused: false,
            events: 0,
        })
    }

    // -------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------

    /// Decode and apply one text frame.
    ///
    /// Returns `Ok(false)` for frames that were skipped or changed nothing.
    pub fn handle_frame(&mut self, frame: &str) -> Result<bool, DecodeError> {
        let event = self.dispatcher.decode(frame)?;
        Ok(event.is_some_and(|event| self.apply(event)))
    }

    /// Apply one decoded event. Returns `true` if it changed stored state.
    pub fn apply(&mut self, event: TangleEvent) -> bool {
        self.events = self.events.saturating_add(1);
        match event {
            TangleEvent::VertexCreated(vertex) => self.store.apply_create(&mut self.graph, *vertex),
            TangleEvent::VertexBooked(update) => {
                self.store.apply_branch_update(&mut self.graph, &update)
            }
            TangleEvent::VertexConfirmed(update) => {
                self.store.apply_confirmation(&mut self.graph, &update)
            }
            TangleEvent::FutureMarkerUpdated(update) => {
                self.store.apply_future_marker_update(&mut self.graph, &update);
                true
            }
        }
    }

    /// Drop all vertices, nodes, markers, and the selection.
    ///
    /// Settings (limit, live draw, explorer address, pause) are kept.
    pub fn reset(&mut self) {
        self.store.reset();
        self.graph.reset();
        self.selection.reset();
        self.events = 0;
        info!("tangle state reset");
    }

    // -------------------------------------------------------------------
    // Operator actions
    // -------------------------------------------------------------------

    /// Run an operator command. Only [`OperatorCommand::Stats`] returns
    /// a value.
    pub fn execute(&mut self, command: OperatorCommand) -> Option<TangleStats> {
        debug!(?command, "operator command");
        match command {
            OperatorCommand::SetLimit(limit) => self.set_vertex_limit(limit),
            OperatorCommand::SetLiveDraw(draw) => self.set_live_draw(draw),
            OperatorCommand::Replay => {
                self.replay_existing();
            }
            OperatorCommand::Search(term) => {
                self.set_search(&term);
                self.search_and_highlight();
            }
            OperatorCommand::Select(id) => {
                self.click(&VertexId::from(id));
            }
            OperatorCommand::Unselect { force } => {
                self.unselect(force);
            }
            OperatorCommand::TogglePause => self.pause_resume(),
            OperatorCommand::Center => self.center_view(),
            OperatorCommand::SetExplorer(address) => self.set_explorer_address(address),
            OperatorCommand::ClearGraph => self.clear_graph(),
            OperatorCommand::SetHandler { msg_type, enabled } => {
                self.set_handler(msg_type, enabled);
            }
            OperatorCommand::Stats => return Some(self.stats()),
        }
        None
    }

    /// Select a vertex as if its node had been clicked.
    pub fn click(&mut self, id: &VertexId) -> bool {
        self.selection.select(&mut self.graph, id, SelectionOrigin::Click)
    }

    /// Clear the selection. A click selection needs `force`.
    pub fn unselect(&mut self, force: bool) -> bool {
        self.selection.clear(&mut self.graph, force)
    }

    /// Store a search term, trimmed.
    pub fn set_search(&mut self, term: &str) {
        term.trim().clone_into(&mut self.search);
    }

    /// Select the vertex named by the stored search term.
    pub fn search_and_highlight(&mut self) -> bool {
        self.selection.search_and_highlight(&mut self.graph, &self.search)
    }

    /// Toggle the layout simulation.
    pub fn pause_resume(&mut self) {
        self.paused = !self.paused;
        let command = if self.paused {
            RenderCommand::Pause
        } else {
            RenderCommand::Resume
        };
        self.graph.push_command(command);
    }

    /// Move the camera to the center of the canvas.
    pub fn center_view(&mut self) {
        self.graph.push_command(RenderCommand::CenterView);
    }

    /// Remove every node and link. Stored vertices and markers stay.
    pub fn clear_graph(&mut self) {
        self.selection.reset();
        self.graph.clear();
    }

    /// Draw every stored vertex that has no node yet.
    pub fn replay_existing(&mut self) -> usize {
        let created = self.store.replay_into(&mut self.graph);
        info!(created, "stored vertices replayed");
        created
    }

    /// Change the vertex limit for future evictions.
    pub const fn set_vertex_limit(&mut self, limit: std::num::NonZeroUsize) {
        self.store.set_limit(limit);
    }

    /// Turn live drawing on or off.
    pub const fn set_live_draw(&mut self, draw: bool) {
        self.store.set_draw(draw);
    }

    /// Start or stop applying frames of a message type.
    ///
    /// Returns `false` if the handler was already in the requested state.
    pub fn set_handler(&mut self, msg_type: MsgType, enabled: bool) -> bool {
        let changed = if enabled {
            self.dispatcher.register(msg_type)
        } else {
            self.dispatcher.unregister(msg_type)
        };
        info!(?msg_type, enabled, changed, "frame handler updated");
        changed
    }

    /// Change the explorer address.
    pub fn set_explorer_address(&mut self, address: String) {
        self.explorer_address = address;
    }

    // -------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------

    /// Explorer URL for a vertex.
    pub fn explorer_link(&self, id: &VertexId) -> String {
        format!("http://{}/explorer/message?id={id}", self.explorer_address)
    }

    /// Take every render command produced since the last call.
    pub fn take_render_commands(&mut self) -> Vec<RenderCommand> {
        self.graph.take_commands()
    }

    /// Current counters.
    pub fn stats(&self) -> TangleStats {
        TangleStats {
            vertices: self.store.len(),
            limit: self.store.limit().get(),
            nodes: self.graph.node_count(),
            links: self.graph.link_count(),
            markers: self.graph.marker_count(),
            pending_links: self.graph.pending_link_count(),
            live_draw: self.store.draws(),
            paused: self.paused,
            selected: self.selection.selected().cloned(),
            ancestors: self.selection.ancestor_count(),
            descendants: self.selection.descendant_count(),
            events: self.events,
        }
    }

    /// The vertex store.
    pub const fn store(&self) -> &VertexStore {
        &self.store
    }

    /// The visual graph.
    pub const fn graph(&self) -> &GraphIndex {
        &self.graph
    }

    /// The selection.
    pub const fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// The stored search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The explorer address.
    pub fn explorer_address(&self) -> &str {
        &self.explorer_address
    }

    /// Whether the layout is paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use dagviz_types::Vertex;

    use super::*;

    fn state() -> Option<TangleState> {
        TangleState::from_config(&DagvizConfig::default()).ok()
    }

    #[test]
    fn builds_from_default_config() {
        let state = state();
        assert!(state.is_some());
        let stats = state.map(|s| s.stats());
        assert_eq!(stats.as_ref().map(|s| s.limit), Some(100));
        assert_eq!(stats.map(|s| s.live_draw), Some(true));
    }

    #[test]
    fn explorer_link_uses_address() {
        let Some(mut state) = state() else {
            return;
        };
        assert_eq!(
            state.explorer_link(&VertexId::from("abc")),
            "http://localhost:8081/explorer/message?id=abc"
        );
        state.execute(OperatorCommand::SetExplorer("10.0.0.1:80".to_owned()));
        assert_eq!(
            state.explorer_link(&VertexId::from("abc")),
            "http://10.0.0.1:80/explorer/message?id=abc"
        );
    }

    #[test]
    fn pause_toggles_and_emits() {
        let Some(mut state) = state() else {
            return;
        };
        state.take_render_commands();
        state.execute(OperatorCommand::TogglePause);
        assert!(state.is_paused());
        state.execute(OperatorCommand::TogglePause);
        assert!(!state.is_paused());
        assert_eq!(
            state.take_render_commands(),
            [RenderCommand::Pause, RenderCommand::Resume]
        );
    }

    #[test]
    fn search_term_is_trimmed() {
        let Some(mut state) = state() else {
            return;
        };
        state.apply(TangleEvent::VertexCreated(Box::new(Vertex::new("abc"))));
        state.execute(OperatorCommand::Search("abc".to_owned()));
        state.set_search("  abc  ");
        assert_eq!(state.search(), "abc");
        assert!(state.search_and_highlight());
        assert_eq!(state.selection().selected(), Some(&VertexId::from("abc")));
    }

    #[test]
    fn disabled_handler_skips_frames() {
        let Some(mut state) = state() else {
            return;
        };
        let booked = r#"{"type":1,"data":{"ID":"a","isMarker":true}}"#;
        state.apply(TangleEvent::VertexCreated(Box::new(Vertex::new("a"))));

        state.execute(OperatorCommand::SetHandler {
            msg_type: MsgType::VertexBooked,
            enabled: false,
        });
        assert!(matches!(state.handle_frame(booked), Ok(false)));
        assert_eq!(state.store().get(&VertexId::from("a")).map(|v| v.is_marker), Some(false));

        assert!(state.set_handler(MsgType::VertexBooked, true));
        assert!(!state.set_handler(MsgType::VertexBooked, true));
        assert!(matches!(state.handle_frame(booked), Ok(true)));
        assert_eq!(state.store().get(&VertexId::from("a")).map(|v| v.is_marker), Some(true));
    }

    #[test]
    fn stats_reports_counters() {
        let Some(mut state) = state() else {
            return;
        };
        state.apply(TangleEvent::VertexCreated(Box::new(Vertex::new("a"))));
        let stats = state.execute(OperatorCommand::Stats);
        assert_eq!(stats.as_ref().map(|s| s.vertices), Some(1));
        assert_eq!(stats.as_ref().map(|s| s.nodes), Some(1));
        assert_eq!(stats.map(|s| s.events), Some(1));
        assert!(state.execute(OperatorCommand::Center).is_none());
    }
}
