//! The bounded vertex collection and its FIFO eviction queue.
//!
//! [`VertexStore`] is the source of truth for vertex records. It keeps the
//! most recent vertices by arrival order, evicting one per arrival once the
//! limit is reached, and drives the [`GraphIndex`] as vertices arrive,
//! change, and leave. Every event that names an unknown vertex is a no-op,
//! except future-marker updates, which always extend the marker index.

use std::collections::{BTreeMap, VecDeque};
use std::num::NonZeroUsize;

use dagviz_graph::GraphIndex;
use dagviz_types::{FutureMarkerUpdated, Vertex, VertexBooked, VertexConfirmed, VertexId};
use tracing::{debug, trace};

/// Vertex records in arrival order, bounded by a runtime-adjustable limit.
#[derive(Debug, Clone)]
pub struct VertexStore {
    /// Vertex records keyed by ID.
    vertices: BTreeMap<VertexId, Vertex>,
    /// Arrival order. Holds exactly the keys of `vertices`.
    queue: VecDeque<VertexId>,
    /// Maximum number of vertices kept.
    limit: NonZeroUsize,
    /// Whether changes are mirrored into the graph as they happen.
    draw: bool,
}

impl VertexStore {
    /// Create an empty store.
    pub const fn new(limit: NonZeroUsize, draw: bool) -> Self {
        Self {
            vertices: BTreeMap::new(),
            queue: VecDeque::new(),
            limit,
            draw,
        }
    }

    /// Add a newly announced vertex.
    ///
    /// When the store is at or over its limit, the oldest vertex is
    /// evicted first. One arrival evicts at most one vertex, so after the
    /// limit is lowered the store keeps its size and turns over in FIFO
    /// order. The future-marker list of the incoming record is discarded;
    /// markers are only learned from update events. A vertex that is
    /// already stored is ignored. Returns `true` if the vertex was added.
    pub fn apply_create(&mut self, graph: &mut GraphIndex, mut vertex: Vertex) -> bool {
        if self.vertices.contains_key(&vertex.id) {
            debug!(vertex_id = %vertex.id, "duplicate vertex ignored");
            return false;
        }

        let full = self.queue.len() >= self.limit.get();
        if let Some(oldest) = full.then(|| self.queue.pop_front()).flatten() {
            self.remove(graph, &oldest);
        }

        let id = vertex.id.clone();
        vertex.future_markers.clear();
        self.queue.push_back(id.clone());
        self.vertices.insert(id.clone(), vertex);

        if self.draw {
            if let Some(vertex) = self.vertices.get(&id) {
                graph.ensure_vertex(vertex);
                graph.materialize_edges(vertex);
            }
        }
        true
    }

    /// Remove a vertex, its marker-index entry, and its graph node.
    ///
    /// Returns `false` if the vertex was not stored.
    pub fn evict(&mut self, graph: &mut GraphIndex, id: &VertexId) -> bool {
        if !self.vertices.contains_key(id) {
            return false;
        }
        self.queue.retain(|queued| queued != id);
        self.remove(graph, id);
        true
    }

    fn remove(&mut self, graph: &mut GraphIndex, id: &VertexId) {
        let Some(vertex) = self.vertices.remove(id) else {
            return;
        };
        if vertex.is_marker {
            graph.remove_marker(id);
        }
        graph.remove_node(id);
        trace!(vertex_id = %id, is_marker = vertex.is_marker, "vertex evicted");
    }

    /// Record a new branch booking.
    pub fn apply_branch_update(&mut self, graph: &mut GraphIndex, update: &VertexBooked) -> bool {
        let Some(vertex) = self.vertices.get_mut(&update.id) else {
            trace!(vertex_id = %update.id, "booking for unknown vertex");
            return false;
        };
        vertex.branch_id = update.branch_id.clone();
        vertex.is_marker = update.is_marker;

        if self.draw {
            graph.ensure_vertex(vertex);
        }
        true
    }

    /// Record a confirmation and refresh the node color.
    pub fn apply_confirmation(&mut self, graph: &mut GraphIndex, update: &VertexConfirmed) -> bool {
        let Some(vertex) = self.vertices.get_mut(&update.id) else {
            trace!(vertex_id = %update.id, "confirmation for unknown vertex");
            return false;
        };
        vertex.is_confirmed = true;
        vertex.gof.clone_from(&update.gof);
        vertex.confirmed_time = update.confirmed_time;

        if self.draw {
            let vertex: &Vertex = vertex;
            graph.ensure_vertex(vertex);
            graph.recolor(&vertex.id, Some(vertex));
        }
        true
    }

    /// Record that a vertex is in the past cone of a marker.
    ///
    /// The marker index is extended even when the vertex is unknown.
    /// Returns `true` if the vertex record was updated too.
    pub fn apply_future_marker_update(
        &mut self,
        graph: &mut GraphIndex,
        update: &FutureMarkerUpdated,
    ) -> bool {
        let known = self
            .vertices
            .get_mut(&update.id)
            .map(|vertex| vertex.future_markers.push(update.future_marker_id.clone()))
            .is_some();
        graph.extend_past_cone(&update.future_marker_id, update.id.clone());
        known
    }

    /// Change the vertex limit. Stored vertices are not trimmed; each later
    /// arrival evicts the single oldest vertex while the store is full.
    pub const fn set_limit(&mut self, limit: NonZeroUsize) {
        self.limit = limit;
    }

    /// Turn live drawing on or off. Stored state is kept either way.
    pub const fn set_draw(&mut self, draw: bool) {
        self.draw = draw;
    }

    /// Draw every stored vertex in arrival order.
    ///
    /// Returns the number of nodes newly created.
    pub fn replay_into(&self, graph: &mut GraphIndex) -> usize {
        let mut created = 0_usize;
        for vertex in self.queue.iter().filter_map(|id| self.vertices.get(id)) {
            if graph.ensure_vertex(vertex) {
                created = created.saturating_add(1);
            }
            graph.materialize_edges(vertex);
        }
        created
    }

    /// Drop every stored vertex.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.queue.clear();
    }

    /// Look up a vertex.
    pub fn get(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Whether the vertex is stored.
    pub fn contains(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    /// Number of stored vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Stored IDs, oldest first.
    pub fn ids_in_order(&self) -> impl Iterator<Item = &VertexId> {
        self.queue.iter()
    }

    /// Current vertex limit.
    pub const fn limit(&self) -> NonZeroUsize {
        self.limit
    }

    /// Whether live drawing is on.
    pub const fn draws(&self) -> bool {
        self.draw
    }
}
