//! Breadth-first cone traversal over the visual graph.
//!
//! The future cone of a vertex holds everything that references it, directly
//! or transitively; the past cone holds everything it references. Only links
//! present in the [`GraphIndex`] are followed, so the cone is limited to what
//! is currently drawn.

use std::collections::{BTreeSet, VecDeque};
use std::ops::ControlFlow;

use dagviz_types::VertexId;

use crate::graph::{GraphIndex, Link};
use crate::render::LinkId;

/// Which way to walk from the start node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConeDirection {
    /// Ancestors: follow links whose target is the current node.
    Past,
    /// Descendants: follow links whose source is the current node.
    Future,
}

impl ConeDirection {
    /// The node on the far side of `link` when walking in this direction
    /// from `current`, if the link leads that way.
    fn next<'a>(self, link: &'a Link, current: &VertexId) -> Option<&'a VertexId> {
        match self {
            Self::Past if link.to == *current => Some(&link.from),
            Self::Future if link.from == *current => Some(&link.to),
            _ => None,
        }
    }
}

/// Outcome of a cone walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConeWalk {
    /// Nodes in discovery order, starting with the start node.
    pub visited: Vec<VertexId>,
    /// Whether the node callback stopped the walk early.
    pub halted: bool,
}

/// Walk the cone of `start` breadth-first.
///
/// `on_node` runs once for every dequeued node, the start node included.
/// Returning [`ControlFlow::Break`] stops the walk before that node's links
/// are looked at. `on_link` runs for every link touching a dequeued node,
/// whichever way it points, so a link shared by two visited nodes is
/// reported twice. A start node missing from the graph yields an empty walk.
pub fn walk<N, L>(
    graph: &GraphIndex,
    start: &VertexId,
    direction: ConeDirection,
    mut on_node: N,
    mut on_link: L,
) -> ConeWalk
where
    N: FnMut(&VertexId) -> ControlFlow<()>,
    L: FnMut(&Link),
{
    let mut result = ConeWalk::default();
    if !graph.has_node(start) {
        return result;
    }

    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start.clone());
    queue.push_back(start.clone());
    result.visited.push(start.clone());

    while let Some(current) = queue.pop_front() {
        if on_node(&current).is_break() {
            result.halted = true;
            break;
        }

        for link in graph.links_of(&current).iter().filter_map(|id| graph.link(*id)) {
            on_link(link);
            let Some(next) = direction.next(link, &current) else {
                continue;
            };
            if graph.has_node(next) && seen.insert(next.clone()) {
                result.visited.push(next.clone());
                queue.push_back(next.clone());
            }
        }
    }

    result
}

/// Every node in the cone of `start`, the start node first.
pub fn cone(graph: &GraphIndex, start: &VertexId, direction: ConeDirection) -> Vec<VertexId> {
    walk(graph, start, direction, |_| ControlFlow::Continue(()), |_| {}).visited
}

/// Every link touching a node in the cone of `start`.
pub fn cone_links(graph: &GraphIndex, start: &VertexId, direction: ConeDirection) -> BTreeSet<LinkId> {
    let mut links = BTreeSet::new();
    walk(
        graph,
        start,
        direction,
        |_| ControlFlow::Continue(()),
        |link| {
            links.insert(link.id);
        },
    );
    links
}
