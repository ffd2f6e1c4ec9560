//! Chain collapse: from the node/arrow mesh to shape-to-shape edges.
//!
//! Arrows form a directed mesh over pool nodes. A connector drawn as several
//! detected segments shows up as a path through floating nodes, for example
//!
//! ```text
//!   [A].bottom ──► floating ──► floating ──► [B].top
//! ```
//!
//! Each shape anchor is used as a breadth-first start; every other shape's
//! anchor reachable from it yields one edge. Floating nodes are only
//! waypoints, so a chain that never touches a second shape yields nothing,
//! and a start that reaches several shapes fans out to all of them.
//!
//! Cost is O(anchors × (nodes + arrows)), fine at diagram scale.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;
use log::{debug, warn};
use petgraph::graphmap::DiGraphMap;

use flowsnap_core::shape::ShapeId;

use crate::{
    pool::{ConnectionPool, NodeId},
    resolve::ArrowLink,
};

/// A directed edge of the reconstructed flowchart. Never a self-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FinalEdge {
    from: ShapeId,
    to: ShapeId,
}

impl FinalEdge {
    /// Creates an edge, or `None` for a self-loop.
    pub fn new(from: ShapeId, to: ShapeId) -> Option<Self> {
        (from != to).then_some(Self { from, to })
    }

    pub fn from(&self) -> ShapeId {
        self.from
    }

    pub fn to(&self) -> ShapeId {
        self.to
    }
}

/// Deduplicated final edges, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: IndexSet<FinalEdge>,
}

impl EdgeSet {
    /// Returns true if the edge `from → to` exists.
    pub fn contains(&self, from: ShapeId, to: ShapeId) -> bool {
        FinalEdge::new(from, to).is_some_and(|edge| self.edges.contains(&edge))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FinalEdge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn insert(&mut self, edge: FinalEdge) -> bool {
        self.edges.insert(edge)
    }
}

impl FromIterator<FinalEdge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = FinalEdge>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a FinalEdge;
    type IntoIter = indexmap::set::Iter<'a, FinalEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// Builds the directed arrow mesh over node ids.
fn build_mesh(arrows: &[ArrowLink]) -> DiGraphMap<NodeId, ()> {
    let mut mesh = DiGraphMap::new();
    for arrow in arrows {
        mesh.add_edge(arrow.tail().id(), arrow.tip().id(), ());
    }
    mesh
}

/// Collapses arrow chains into shape-to-shape edges.
///
/// A node id reached during traversal that the pool does not know is logged
/// and treated as a dead end.
pub fn collapse(pool: &ConnectionPool, arrows: &[ArrowLink]) -> EdgeSet {
    let mesh = build_mesh(arrows);
    let mut edges = EdgeSet::default();

    for start in pool.anchors() {
        let (start_id, Some(from)) = (start.id(), start.shape_id()) else {
            continue;
        };
        if !mesh.contains_node(start_id) {
            continue;
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start_id]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }

            if current != start_id {
                let Some(node) = pool.node(current) else {
                    warn!(node_id = current.value(); "Arrow mesh references unknown node");
                    continue;
                };
                if let Some(edge) = node.shape_id().and_then(|to| FinalEdge::new(from, to)) {
                    edges.insert(edge);
                }
            }

            queue.extend(
                mesh.neighbors(current)
                    .filter(|neighbor| !visited.contains(neighbor)),
            );
        }
    }

    debug!(
        arrows = arrows.len(),
        mesh_nodes = mesh.node_count(),
        edges = edges.len();
        "Collapsed arrow chains"
    );
    edges
}
