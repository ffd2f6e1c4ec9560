//! The connection pool: every addressable point arrows can attach to.
//!
//! The pool holds two kinds of [`ConnectionNode`]:
//! - **shape anchors**, seeded eagerly, one per side of every shape;
//! - **floating nodes**, created on demand when an arrow endpoint lands
//!   away from every existing node.
//!
//! The pool is append-only. Node ids come from an [`IdSequence`] owned by
//! the pool, so ids are dense, increase in insertion order and are never
//! reused or reassigned.
//!
//! # Scalability
//!
//! [`ConnectionPool::resolve`] is a linear scan over all nodes. Diagrams hold
//! tens of nodes, so this is cheap; inputs with thousands of primitives
//! would want a uniform grid or k-d tree keyed by the snap threshold.

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use flowsnap_core::{
    geometry::{Point, Side},
    shape::{Shape, ShapeId},
};

/// Default snapping radius in pixels.
pub const DEFAULT_SNAP_THRESHOLD: f32 = 50.0;

/// Identity of a node in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id source owned by one pool.
#[derive(Debug, Default)]
struct IdSequence {
    next: u32,
}

impl IdSequence {
    fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// What a connection node is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Midpoint of one side of a shape.
    ShapeAnchor { shape_id: ShapeId, side: Side },
    /// Free arrow endpoint not owned by any shape.
    Floating,
}

/// An addressable point in the snapping space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionNode {
    id: NodeId,
    point: Point,
    kind: NodeKind,
}

impl ConnectionNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self.kind, NodeKind::ShapeAnchor { .. })
    }

    /// Owning shape, for anchors.
    pub fn shape_id(&self) -> Option<ShapeId> {
        match self.kind {
            NodeKind::ShapeAnchor { shape_id, .. } => Some(shape_id),
            NodeKind::Floating => None,
        }
    }

    /// Side of the owning shape, for anchors.
    pub fn side(&self) -> Option<Side> {
        match self.kind {
            NodeKind::ShapeAnchor { side, .. } => Some(side),
            NodeKind::Floating => None,
        }
    }
}

/// Registry of shape anchors and floating arrow endpoints.
#[derive(Debug)]
pub struct ConnectionPool {
    nodes: Vec<ConnectionNode>,
    ids: IdSequence,
    threshold: f32,
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_SNAP_THRESHOLD)
    }
}

impl ConnectionPool {
    /// Creates an empty pool with the default snapping radius.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty pool that snaps candidates strictly closer than
    /// `threshold` to an existing node.
    ///
    /// A non-positive threshold never snaps.
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            nodes: Vec::new(),
            ids: IdSequence::default(),
            threshold,
        }
    }

    /// Returns the snapping radius.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Inserts one anchor node per side of `shape`, in [`Side::ALL`] order.
    ///
    /// Returns the new node ids in the same order.
    pub fn seed(&mut self, shape: &Shape) -> [NodeId; 4] {
        shape.anchors().map(|(side, point)| {
            let kind = NodeKind::ShapeAnchor {
                shape_id: shape.id(),
                side,
            };
            self.insert(point, kind).id
        })
    }

    /// Returns the node nearest to `candidate` if it lies strictly within the
    /// threshold; otherwise inserts a floating node at `candidate`.
    ///
    /// Ties go to the node inserted first.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowsnap::pool::ConnectionPool;
    /// # use flowsnap_core::geometry::Point;
    /// let mut pool = ConnectionPool::with_threshold(10.0);
    ///
    /// let first = pool.resolve(Point::new(0.0, 0.0));
    /// let near = pool.resolve(Point::new(3.0, 4.0));
    /// let far = pool.resolve(Point::new(30.0, 0.0));
    ///
    /// assert_eq!(first.id(), near.id());
    /// assert_ne!(first.id(), far.id());
    /// assert_eq!(pool.len(), 2);
    /// ```
    pub fn resolve(&mut self, candidate: Point) -> ConnectionNode {
        if let Some(node) = self.nearest(candidate) {
            trace!(node_id = node.id.value(), candidate:%; "Snapped to existing node");
            return *node;
        }
        let node = self.insert(candidate, NodeKind::Floating);
        trace!(node_id = node.id.value(), candidate:%; "Created floating node");
        node
    }

    /// The nearest node strictly within the threshold, if any.
    pub fn nearest(&self, candidate: Point) -> Option<&ConnectionNode> {
        let mut best = None;
        let mut best_distance = self.threshold;
        for node in &self.nodes {
            let distance = candidate.distance(node.point);
            if distance < best_distance {
                best_distance = distance;
                best = Some(node);
            }
        }
        best
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&ConnectionNode> {
        // Ids are dense and allocated in insertion order.
        self.nodes
            .get(id.value() as usize)
            .filter(|node| node.id == id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[ConnectionNode] {
        &self.nodes
    }

    /// Shape anchor nodes in insertion order.
    pub fn anchors(&self) -> impl Iterator<Item = &ConnectionNode> {
        self.nodes.iter().filter(|node| node.is_anchor())
    }

    /// Anchor nodes owned by `shape_id`.
    pub fn anchors_of(&self, shape_id: ShapeId) -> impl Iterator<Item = &ConnectionNode> {
        self.anchors()
            .filter(move |node| node.shape_id() == Some(shape_id))
    }

    /// Returns the total number of nodes in the pool.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, point: Point, kind: NodeKind) -> ConnectionNode {
        let node = ConnectionNode {
            id: self.ids.next(),
            point,
            kind,
        };
        self.nodes.push(node);
        node
    }
}

#[cfg(test)]
mod tests {
    use flowsnap_core::{detection::ShapeClass, geometry::Bounds};

    use super::*;

    fn shape(index: usize, bbox: [f32; 4]) -> Shape {
        Shape::new(ShapeId::new(index), ShapeClass::Process, Bounds::from_xywh(bbox))
    }

    #[test]
    fn test_seed_creates_four_anchors() {
        let mut pool = ConnectionPool::new();
        let ids = pool.seed(&shape(0, [0.0, 0.0, 100.0, 50.0]));

        assert_eq!(ids.map(NodeId::value), [0, 1, 2, 3]);
        assert_eq!(pool.len(), 4);
        let sides: Vec<_> = pool.anchors().filter_map(|node| node.side()).collect();
        assert_eq!(sides, Side::ALL);
        assert!(pool.anchors().all(|node| node.shape_id() == Some(ShapeId::new(0))));
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut pool = ConnectionPool::with_threshold(1.0);
        pool.seed(&shape(0, [0.0, 0.0, 10.0, 10.0]));
        let floating = pool.resolve(Point::new(500.0, 500.0));
        pool.seed(&shape(1, [1000.0, 0.0, 10.0, 10.0]));

        assert_eq!(floating.id(), NodeId::new(4));
        let ids: Vec<_> = pool.nodes().iter().map(|node| node.id().value()).collect();
        assert_eq!(ids, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_resolve_snaps_within_threshold() {
        let mut pool = ConnectionPool::new();
        pool.seed(&shape(0, [0.0, 0.0, 100.0, 50.0]));

        // Bottom anchor is (50, 50).
        let node = pool.resolve(Point::new(60.0, 80.0));
        assert_eq!(node.side(), Some(Side::Bottom));
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_resolve_threshold_is_strict() {
        let mut pool = ConnectionPool::with_threshold(10.0);
        let origin = pool.resolve(Point::new(0.0, 0.0));

        let exactly_at = pool.resolve(Point::new(10.0, 0.0));
        assert_ne!(exactly_at.id(), origin.id());
        assert_eq!(exactly_at.kind(), NodeKind::Floating);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_resolve_tie_goes_to_first_inserted() {
        let mut pool = ConnectionPool::with_threshold(50.0);
        let left = pool.resolve(Point::new(0.0, 0.0));
        let right = pool.resolve(Point::new(60.0, 0.0));
        assert_ne!(left.id(), right.id());

        let middle = pool.resolve(Point::new(30.0, 0.0));
        assert_eq!(middle.id(), left.id());
    }

    #[test]
    fn test_resolve_prefers_nearest() {
        let mut pool = ConnectionPool::with_threshold(50.0);
        pool.resolve(Point::new(0.0, 0.0));
        let right = pool.resolve(Point::new(60.0, 0.0));

        assert_eq!(pool.resolve(Point::new(40.0, 0.0)).id(), right.id());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut pool = ConnectionPool::new();
        let candidate = Point::new(123.0, 456.0);

        let first = pool.resolve(candidate);
        let second = pool.resolve(candidate);
        assert_eq!(first.id(), second.id());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_non_positive_threshold_never_snaps() {
        let mut pool = ConnectionPool::with_threshold(0.0);
        let first = pool.resolve(Point::new(1.0, 1.0));
        let second = pool.resolve(Point::new(1.0, 1.0));
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_node_lookup() {
        let mut pool = ConnectionPool::new();
        pool.seed(&shape(0, [0.0, 0.0, 10.0, 10.0]));

        assert_eq!(pool.node(NodeId::new(2)).and_then(|n| n.side()), Some(Side::Left));
        assert!(pool.node(NodeId::new(4)).is_none());
        assert_eq!(pool.anchors_of(ShapeId::new(0)).count(), 4);
        assert_eq!(pool.anchors_of(ShapeId::new(1)).count(), 0);
    }
}
