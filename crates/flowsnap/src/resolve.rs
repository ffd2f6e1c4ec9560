//! Arrow resolution: turning one arrow detection into a tail → tip link.

use log::trace;
use thiserror::Error;

use flowsnap_core::{
    detection::{ArrowOrientation, Detection},
    geometry::{Bounds, Point},
};

use crate::pool::{ConnectionNode, ConnectionPool, NodeId};

/// One resolved arrow detection.
///
/// The link is directed: the arrow points from `tail` to `tip`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowLink {
    orientation: ArrowOrientation,
    bounds: Bounds,
    tail_candidate: Point,
    tip_candidate: Point,
    tail: ConnectionNode,
    tip: ConnectionNode,
}

impl ArrowLink {
    pub fn orientation(&self) -> ArrowOrientation {
        self.orientation
    }

    /// Detection box of the arrow.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Geometric tail before snapping.
    pub fn tail_candidate(&self) -> Point {
        self.tail_candidate
    }

    /// Geometric tip before snapping.
    pub fn tip_candidate(&self) -> Point {
        self.tip_candidate
    }

    pub fn tail(&self) -> &ConnectionNode {
        &self.tail
    }

    pub fn tip(&self) -> &ConnectionNode {
        &self.tip
    }
}

/// Why an arrow detection produced no link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArrowSkip {
    #[error("unrecognized arrow orientation class {0}")]
    UnknownOrientation(u32),

    #[error("arrow box has no area")]
    DegenerateBox,

    #[error("tail and tip both resolved to node {0}")]
    SelfLoop(NodeId),
}

/// Resolves an arrow detection against the pool.
///
/// Tail and tip candidates are computed from the box and orientation class,
/// then snapped independently, so either may create a floating node.
///
/// # Errors
///
/// Returns an [`ArrowSkip`] for an unrecognized orientation, a box without
/// area, or an arrow whose tail and tip land on the same node. Only the last
/// case touches the pool.
pub fn resolve_arrow(
    detection: &Detection,
    pool: &mut ConnectionPool,
) -> Result<ArrowLink, ArrowSkip> {
    let orientation = ArrowOrientation::from_class_id(detection.class_id)
        .ok_or(ArrowSkip::UnknownOrientation(detection.class_id))?;

    let bounds = detection.bounds();
    if bounds.is_degenerate() {
        return Err(ArrowSkip::DegenerateBox);
    }

    let (tail_candidate, tip_candidate) = orientation.endpoints(bounds);
    let tail = pool.resolve(tail_candidate);
    let tip = pool.resolve(tip_candidate);

    if tail.id() == tip.id() {
        return Err(ArrowSkip::SelfLoop(tail.id()));
    }

    trace!(
        tail = tail.id().value(),
        tip = tip.id().value(),
        orientation:?;
        "Resolved arrow"
    );

    Ok(ArrowLink {
        orientation,
        bounds,
        tail_candidate,
        tip_candidate,
        tail,
        tip,
    })
}

#[cfg(test)]
mod tests {
    use flowsnap_core::{
        detection::ShapeClass,
        geometry::Side,
        shape::{Shape, ShapeId},
    };

    use super::*;
    use crate::pool::NodeKind;

    fn seeded_pool() -> ConnectionPool {
        let mut pool = ConnectionPool::new();
        // Anchors: top (50, 0), bottom (50, 40), left (0, 20), right (100, 20).
        pool.seed(&Shape::new(
            ShapeId::new(0),
            ShapeClass::Process,
            Bounds::from_xywh([0.0, 0.0, 100.0, 40.0]),
        ));
        // Anchors: top (50, 200), bottom (50, 240), left (0, 220), right (100, 220).
        pool.seed(&Shape::new(
            ShapeId::new(1),
            ShapeClass::Terminal,
            Bounds::from_xywh([0.0, 200.0, 100.0, 40.0]),
        ));
        pool
    }

    #[test]
    fn test_down_arrow_connects_bottom_to_top() {
        let mut pool = seeded_pool();
        let arrow = Detection::new(0, [45.0, 45.0, 10.0, 150.0]);

        let link = resolve_arrow(&arrow, &mut pool).unwrap();
        assert_eq!(link.orientation(), ArrowOrientation::Down);
        assert_eq!(link.tail_candidate(), Point::new(50.0, 45.0));
        assert_eq!(link.tip_candidate(), Point::new(50.0, 195.0));
        assert_eq!(link.tail().shape_id(), Some(ShapeId::new(0)));
        assert_eq!(link.tail().side(), Some(Side::Bottom));
        assert_eq!(link.tip().shape_id(), Some(ShapeId::new(1)));
        assert_eq!(link.tip().side(), Some(Side::Top));
        assert_eq!(pool.len(), 8);
    }

    #[test]
    fn test_up_arrow_reverses_direction() {
        let mut pool = seeded_pool();
        let arrow = Detection::new(3, [45.0, 45.0, 10.0, 150.0]);

        let link = resolve_arrow(&arrow, &mut pool).unwrap();
        assert_eq!(link.tail().shape_id(), Some(ShapeId::new(1)));
        assert_eq!(link.tip().shape_id(), Some(ShapeId::new(0)));
    }

    #[test]
    fn test_unmatched_tip_creates_floating_node() {
        let mut pool = seeded_pool();
        let arrow = Detection::new(2, [105.0, 15.0, 200.0, 10.0]);

        let link = resolve_arrow(&arrow, &mut pool).unwrap();
        assert_eq!(link.tail().side(), Some(Side::Right));
        assert_eq!(link.tip().kind(), NodeKind::Floating);
        assert_eq!(link.tip().point(), Point::new(305.0, 20.0));
        assert_eq!(pool.len(), 9);
    }

    #[test]
    fn test_unknown_orientation_is_skipped() {
        let mut pool = seeded_pool();
        let arrow = Detection::new(5, [45.0, 45.0, 10.0, 150.0]);

        assert_eq!(
            resolve_arrow(&arrow, &mut pool),
            Err(ArrowSkip::UnknownOrientation(5))
        );
        assert_eq!(pool.len(), 8);
    }

    #[test]
    fn test_degenerate_box_is_skipped() {
        let mut pool = seeded_pool();
        let arrow = Detection::new(0, [45.0, 45.0, 0.0, 150.0]);

        assert_eq!(
            resolve_arrow(&arrow, &mut pool),
            Err(ArrowSkip::DegenerateBox)
        );
        assert_eq!(pool.len(), 8);
    }

    #[test]
    fn test_short_arrow_collapsing_to_one_node_is_dropped() {
        let mut pool = ConnectionPool::new();
        let arrow = Detection::new(2, [400.0, 400.0, 20.0, 10.0]);

        let result = resolve_arrow(&arrow, &mut pool);
        assert_eq!(result, Err(ArrowSkip::SelfLoop(NodeId::new(0))));
        // The tail's floating node stays; the pool never shrinks.
        assert_eq!(pool.len(), 1);
    }
}
