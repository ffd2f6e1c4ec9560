//! The reconstruction pipeline and its result.
//!
//! ```text
//! Detections
//!     ↓ accept shapes, seed anchors      (pool)
//!     ↓ resolve arrows                   (resolve)
//!     ↓ collapse chains                  (collapse)
//! Reconstruction ──► GraphDocument / MatrixDocument
//! ```
//!
//! Reconstruction is lenient: bad detections are skipped and counted in a
//! [`SkipReport`], never raised as errors.

use std::fmt;

use log::{debug, info};

use flowsnap_core::{
    detection::Detections,
    shape::{Shape, ShapeId},
};

use crate::{
    collapse::{EdgeSet, collapse},
    document::{GraphDocument, MatrixDocument},
    pool::ConnectionPool,
    resolve::{ArrowLink, ArrowSkip, resolve_arrow},
};

/// Counts of detections dropped by lenient reconstruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipReport {
    /// Shape detections with a class id outside the shape vocabulary.
    pub unknown_shape_class: usize,
    /// Shape detections whose box has no area.
    pub degenerate_shape: usize,
    /// Arrow detections with an unrecognized orientation class.
    pub unknown_arrow_class: usize,
    /// Arrow detections whose box has no area.
    pub degenerate_arrow: usize,
    /// Arrows whose tail and tip snapped to the same node.
    pub self_loop_arrow: usize,
}

impl SkipReport {
    /// Total number of skipped detections.
    pub fn total(&self) -> usize {
        self.unknown_shape_class
            + self.degenerate_shape
            + self.unknown_arrow_class
            + self.degenerate_arrow
            + self.self_loop_arrow
    }

    fn record_arrow(&mut self, skip: ArrowSkip) {
        match skip {
            ArrowSkip::UnknownOrientation(_) => self.unknown_arrow_class += 1,
            ArrowSkip::DegenerateBox => self.degenerate_arrow += 1,
            ArrowSkip::SelfLoop(_) => self.self_loop_arrow += 1,
        }
    }
}

impl fmt::Display for SkipReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} skipped (shapes: {} unknown class, {} degenerate; arrows: {} unknown class, {} degenerate, {} self-loop)",
            self.total(),
            self.unknown_shape_class,
            self.degenerate_shape,
            self.unknown_arrow_class,
            self.degenerate_arrow,
            self.self_loop_arrow,
        )
    }
}

/// A reconstructed flowchart.
///
/// Holds the accepted shapes, the final pool, the resolved arrows and the
/// collapsed edges. Only shape labels may change afterwards.
#[derive(Debug)]
pub struct Reconstruction {
    shapes: Vec<Shape>,
    pool: ConnectionPool,
    arrows: Vec<ArrowLink>,
    edges: EdgeSet,
    skipped: SkipReport,
}

impl Reconstruction {
    /// Accepted shapes; `shapes()[i].id()` is `i`.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Mutable access for label assignment.
    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.index())
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn arrows(&self) -> &[ArrowLink] {
        &self.arrows
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn skipped(&self) -> SkipReport {
        self.skipped
    }

    /// The graph document view.
    pub fn graph_document(&self) -> GraphDocument {
        GraphDocument::build(&self.shapes, &self.edges, &self.arrows)
    }

    /// The adjacency matrix view.
    pub fn matrix_document(&self) -> MatrixDocument {
        MatrixDocument::build(&self.shapes, &self.edges)
    }
}

/// Runs the full reconstruction over `detections`.
///
/// Shapes receive dense ids in detection order, skipping rejected
/// detections. Deterministic: equal inputs give equal results.
///
/// # Examples
///
/// ```
/// # use flowsnap::reconstruct;
/// # use flowsnap_core::detection::{Detection, Detections};
/// let detections = Detections::new(
///     vec![
///         Detection::new(9, [0.0, 0.0, 100.0, 40.0]),
///         Detection::new(7, [0.0, 200.0, 100.0, 40.0]),
///     ],
///     vec![Detection::new(0, [45.0, 45.0, 10.0, 150.0])],
/// );
///
/// let result = reconstruct(&detections, 50.0);
/// assert_eq!(result.edges().len(), 1);
/// assert_eq!(result.matrix_document().matrix, vec![vec![0, 1], vec![0, 0]]);
/// ```
pub fn reconstruct(detections: &Detections, snap_threshold: f32) -> Reconstruction {
    let mut skipped = SkipReport::default();
    let mut pool = ConnectionPool::with_threshold(snap_threshold);

    let mut shapes = Vec::with_capacity(detections.shapes.len());
    for detection in &detections.shapes {
        let shape = match Shape::from_detection(ShapeId::new(shapes.len()), detection) {
            Ok(shape) => shape,
            Err(err) => {
                debug!(reason:% = err; "Skipping shape");
                skipped.unknown_shape_class += 1;
                continue;
            }
        };
        if shape.bounds().is_degenerate() {
            debug!(class_id = detection.class_id; "Skipping shape with degenerate box");
            skipped.degenerate_shape += 1;
            continue;
        }
        pool.seed(&shape);
        shapes.push(shape);
    }
    debug!(shapes = shapes.len(), anchors = pool.len(); "Seeded connection pool");

    let mut arrows = Vec::with_capacity(detections.arrows.len());
    for detection in &detections.arrows {
        match resolve_arrow(detection, &mut pool) {
            Ok(link) => arrows.push(link),
            Err(skip) => {
                debug!(class_id = detection.class_id, reason:% = skip; "Skipping arrow");
                skipped.record_arrow(skip);
            }
        }
    }
    debug!(arrows = arrows.len(), nodes = pool.len(); "Resolved arrows");

    let edges = collapse(&pool, &arrows);

    info!(
        shapes = shapes.len(),
        arrows = arrows.len(),
        edges = edges.len(),
        skipped = skipped.total();
        "Reconstructed flowchart"
    );

    Reconstruction {
        shapes,
        pool,
        arrows,
        edges,
        skipped,
    }
}
