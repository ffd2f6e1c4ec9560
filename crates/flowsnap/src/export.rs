//! Re-rendering of reconstructed flowcharts.
//!
//! Either document alone is enough to redraw a chart. Replay walks a document
//! and issues shape and line commands to a [`RenderTarget`], using the same
//! coordinates the document stores.
//!
//! # Pipeline Position
//!
//! ```text
//! Detections
//!     ↓ reconstruct
//! GraphDocument / MatrixDocument (JSON)
//!     ↓ replay (this module)
//! RenderTarget (e.g. SvgTarget)
//! ```
//!
//! # Available Backends
//!
//! - [`svg`]: SVG output via [`svg::SvgTarget`]
//!
//! # Error Handling
//!
//! Targets return [`Error`], covering rendering failures and I/O errors.
//! [`Error`] converts into [`FlowsnapError::Export`] at the crate boundary.
//!
//! [`FlowsnapError::Export`]: crate::FlowsnapError::Export

/// SVG export backend.
pub mod svg;

use std::collections::HashMap;

use log::debug;

use flowsnap_core::{
    detection::ShapeClass,
    geometry::{Bounds, Point},
};

use crate::document::{GraphDocument, MatrixDocument, ShapeRecord};

/// A request to draw one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCommand {
    /// Raw class id; ids outside the shape vocabulary are still drawn.
    pub class_id: u32,
    pub bounds: Bounds,
    pub text: String,
}

impl ShapeCommand {
    /// The shape class, if `class_id` is part of the vocabulary.
    pub fn class(&self) -> Option<ShapeClass> {
        ShapeClass::from_class_id(self.class_id)
    }
}

/// Abstraction for re-render backends.
///
/// Lines are directed: the arrowhead belongs at `to`.
pub trait RenderTarget {
    /// Draws one shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the shape cannot be drawn.
    fn add_shape(&mut self, shape: &ShapeCommand) -> Result<(), Error>;

    /// Draws one arrow line from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the line cannot be drawn.
    fn add_line(&mut self, from: Point, to: Point) -> Result<(), Error>;
}

/// Replays a graph document: every node, then one line per resolved arrow
/// from its tail node to its tip node.
///
/// # Errors
///
/// Propagates the first error returned by `target`.
pub fn replay_graph(document: &GraphDocument, target: &mut dyn RenderTarget) -> Result<(), Error> {
    for node in &document.nodes {
        target.add_shape(&ShapeCommand {
            class_id: node.class_id,
            bounds: Bounds::from_xywh(node.bbox),
            text: node.display_text().to_string(),
        })?;
    }
    for arrow in &document.arrows {
        target.add_line(arrow.tail.point, arrow.tip.point)?;
    }
    debug!(
        shapes = document.nodes.len(),
        lines = document.arrows.len();
        "Replayed graph document"
    );
    Ok(())
}

/// Replays a matrix document: every shape, then one line per set cell using
/// [`matrix_line_endpoints`]. Cells naming a shape id with no entry are
/// skipped.
///
/// # Errors
///
/// Propagates the first error returned by `target`.
pub fn replay_matrix(
    document: &MatrixDocument,
    target: &mut dyn RenderTarget,
) -> Result<(), Error> {
    for shape in &document.shapes {
        target.add_shape(&ShapeCommand {
            class_id: shape.class_id,
            bounds: Bounds::from_xywh(shape.bbox),
            text: shape.display_text().to_string(),
        })?;
    }

    let by_id: HashMap<usize, &ShapeRecord> =
        document.shapes.iter().map(|shape| (shape.id, shape)).collect();

    let mut lines = 0;
    for (i, j) in document.edges() {
        let (Some(source), Some(target_shape)) = (by_id.get(&i), by_id.get(&j)) else {
            debug!(from = i, to = j; "Skipping matrix cell without shape entry");
            continue;
        };
        let (from, to) = matrix_line_endpoints(source, target_shape);
        target.add_line(from, to)?;
        lines += 1;
    }
    debug!(shapes = document.shapes.len(), lines; "Replayed matrix document");
    Ok(())
}

/// Picks line endpoints between two shapes from their relative position.
///
/// - source above target: source bottom to target top
/// - source below target: source top to target bottom
/// - same height, source left of target: source right to target left
/// - otherwise: source left to target right
pub fn matrix_line_endpoints(source: &ShapeRecord, target: &ShapeRecord) -> (Point, Point) {
    let [sx, sy, sw, sh] = source.bbox;
    let [tx, ty, tw, th] = target.bbox;
    let (sc, tc) = (source.center, target.center);

    if sc.y() < tc.y() {
        (Point::new(sc.x(), sy + sh), Point::new(tc.x(), ty))
    } else if sc.y() > tc.y() {
        (Point::new(sc.x(), sy), Point::new(tc.x(), ty + th))
    } else if sc.x() < tc.x() {
        (Point::new(sx + sw, sc.y()), Point::new(tx, tc.y()))
    } else {
        (Point::new(sx, sc.y()), Point::new(tx + tw, tc.y()))
    }
}

/// Errors that can occur during re-rendering.
///
/// This type is converted into [`FlowsnapError::Export`] at the crate
/// boundary via the [`From`] implementation in [`crate::error`].
///
/// [`FlowsnapError::Export`]: crate::FlowsnapError::Export
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
