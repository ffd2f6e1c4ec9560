//! Accepted shape detections.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    detection::{Detection, ShapeClass, UnknownClass},
    geometry::{Bounds, Point, Side},
};

/// Dense shape identifier, assigned in detection order.
///
/// The id doubles as the row and column index of the adjacency matrix, so it
/// never changes once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(usize);

impl ShapeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The id as a matrix index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A detected flowchart node.
///
/// Everything except the label is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: ShapeId,
    class: ShapeClass,
    bounds: Bounds,
    label: Option<String>,
}

impl Shape {
    pub fn new(id: ShapeId, class: ShapeClass, bounds: Bounds) -> Self {
        Self {
            id,
            class,
            bounds,
            label: None,
        }
    }

    /// Builds a shape from a detection.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownClass`] when the class id is outside the shape
    /// vocabulary.
    pub fn from_detection(id: ShapeId, detection: &Detection) -> Result<Self, UnknownClass> {
        let class = ShapeClass::try_from(detection.class_id)?;
        Ok(Self::new(id, class, detection.bounds()))
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn class(&self) -> ShapeClass {
        self.class
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Midpoint of one side of the bounding box.
    pub fn anchor(&self, side: Side) -> Point {
        self.bounds.edge_midpoint(side)
    }

    /// All four anchors in [`Side::ALL`] order.
    pub fn anchors(&self) -> [(Side, Point); 4] {
        Side::ALL.map(|side| (side, self.anchor(side)))
    }

    /// Class-derived name.
    pub fn name(&self) -> &'static str {
        self.class.default_name()
    }

    /// Recognized text, if any was assigned.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Text to show for this shape: the label when non-empty, else the class name.
    pub fn display_text(&self) -> &str {
        match self.label() {
            Some(label) if !label.is_empty() => label,
            _ => self.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process_box() -> Shape {
        Shape::new(
            ShapeId::new(3),
            ShapeClass::Process,
            Bounds::from_xywh([100.0, 200.0, 80.0, 40.0]),
        )
    }

    #[test]
    fn test_anchors_are_edge_midpoints() {
        let shape = process_box();
        let anchors = shape.anchors();

        assert_eq!(anchors[0], (Side::Top, Point::new(140.0, 200.0)));
        assert_eq!(anchors[1], (Side::Bottom, Point::new(140.0, 240.0)));
        assert_eq!(anchors[2], (Side::Left, Point::new(100.0, 220.0)));
        assert_eq!(anchors[3], (Side::Right, Point::new(180.0, 220.0)));
        assert_eq!(shape.center(), Point::new(140.0, 220.0));
    }

    #[test]
    fn test_from_detection_skips_unknown_class() {
        let id = ShapeId::new(0);
        let err = Shape::from_detection(id, &Detection::new(5, [0.0, 0.0, 1.0, 1.0])).unwrap_err();
        assert_eq!(err.class_id(), 5);

        let shape = Shape::from_detection(id, &Detection::new(4, [0.0, 0.0, 1.0, 1.0])).unwrap();
        assert_eq!(shape.class(), ShapeClass::Decision);
    }

    #[test]
    fn test_display_text_falls_back_to_name() {
        let mut shape = process_box();
        assert_eq!(shape.display_text(), "Process");

        shape.set_label("");
        assert_eq!(shape.display_text(), "Process");

        shape.set_label("x = x + 1");
        assert_eq!(shape.display_text(), "x = x + 1");
        assert_eq!(shape.name(), "Process");
    }

    #[test]
    fn test_shape_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ShapeId::new(12)).unwrap(), "12");
    }
}
