//! Geometric primitives for detected flowchart elements.
//!
//! This module provides the value types the reconstruction pipeline measures
//! with: detector boxes, their centers and edge midpoints, and the Euclidean
//! distance used for snapping.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in image space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned box defined by minimum and maximum coordinates
//! - [`Side`] - One of the four edges of a box
//!
//! # Coordinate System
//!
//! Detector boxes use image coordinates, which match SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner of the source image
//! - **X-axis**: Increases rightward
//! - **Y-axis**: Increases downward

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 2D point in image coordinate space.
///
/// Points serialize as a two-element `[x, y]` array, the form every
/// document in this workspace uses for coordinates.
///
/// # Examples
///
/// ```
/// # use flowsnap_core::geometry::Point;
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(30.0, 40.0);
///
/// assert_eq!(a.distance(b), 50.0);
///
/// let mid = a.midpoint(b);
/// assert_eq!(mid.x(), 15.0);
/// assert_eq!(mid.y(), 20.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between this point and `other`.
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// One edge of an axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// All sides in anchor seeding order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Lowercase name of the side, as used in documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Creates a new bounds from two opposite corners.
    pub fn new_from_corners(min: Point, max: Point) -> Self {
        Self {
            min_x: min.x,
            min_y: min.y,
            max_x: max.x,
            max_y: max.y,
        }
    }

    /// Creates bounds from a detector `[x, y, w, h]` box.
    pub fn from_xywh([x, y, w, h]: [f32; 4]) -> Self {
        Self::new_from_top_left(Point::new(x, y), Size::new(w, h))
    }

    /// Returns the box as `[x, y, w, h]`.
    pub fn to_xywh(self) -> [f32; 4] {
        [self.min_x, self.min_y, self.width(), self.height()]
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns true when the box has no area or is inverted.
    ///
    /// Non-finite coordinates count as degenerate as well.
    pub fn is_degenerate(self) -> bool {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|value| value.is_finite());
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Midpoint of the given edge.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowsnap_core::geometry::{Bounds, Side};
    /// let bounds = Bounds::from_xywh([10.0, 20.0, 100.0, 40.0]);
    ///
    /// let top = bounds.edge_midpoint(Side::Top);
    /// assert_eq!((top.x(), top.y()), (60.0, 20.0));
    ///
    /// let right = bounds.edge_midpoint(Side::Right);
    /// assert_eq!((right.x(), right.y()), (110.0, 40.0));
    /// ```
    pub fn edge_midpoint(self, side: Side) -> Point {
        let (start, end) = match side {
            Side::Top => ((self.min_x, self.min_y), (self.max_x, self.min_y)),
            Side::Bottom => ((self.min_x, self.max_y), (self.max_x, self.max_y)),
            Side::Left => ((self.min_x, self.min_y), (self.min_x, self.max_y)),
            Side::Right => ((self.max_x, self.min_y), (self.max_x, self.max_y)),
        };
        Point::new(start.0, start.1).midpoint(Point::new(end.0, end.1))
    }

    /// Merges two bounds to create a larger bounds that contains both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.0, 4.0);
        assert_eq!(point.x(), 3.0);
        assert_eq!(point.y(), 4.0);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn test_point_midpoint() {
        let mid = Point::new(10.0, 0.0).midpoint(Point::new(20.0, 10.0));
        assert_eq!(mid, Point::new(15.0, 5.0));
    }

    #[test]
    fn test_point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(1.5, 2.0)).unwrap();
        assert_eq!(json, "[1.5,2.0]");

        let point: Point = serde_json::from_str("[7, 8.25]").unwrap();
        assert_eq!(point, Point::new(7.0, 8.25));
    }

    #[test]
    fn test_bounds_from_xywh() {
        let bounds = Bounds::from_xywh([10.0, 20.0, 30.0, 40.0]);
        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.min_y(), 20.0);
        assert_eq!(bounds.max_x(), 40.0);
        assert_eq!(bounds.max_y(), 60.0);
        assert_eq!(bounds.to_xywh(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_bounds_center() {
        let bounds = Bounds::from_xywh([0.0, 0.0, 100.0, 50.0]);
        assert_eq!(bounds.center(), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_bounds_edge_midpoints() {
        let bounds = Bounds::from_xywh([0.0, 0.0, 100.0, 50.0]);
        assert_eq!(bounds.edge_midpoint(Side::Top), Point::new(50.0, 0.0));
        assert_eq!(bounds.edge_midpoint(Side::Bottom), Point::new(50.0, 50.0));
        assert_eq!(bounds.edge_midpoint(Side::Left), Point::new(0.0, 25.0));
        assert_eq!(bounds.edge_midpoint(Side::Right), Point::new(100.0, 25.0));
    }

    #[test]
    fn test_bounds_degenerate() {
        assert!(!Bounds::from_xywh([0.0, 0.0, 1.0, 1.0]).is_degenerate());
        assert!(Bounds::from_xywh([0.0, 0.0, 0.0, 10.0]).is_degenerate());
        assert!(Bounds::from_xywh([0.0, 0.0, 10.0, 0.0]).is_degenerate());
        assert!(Bounds::from_xywh([0.0, 0.0, -5.0, 10.0]).is_degenerate());
        assert!(Bounds::from_xywh([f32::NAN, 0.0, 5.0, 10.0]).is_degenerate());
    }

    #[test]
    fn test_bounds_merge() {
        let a = Bounds::from_xywh([0.0, 0.0, 10.0, 10.0]);
        let b = Bounds::from_xywh([5.0, -5.0, 20.0, 10.0]);
        let merged = a.merge(&b);
        assert_eq!((merged.min_x(), merged.min_y()), (0.0, -5.0));
        assert_eq!(merged.to_size(), Size::new(25.0, 15.0));
    }

    #[test]
    fn test_side_order_and_names() {
        let names: Vec<_> = Side::ALL.iter().map(|side| side.as_str()).collect();
        assert_eq!(names, ["top", "bottom", "left", "right"]);
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"left\"");
    }
}
