//! Detector output and its class vocabulary.
//!
//! The object detector reports every primitive as a class id plus an
//! `[x, y, w, h]` box. Class ids fall into two families:
//!
//! | id | family | meaning            |
//! |----|--------|--------------------|
//! | 0  | arrow  | points down        |
//! | 1  | arrow  | points left        |
//! | 2  | arrow  | points right       |
//! | 3  | arrow  | points up          |
//! | 4  | shape  | Decision           |
//! | 5  | -      | arrow head, unused |
//! | 6  | shape  | Output             |
//! | 7  | shape  | Process            |
//! | 8  | shape  | Scan (input)       |
//! | 9  | shape  | Start/End          |

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    color::Color,
    geometry::{Bounds, Point, Side},
};

/// A shape detection whose class id is outside the shape vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown shape class id {class_id}")]
pub struct UnknownClass {
    class_id: u32,
}

impl UnknownClass {
    /// The rejected class id.
    pub fn class_id(&self) -> u32 {
        self.class_id
    }
}

/// One raw detection: a class id and an `[x, y, w, h]` box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub bbox: [f32; 4],
}

impl Detection {
    pub fn new(class_id: u32, bbox: [f32; 4]) -> Self {
        Self { class_id, bbox }
    }

    /// The detection box as [`Bounds`].
    pub fn bounds(&self) -> Bounds {
        Bounds::from_xywh(self.bbox)
    }
}

/// Detector output already split into shape and arrow detections.
///
/// The order within each list is the detection order; shape ids are assigned
/// from it. Keys other than `shapes` and `arrows` are rejected, so another
/// document kind never loads as an empty chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Detections {
    #[serde(default)]
    pub shapes: Vec<Detection>,
    #[serde(default)]
    pub arrows: Vec<Detection>,
}

impl Detections {
    pub fn new(shapes: Vec<Detection>, arrows: Vec<Detection>) -> Self {
        Self { shapes, arrows }
    }

    /// Splits one flat detector list by class family, keeping relative order.
    ///
    /// Arrow orientation ids go to `arrows`; every other id goes to `shapes`,
    /// where ids outside the shape vocabulary are later skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowsnap_core::detection::{Detection, Detections};
    /// let raw = vec![
    ///     Detection::new(7, [0.0, 0.0, 100.0, 50.0]),
    ///     Detection::new(0, [45.0, 50.0, 10.0, 60.0]),
    ///     Detection::new(9, [0.0, 110.0, 100.0, 50.0]),
    /// ];
    ///
    /// let detections = Detections::partition(raw);
    /// assert_eq!(detections.shapes.len(), 2);
    /// assert_eq!(detections.arrows.len(), 1);
    /// ```
    pub fn partition(raw: impl IntoIterator<Item = Detection>) -> Self {
        let (arrows, shapes): (Vec<_>, Vec<_>) = raw
            .into_iter()
            .partition(|detection| ArrowOrientation::is_arrow_class(detection.class_id));
        trace!(shapes = shapes.len(), arrows = arrows.len(); "Partitioned detections");
        Self { shapes, arrows }
    }

    /// Total number of detections.
    pub fn len(&self) -> usize {
        self.shapes.len() + self.arrows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.arrows.is_empty()
    }
}

/// Kind of a detected flowchart node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeClass {
    /// Diamond.
    Decision,
    /// Document symbol.
    Output,
    /// Rectangle.
    Process,
    /// Parallelogram.
    Input,
    /// Rounded terminator.
    Terminal,
}

impl ShapeClass {
    /// Every shape class in class-id order.
    pub const ALL: [ShapeClass; 5] = [
        ShapeClass::Decision,
        ShapeClass::Output,
        ShapeClass::Process,
        ShapeClass::Input,
        ShapeClass::Terminal,
    ];

    /// Maps a detector class id to a shape class.
    pub fn from_class_id(class_id: u32) -> Option<Self> {
        match class_id {
            4 => Some(Self::Decision),
            6 => Some(Self::Output),
            7 => Some(Self::Process),
            8 => Some(Self::Input),
            9 => Some(Self::Terminal),
            _ => None,
        }
    }

    /// The detector class id of this shape class.
    pub fn class_id(self) -> u32 {
        match self {
            Self::Decision => 4,
            Self::Output => 6,
            Self::Process => 7,
            Self::Input => 8,
            Self::Terminal => 9,
        }
    }

    /// Name used when no recognized text is available.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Decision => "Decision",
            Self::Output => "Output",
            Self::Process => "Process",
            Self::Input => "Scan (input)",
            Self::Terminal => "Start/End",
        }
    }

    /// Fill color used when re-rendering this class.
    pub fn default_fill(self) -> Color {
        let name = match self {
            Self::Decision => "#00ff00",
            Self::Output => "#0000ff",
            Self::Process => "#ff0000",
            Self::Input => "#ffff00",
            Self::Terminal => "#00ffff",
        };
        Color::new(name).unwrap_or_default()
    }
}

impl TryFrom<u32> for ShapeClass {
    type Error = UnknownClass;

    fn try_from(class_id: u32) -> Result<Self, Self::Error> {
        Self::from_class_id(class_id).ok_or(UnknownClass { class_id })
    }
}

impl fmt::Display for ShapeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

/// Drawn direction of an arrow detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowOrientation {
    Down,
    Left,
    Right,
    Up,
}

impl ArrowOrientation {
    /// Maps a detector class id to an orientation.
    pub fn from_class_id(class_id: u32) -> Option<Self> {
        match class_id {
            0 => Some(Self::Down),
            1 => Some(Self::Left),
            2 => Some(Self::Right),
            3 => Some(Self::Up),
            _ => None,
        }
    }

    /// Returns true if `class_id` belongs to the arrow family.
    pub fn is_arrow_class(class_id: u32) -> bool {
        Self::from_class_id(class_id).is_some()
    }

    /// The detector class id of this orientation.
    pub fn class_id(self) -> u32 {
        match self {
            Self::Down => 0,
            Self::Left => 1,
            Self::Right => 2,
            Self::Up => 3,
        }
    }

    /// Tail and tip candidates for an arrow drawn inside `bounds`.
    ///
    /// Both candidates are midpoints of the two box edges perpendicular to the
    /// drawn direction; the tip is on the edge the arrow points at.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flowsnap_core::{detection::ArrowOrientation, geometry::{Bounds, Point}};
    /// let bounds = Bounds::from_xywh([90.0, 100.0, 20.0, 80.0]);
    ///
    /// let (tail, tip) = ArrowOrientation::Down.endpoints(bounds);
    /// assert_eq!(tail, Point::new(100.0, 100.0));
    /// assert_eq!(tip, Point::new(100.0, 180.0));
    /// ```
    pub fn endpoints(self, bounds: Bounds) -> (Point, Point) {
        let (tail, tip) = match self {
            Self::Down => (Side::Top, Side::Bottom),
            Self::Up => (Side::Bottom, Side::Top),
            Self::Right => (Side::Left, Side::Right),
            Self::Left => (Side::Right, Side::Left),
        };
        (bounds.edge_midpoint(tail), bounds.edge_midpoint(tip))
    }
}
