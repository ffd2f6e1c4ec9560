//! Serializable views of a reconstructed flowchart.
//!
//! Two documents are derived from the same reconstruction:
//!
//! - [`GraphDocument`]: shape nodes with geometry and text, final edges, and
//!   the raw arrow mesh kept for diagnostic replay.
//! - [`MatrixDocument`]: an N×N 0/1 adjacency matrix plus shape metadata,
//!   where the matrix index *is* the shape id.
//!
//! Both are pure functions of their inputs. Either one is enough to redraw
//! the chart from scratch (see [`crate::export`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use flowsnap_core::{
    detection::ShapeClass,
    geometry::{Point, Side},
    shape::Shape,
};

use crate::{
    FlowsnapError,
    collapse::EdgeSet,
    pool::{ConnectionNode, NodeKind},
    resolve::ArrowLink,
};

/// Graph view: nodes, edges and the arrow mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub arrows: Vec<ArrowRecord>,
    /// Legend of shape class ids to names.
    #[serde(default)]
    pub shape_classes: BTreeMap<String, String>,
}

/// One shape in the graph document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: usize,
    pub class_id: u32,
    pub name: String,
    /// `[x, y, w, h]`.
    pub bbox: [f32; 4],
    pub center: Point,
    pub edge_centers: EdgeCenters,
    #[serde(default)]
    pub ocr_text: String,
}

impl NodeRecord {
    /// Text to draw: recognized text when present, else the name.
    pub fn display_text(&self) -> &str {
        if self.ocr_text.is_empty() {
            &self.name
        } else {
            &self.ocr_text
        }
    }
}

/// The four anchor points of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeCenters {
    pub top: Point,
    pub bottom: Point,
    pub left: Point,
    pub right: Point,
}

impl EdgeCenters {
    fn of(shape: &Shape) -> Self {
        Self {
            top: shape.anchor(Side::Top),
            bottom: shape.anchor(Side::Bottom),
            left: shape.anchor(Side::Left),
            right: shape.anchor(Side::Right),
        }
    }
}

/// A final shape-to-shape edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: usize,
    pub to: usize,
}

/// One resolved arrow detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowRecord {
    pub class_id: u32,
    /// `[x, y, w, h]`.
    pub bbox: [f32; 4],
    pub tail_candidate: Point,
    pub tip_candidate: Point,
    pub tail: ConnectionRecord,
    pub tip: ConnectionRecord,
}

/// Node kind as written in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    /// A shape anchor.
    Shape,
    /// A floating arrow endpoint.
    Arrow,
}

/// Snapshot of a pool node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: u32,
    pub point: Point,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    pub shape_id: Option<usize>,
    pub side: Option<Side>,
}

impl From<&ConnectionNode> for ConnectionRecord {
    fn from(node: &ConnectionNode) -> Self {
        let (kind, shape_id, side) = match node.kind() {
            NodeKind::ShapeAnchor { shape_id, side } => {
                (ConnectionKind::Shape, Some(shape_id.index()), Some(side))
            }
            NodeKind::Floating => (ConnectionKind::Arrow, None, None),
        };
        Self {
            id: node.id().value(),
            point: node.point(),
            kind,
            shape_id,
            side,
        }
    }
}

impl From<&ArrowLink> for ArrowRecord {
    fn from(arrow: &ArrowLink) -> Self {
        Self {
            class_id: arrow.orientation().class_id(),
            bbox: arrow.bounds().to_xywh(),
            tail_candidate: arrow.tail_candidate(),
            tip_candidate: arrow.tip_candidate(),
            tail: arrow.tail().into(),
            tip: arrow.tip().into(),
        }
    }
}

impl GraphDocument {
    /// Builds the graph document.
    pub fn build(shapes: &[Shape], edges: &EdgeSet, arrows: &[ArrowLink]) -> Self {
        let nodes = shapes
            .iter()
            .map(|shape| NodeRecord {
                id: shape.id().index(),
                class_id: shape.class().class_id(),
                name: shape.name().to_string(),
                bbox: shape.bounds().to_xywh(),
                center: shape.center(),
                edge_centers: EdgeCenters::of(shape),
                ocr_text: shape.label().unwrap_or_default().to_string(),
            })
            .collect();

        let edges = edges
            .iter()
            .map(|edge| EdgeRecord {
                from: edge.from().index(),
                to: edge.to().index(),
            })
            .collect();

        let shape_classes = ShapeClass::ALL
            .iter()
            .map(|class| (class.class_id().to_string(), class.default_name().to_string()))
            .collect();

        Self {
            nodes,
            edges,
            arrows: arrows.iter().map(ArrowRecord::from).collect(),
            shape_classes,
        }
    }
}

/// Adjacency matrix view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixDocument {
    /// `matrix[i][j] == 1` iff there is an edge from shape `i` to shape `j`.
    pub matrix: Vec<Vec<u8>>,
    /// Shape metadata; entry `i` describes shape id `i`.
    pub shapes: Vec<ShapeRecord>,
}

/// Shape metadata in the matrix document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub id: usize,
    pub class_id: u32,
    pub name: String,
    /// `[x, y, w, h]`.
    pub bbox: [f32; 4],
    pub center: Point,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ocr_text: String,
}

impl ShapeRecord {
    /// Text to draw: recognized text when present, else the name.
    pub fn display_text(&self) -> &str {
        if self.ocr_text.is_empty() {
            &self.name
        } else {
            &self.ocr_text
        }
    }
}

impl MatrixDocument {
    /// Builds the matrix document. Shape ids are used as indices unchanged.
    pub fn build(shapes: &[Shape], edges: &EdgeSet) -> Self {
        let n = shapes.len();
        let mut matrix = vec![vec![0u8; n]; n];
        for edge in edges {
            let (i, j) = (edge.from().index(), edge.to().index());
            if i < n && j < n {
                matrix[i][j] = 1;
            }
        }

        let shapes = shapes
            .iter()
            .map(|shape| ShapeRecord {
                id: shape.id().index(),
                class_id: shape.class().class_id(),
                name: shape.name().to_string(),
                bbox: shape.bounds().to_xywh(),
                center: shape.center(),
                ocr_text: shape.label().unwrap_or_default().to_string(),
            })
            .collect();

        Self { matrix, shapes }
    }

    /// Iterates over `(i, j)` for every set cell, row by row.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matrix.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| **cell == 1)
                .map(move |(j, _)| (i, j))
        })
    }
}

/// Pretty-prints a document as JSON.
///
/// # Errors
///
/// Returns [`FlowsnapError::Json`] if the serializer reports an error.
/// Non-finite coordinates are not an error: `serde_json` writes them as
/// `null`.
pub fn to_json<T: Serialize>(document: &T) -> Result<String, FlowsnapError> {
    Ok(serde_json::to_string_pretty(document)?)
}
