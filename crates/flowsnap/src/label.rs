//! Shape labeling through an external text recognizer.
//!
//! Labels are attached after reconstruction has finished, so recognizer
//! failures can never affect the graph itself. A failed shape keeps an empty
//! label and is listed in the returned [`LabelReport`].

use std::collections::HashMap;

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use flowsnap_core::shape::{Shape, ShapeId};

use crate::FlowsnapError;

/// Why a recognizer produced no text for a shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    #[error("no text available for shape {0}")]
    Missing(ShapeId),

    #[error("recognizer failed: {0}")]
    Failed(String),
}

/// Source of free-form text for a shape region.
pub trait TextRecognizer {
    /// Returns the raw text recognized inside `shape`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecognitionError`] when no text can be produced.
    fn recognize(&self, shape: &Shape) -> Result<String, RecognitionError>;
}

/// Precomputed recognizer output keyed by shape id.
///
/// Loaded from a JSON object such as `{"0": "Start", "2": "x > 0?"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    labels: HashMap<ShapeId, String>,
}

impl LabelTable {
    /// Parses a label table from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsnapError::Input`] carrying `source` when the JSON is
    /// malformed.
    pub fn from_json(source: &str) -> Result<Self, FlowsnapError> {
        serde_json::from_str(source).map_err(|err| FlowsnapError::new_input_error(err, source))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl TextRecognizer for LabelTable {
    fn recognize(&self, shape: &Shape) -> Result<String, RecognitionError> {
        self.labels
            .get(&shape.id())
            .cloned()
            .ok_or(RecognitionError::Missing(shape.id()))
    }
}

/// Trims recognizer output and, when `strip_quotes` is set, keeps only the
/// first double-quoted segment if there is one.
///
/// ```
/// # use flowsnap::label::clean_label;
/// assert_eq!(clean_label("  The text is \"Start\".\n", true), "Start");
/// assert_eq!(clean_label(" Start ", true), "Start");
/// assert_eq!(clean_label("\"Start\"", false), "\"Start\"");
/// ```
pub fn clean_label(text: &str, strip_quotes: bool) -> String {
    let text = text.trim();
    if !strip_quotes {
        return text.to_string();
    }
    text.split_once('"')
        .and_then(|(_, rest)| rest.split_once('"'))
        .map_or(text, |(quoted, _)| quoted)
        .to_string()
}

/// Outcome of a labeling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelReport {
    labeled: usize,
    failures: Vec<(ShapeId, RecognitionError)>,
}

impl LabelReport {
    /// Number of shapes that received a label.
    pub fn labeled(&self) -> usize {
        self.labeled
    }

    /// Shapes the recognizer failed on, in shape order.
    pub fn failures(&self) -> &[(ShapeId, RecognitionError)] {
        &self.failures
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Labels every shape with cleaned recognizer output.
///
/// A failure leaves that shape's label empty and is recorded; it never
/// stops the pass.
pub fn apply_labels(
    shapes: &mut [Shape],
    recognizer: &dyn TextRecognizer,
    strip_quotes: bool,
) -> LabelReport {
    let mut report = LabelReport::default();
    for shape in shapes.iter_mut() {
        match recognizer.recognize(shape) {
            Ok(text) => {
                shape.set_label(clean_label(&text, strip_quotes));
                report.labeled += 1;
            }
            Err(err) => {
                warn!(shape_id = shape.id().index(), err:%; "Text recognition failed");
                shape.set_label(String::new());
                report.failures.push((shape.id(), err));
            }
        }
    }
    debug!(
        labeled = report.labeled,
        failed = report.failures.len();
        "Applied shape labels"
    );
    report
}

#[cfg(test)]
mod tests {
    use flowsnap_core::{detection::ShapeClass, geometry::Bounds};

    use super::*;

    fn shapes(count: usize) -> Vec<Shape> {
        (0..count)
            .map(|i| {
                Shape::new(
                    ShapeId::new(i),
                    ShapeClass::Process,
                    Bounds::from_xywh([i as f32 * 200.0, 0.0, 100.0, 40.0]),
                )
            })
            .collect()
    }

    struct Broken;

    impl TextRecognizer for Broken {
        fn recognize(&self, _shape: &Shape) -> Result<String, RecognitionError> {
            Err(RecognitionError::Failed("timeout".to_string()))
        }
    }

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label("  hello \n", true), "hello");
        assert_eq!(clean_label("say \"a\" or \"b\"", true), "a");
        assert_eq!(clean_label("say \"a\" or \"b\"", false), "say \"a\" or \"b\"");
        assert_eq!(clean_label("unbalanced \"quote", true), "unbalanced \"quote");
        assert_eq!(clean_label("\"\"", true), "");
        assert_eq!(clean_label("", true), "");
    }

    #[test]
    fn test_label_table_from_json() {
        let table = LabelTable::from_json(r#"{"0": "Start", "2": "\"Done\""}"#).unwrap();
        assert_eq!(table.len(), 2);

        let mut shapes = shapes(3);
        let report = apply_labels(&mut shapes, &table, true);

        assert_eq!(shapes[0].label(), Some("Start"));
        assert_eq!(shapes[1].label(), Some(""));
        assert_eq!(shapes[1].display_text(), "Process");
        assert_eq!(shapes[2].label(), Some("Done"));
        assert_eq!(report.labeled(), 2);
        assert_eq!(
            report.failures(),
            [(ShapeId::new(1), RecognitionError::Missing(ShapeId::new(1)))]
        );
        assert!(!report.is_complete());
    }

    #[test]
    fn test_label_table_rejects_malformed_json() {
        let err = LabelTable::from_json("{\"0\": ").unwrap_err();
        assert!(matches!(err, FlowsnapError::Input { .. }));
    }

    #[test]
    fn test_failing_recognizer_never_aborts() {
        let mut shapes = shapes(2);
        let report = apply_labels(&mut shapes, &Broken, true);

        assert_eq!(report.labeled(), 0);
        assert_eq!(report.failures().len(), 2);
        assert!(shapes.iter().all(|shape| shape.label() == Some("")));
    }
}
