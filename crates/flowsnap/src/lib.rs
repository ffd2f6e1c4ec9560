//! Flowsnap - flowchart graph reconstruction from detected boxes.
//!
//! An object detector finds flowchart shapes and arrow segments in an image.
//! Flowsnap turns those boxes into a directed graph between shapes, writes it
//! as graph and adjacency-matrix JSON documents, and can re-render either
//! document as SVG.

pub mod collapse;
pub mod config;
pub mod document;
pub mod export;
pub mod label;
pub mod pool;
pub mod resolve;

mod error;
mod reconstruct;

pub use flowsnap_core::{color, detection, geometry, shape};

pub use error::FlowsnapError;
pub use reconstruct::{Reconstruction, SkipReport, reconstruct};

use log::{debug, info, trace};

use config::AppConfig;
use detection::{Detection, Detections};
use document::{GraphDocument, MatrixDocument};
use export::{RenderTarget, svg::SvgTarget};
use label::{LabelReport, TextRecognizer};

/// Builder for reconstructing and re-rendering flowcharts.
///
/// # Examples
///
/// ```rust
/// use flowsnap::{GraphBuilder, config::AppConfig};
///
/// let source = r#"{
///     "shapes": [
///         {"class_id": 9, "bbox": [0, 0, 100, 40]},
///         {"class_id": 7, "bbox": [0, 200, 100, 40]}
///     ],
///     "arrows": [{"class_id": 0, "bbox": [45, 45, 10, 150]}]
/// }"#;
///
/// let builder = GraphBuilder::new(AppConfig::default());
/// let detections = builder.load_detections(source).expect("valid input");
/// let result = builder.reconstruct(&detections);
/// assert_eq!(result.edges().len(), 1);
///
/// let svg = builder
///     .render_graph_svg(&result.graph_document())
///     .expect("Failed to render");
/// assert!(svg.contains("<svg"));
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    config: AppConfig,
}

impl GraphBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse detector output.
    ///
    /// Accepts either `{"shapes": [...], "arrows": [...]}` or one flat list
    /// of detections, which is split by class id. The layout is chosen from
    /// the first non-whitespace character, so parse errors point into the
    /// document rather than at its end.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsnapError::Input`] if `source` is not valid detections
    /// JSON.
    pub fn load_detections(&self, source: &str) -> Result<Detections, FlowsnapError> {
        let parsed = if source.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<Detection>>(source).map(Detections::partition)
        } else {
            serde_json::from_str::<Detections>(source)
        };
        let detections = parsed.map_err(|err| FlowsnapError::new_input_error(err, source))?;
        debug!(
            shapes = detections.shapes.len(),
            arrows = detections.arrows.len();
            "Loaded detections"
        );
        Ok(detections)
    }

    /// Parse a previously written graph document.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsnapError::Input`] if `source` is not a graph document.
    pub fn load_graph(&self, source: &str) -> Result<GraphDocument, FlowsnapError> {
        serde_json::from_str(source).map_err(|err| FlowsnapError::new_input_error(err, source))
    }

    /// Parse a previously written matrix document.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsnapError::Input`] if `source` is not a matrix document.
    pub fn load_matrix(&self, source: &str) -> Result<MatrixDocument, FlowsnapError> {
        serde_json::from_str(source).map_err(|err| FlowsnapError::new_input_error(err, source))
    }

    /// Reconstruct the flowchart graph with the configured snap threshold.
    pub fn reconstruct(&self, detections: &Detections) -> Reconstruction {
        info!(
            detections = detections.len(),
            snap_threshold = self.config.reconstruction().snap_threshold();
            "Reconstructing flowchart"
        );
        let result = reconstruct(detections, self.config.reconstruction().snap_threshold());
        if result.skipped().total() > 0 {
            info!(skipped:% = result.skipped(); "Some detections were skipped");
        }
        trace!(edges:? = result.edges(); "Reconstructed edges");
        result
    }

    /// Attach recognized text to every shape of a finished reconstruction.
    pub fn label(
        &self,
        reconstruction: &mut Reconstruction,
        recognizer: &dyn TextRecognizer,
    ) -> LabelReport {
        label::apply_labels(
            reconstruction.shapes_mut(),
            recognizer,
            self.config.reconstruction().strip_quotes(),
        )
    }

    /// Render a graph document to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsnapError::Export`] if the document cannot be drawn.
    pub fn render_graph_svg(&self, document: &GraphDocument) -> Result<String, FlowsnapError> {
        info!(nodes = document.nodes.len(); "Rendering graph document");
        self.render_svg(|target| export::replay_graph(document, target))
    }

    /// Render a matrix document to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsnapError::Export`] if the document cannot be drawn.
    pub fn render_matrix_svg(&self, document: &MatrixDocument) -> Result<String, FlowsnapError> {
        info!(shapes = document.shapes.len(); "Rendering matrix document");
        self.render_svg(|target| export::replay_matrix(document, target))
    }

    fn render_svg(
        &self,
        replay: impl FnOnce(&mut dyn RenderTarget) -> Result<(), export::Error>,
    ) -> Result<String, FlowsnapError> {
        let mut target = SvgTarget::new(self.config.style())?;
        replay(&mut target)?;
        let svg = target.finish();
        info!("SVG rendered successfully");
        Ok(svg)
    }
}
