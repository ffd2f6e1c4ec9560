//! CLI logic for the Flowsnap flowchart tool.
//!
//! Reconstructs flowchart graphs from detector output and writes them as
//! JSON documents, or re-renders a previously written document as SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, InputKind};

use std::fs;

use log::{debug, info, warn};

use flowsnap::{FlowsnapError, GraphBuilder, document::to_json, label::LabelTable};

/// SVG path used when replaying a document without `--svg`.
const DEFAULT_SVG_OUTPUT: &str = "out.svg";

/// Run the Flowsnap CLI application
///
/// # Errors
///
/// Returns `FlowsnapError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed input or label files
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), FlowsnapError> {
    info!(
        input_path = args.input,
        from:? = args.from;
        "Processing flowchart"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;
    let builder = GraphBuilder::new(app_config);

    match args.from {
        InputKind::Detections => reconstruct(&builder, args, &source),
        InputKind::Graph => {
            let document = builder.load_graph(&source)?;
            let svg = builder.render_graph_svg(&document)?;
            write_svg(args, &svg)
        }
        InputKind::Matrix => {
            let document = builder.load_matrix(&source)?;
            let svg = builder.render_matrix_svg(&document)?;
            write_svg(args, &svg)
        }
    }
}

fn reconstruct(builder: &GraphBuilder, args: &Args, source: &str) -> Result<(), FlowsnapError> {
    let detections = builder.load_detections(source)?;
    let mut result = builder.reconstruct(&detections);

    let skipped = result.skipped();
    if skipped.total() > 0 {
        warn!(skipped:% = skipped; "Detections were skipped");
    }

    if let Some(labels_path) = &args.labels {
        let labels = fs::read_to_string(labels_path)?;
        let table = LabelTable::from_json(&labels)?;
        debug!(labels_file = labels_path, entries = table.len(); "Label table loaded");
        let report = builder.label(&mut result, &table);
        info!(
            labeled = report.labeled(),
            failed = report.failures().len();
            "Labels applied"
        );
    }

    let graph = result.graph_document();
    fs::write(&args.graph_out, to_json(&graph)?)?;
    info!(output_file = args.graph_out; "Graph document written");

    fs::write(&args.matrix_out, to_json(&result.matrix_document())?)?;
    info!(output_file = args.matrix_out; "Matrix document written");

    if let Some(svg_path) = &args.svg {
        let svg = builder.render_graph_svg(&graph)?;
        fs::write(svg_path, svg)?;
        info!(output_file = svg_path; "SVG exported successfully");
    }

    Ok(())
}

fn write_svg(args: &Args, svg: &str) -> Result<(), FlowsnapError> {
    let path = args.svg.as_deref().unwrap_or(DEFAULT_SVG_OUTPUT);
    fs::write(path, svg)?;
    info!(output_file = path; "SVG exported successfully");
    Ok(())
}
