//! Command-line argument definitions for the Flowsnap CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input kind, output paths,
//! configuration file and logging verbosity.

use clap::{Parser, ValueEnum};

/// What the input file contains.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputKind {
    /// Detector output: `{shapes, arrows}` or a flat list of detections
    #[default]
    Detections,
    /// A previously written graph document
    Graph,
    /// A previously written matrix document
    Matrix,
}

/// Command-line arguments for the Flowsnap flowchart tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input JSON file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Kind of input file
    #[arg(long, value_enum, default_value_t = InputKind::Detections)]
    pub from: InputKind,

    /// Path to the graph document written after reconstruction
    #[arg(long, default_value = "graph.json")]
    pub graph_out: String,

    /// Path to the matrix document written after reconstruction
    #[arg(long, default_value = "matrix.json")]
    pub matrix_out: String,

    /// Path to an SVG re-render. Defaults to `out.svg` when replaying a document
    #[arg(long)]
    pub svg: Option<String>,

    /// Path to a JSON object of recognized text keyed by shape id
    #[arg(long)]
    pub labels: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Arguments for processing `input` with every other option at its default.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            from: InputKind::default(),
            graph_out: "graph.json".to_string(),
            matrix_out: "matrix.json".to_string(),
            svg: None,
            labels: None,
            config: None,
            log_level: "info".to_string(),
        }
    }
}
