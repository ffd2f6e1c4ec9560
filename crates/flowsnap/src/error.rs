//! Error types for Flowsnap operations.
//!
//! This module provides the main error type [`FlowsnapError`]. Detector
//! noise is never an error: malformed detections are skipped and counted in
//! a [`SkipReport`](crate::SkipReport) instead.

use std::io;

use thiserror::Error;

/// The main error type for Flowsnap operations.
///
/// # Diagnostic Variants
///
/// The `Input` variant keeps the offending JSON source next to the parser
/// error, so callers can point at the exact line and column.
#[derive(Debug, Error)]
pub enum FlowsnapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid input: {err}")]
    Input { err: serde_json::Error, src: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for FlowsnapError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl FlowsnapError {
    /// Create a new `Input` error with the associated source text.
    pub fn new_input_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Input {
            err,
            src: src.into(),
        }
    }
}
