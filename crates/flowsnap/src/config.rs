//! Configuration types for flowchart reconstruction and re-rendering.
//!
//! All types implement [`serde::Deserialize`] with a default for every field,
//! so a partial TOML file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining reconstruction and style settings.
//! - [`ReconstructionConfig`] - Snapping threshold and label cleanup.
//! - [`StyleConfig`] - Colors and stroke used by the SVG re-render.
//!
//! # Example
//!
//! ```
//! # use flowsnap::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.reconstruction().snap_threshold(), 50.0);
//! assert!(config.validate().is_ok());
//! ```

use log::warn;
use serde::Deserialize;

use flowsnap_core::{color::Color, detection::ShapeClass};

use crate::{FlowsnapError, pool::DEFAULT_SNAP_THRESHOLD};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reconstruction configuration section.
    #[serde(default)]
    reconstruction: ReconstructionConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(reconstruction: ReconstructionConfig, style: StyleConfig) -> Self {
        Self {
            reconstruction,
            style,
        }
    }

    /// Returns the reconstruction configuration.
    pub fn reconstruction(&self) -> &ReconstructionConfig {
        &self.reconstruction
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`FlowsnapError::Config`] for a non-positive or non-finite
    /// snap threshold, a non-positive stroke width, or an unparsable color,
    /// fill overrides included.
    pub fn validate(&self) -> Result<(), FlowsnapError> {
        let threshold = self.reconstruction.snap_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(FlowsnapError::Config(format!(
                "snap_threshold must be a positive number, got {threshold}"
            )));
        }
        if !self.style.stroke_width.is_finite() || self.style.stroke_width <= 0.0 {
            return Err(FlowsnapError::Config(format!(
                "stroke_width must be a positive number, got {}",
                self.style.stroke_width
            )));
        }
        self.style.background_color().map_err(FlowsnapError::Config)?;
        self.style.stroke_color().map_err(FlowsnapError::Config)?;
        for class in ShapeClass::ALL {
            self.style.fill_override(class).map_err(FlowsnapError::Config)?;
        }
        Ok(())
    }
}

/// Parameters of the geometric reconstruction.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconstructionConfig {
    /// Snapping radius in pixels. Candidates strictly closer than this join
    /// an existing node.
    #[serde(default = "default_snap_threshold")]
    snap_threshold: f32,

    /// Reduce recognized text to its first double-quoted segment.
    #[serde(default = "default_strip_quotes")]
    strip_quotes: bool,
}

impl ReconstructionConfig {
    pub fn new(snap_threshold: f32, strip_quotes: bool) -> Self {
        Self {
            snap_threshold,
            strip_quotes,
        }
    }

    /// Returns the snapping radius.
    pub fn snap_threshold(&self) -> f32 {
        self.snap_threshold
    }

    /// Returns whether labels are reduced to their quoted segment.
    pub fn strip_quotes(&self) -> bool {
        self.strip_quotes
    }
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            snap_threshold: default_snap_threshold(),
            strip_quotes: default_strip_quotes(),
        }
    }
}

fn default_snap_threshold() -> f32 {
    DEFAULT_SNAP_THRESHOLD
}

fn default_strip_quotes() -> bool {
    true
}

/// Visual styling for re-rendered flowcharts.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background color as a CSS color string. Transparent when unset.
    #[serde(default)]
    background_color: Option<String>,

    /// Outline and connector color.
    #[serde(default = "default_stroke_color")]
    stroke_color: String,

    /// Outline and connector width.
    #[serde(default = "default_stroke_width")]
    stroke_width: f32,

    /// Per-class fill overrides keyed by class name (`decision`, `output`,
    /// `process`, `input`, `terminal`).
    #[serde(default)]
    fills: FillConfig,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the parsed stroke [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn stroke_color(&self) -> Result<Color, String> {
        Color::new(&self.stroke_color).map_err(|err| format!("Invalid stroke color in config: {err}"))
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    /// Returns the parsed fill override for `class`, or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn fill_override(&self, class: ShapeClass) -> Result<Option<Color>, String> {
        self.fills
            .get(class)
            .map(Color::new)
            .transpose()
            .map_err(|err| format!("Invalid {} fill in config: {err}", FillConfig::key(class)))
    }

    /// Fill for a shape class: the configured override, else the class default.
    ///
    /// An unparsable override falls back to the class default with a warning;
    /// [`AppConfig::validate`] rejects it up front.
    pub fn fill(&self, class: ShapeClass) -> Color {
        match self.fill_override(class) {
            Ok(color) => color.unwrap_or_else(|| class.default_fill()),
            Err(err) => {
                warn!(class:% = class; "{err}, using default fill");
                class.default_fill()
            }
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            fills: FillConfig::default(),
        }
    }
}

fn default_stroke_color() -> String {
    "black".to_string()
}

fn default_stroke_width() -> f32 {
    2.0
}

/// Optional per-class fill colors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FillConfig {
    #[serde(default)]
    decision: Option<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    process: Option<String>,
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    terminal: Option<String>,
}

impl FillConfig {
    fn key(class: ShapeClass) -> &'static str {
        match class {
            ShapeClass::Decision => "decision",
            ShapeClass::Output => "output",
            ShapeClass::Process => "process",
            ShapeClass::Input => "input",
            ShapeClass::Terminal => "terminal",
        }
    }

    fn get(&self, class: ShapeClass) -> Option<&str> {
        match class {
            ShapeClass::Decision => self.decision.as_deref(),
            ShapeClass::Output => self.output.as_deref(),
            ShapeClass::Process => self.process.as_deref(),
            ShapeClass::Input => self.input.as_deref(),
            ShapeClass::Terminal => self.terminal.as_deref(),
        }
    }
}
