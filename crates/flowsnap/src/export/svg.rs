//! SVG render target.

use log::debug;
use svg::{self, node::element as svg_element};

use flowsnap_core::{
    color::Color,
    detection::ShapeClass,
    geometry::{Bounds, Point, Size},
};

use super::{Error, RenderTarget, ShapeCommand};
use crate::config::StyleConfig;

const MARKER_ID: &str = "arrow-head";
const FONT_FAMILY: &str = "Arial";
const FONT_SIZE: f32 = 14.0;

/// Collects shape and line commands and renders them into one SVG document.
///
/// Shapes are drawn below lines so arrowheads stay visible.
///
/// # Examples
///
/// ```
/// use flowsnap::{
///     config::StyleConfig,
///     export::{RenderTarget, ShapeCommand, svg::SvgTarget},
/// };
/// use flowsnap_core::geometry::{Bounds, Point};
///
/// let mut target = SvgTarget::new(&StyleConfig::default()).unwrap();
/// target
///     .add_shape(&ShapeCommand {
///         class_id: 7,
///         bounds: Bounds::from_xywh([0.0, 0.0, 100.0, 40.0]),
///         text: "Process".to_string(),
///     })
///     .unwrap();
/// target.add_line(Point::new(50.0, 40.0), Point::new(50.0, 120.0)).unwrap();
///
/// let svg = target.finish();
/// assert!(svg.contains("<rect"));
/// ```
pub struct SvgTarget {
    style: StyleConfig,
    stroke_color: Color,
    background_color: Option<Color>,
    shapes: Vec<Box<dyn svg::Node>>,
    lines: Vec<Box<dyn svg::Node>>,
    content_bounds: Option<Bounds>,
}

impl SvgTarget {
    /// Creates an empty target styled by `style`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if a configured color cannot be parsed.
    pub fn new(style: &StyleConfig) -> Result<Self, Error> {
        let stroke_color = style.stroke_color().map_err(Error::Render)?;
        let background_color = style.background_color().map_err(Error::Render)?;
        Ok(Self {
            style: style.clone(),
            stroke_color,
            background_color,
            shapes: Vec::new(),
            lines: Vec::new(),
            content_bounds: None,
        })
    }

    /// Renders everything collected so far into an SVG string.
    pub fn finish(self) -> String {
        let content_bounds = self.content_bounds.unwrap_or_default();
        let svg_size = Self::calculate_svg_dimensions(content_bounds.to_size());
        let margin_x = (svg_size.width() - content_bounds.width()) / 2.0;
        let margin_y = (svg_size.height() - content_bounds.height()) / 2.0;

        let mut doc = svg::Document::new()
            .set(
                "viewBox",
                format!("0 0 {} {}", svg_size.width(), svg_size.height()),
            )
            .set("width", svg_size.width())
            .set("height", svg_size.height());

        if let Some(color) = self.background_color {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", svg_size.width())
                    .set("height", svg_size.height())
                    .set("fill", color.to_string())
                    .set("fill-opacity", color.alpha()),
            );
        }

        doc = doc.add(
            svg_element::Definitions::new().add(Self::create_arrow_marker(self.stroke_color)),
        );

        let mut main_group = svg_element::Group::new().set(
            "transform",
            format!(
                "translate({}, {})",
                margin_x - content_bounds.min_x(),
                margin_y - content_bounds.min_y()
            ),
        );
        for node in self.shapes.into_iter().chain(self.lines) {
            main_group = main_group.add(node);
        }

        doc.add(main_group).to_string()
    }

    /// Content size plus a fixed margin on every side.
    fn calculate_svg_dimensions(content_size: Size) -> Size {
        let margin: f32 = 50.0;
        let width = margin.mul_add(2.0, content_size.width());
        let height = margin.mul_add(2.0, content_size.height());

        debug!("Final SVG dimensions: {width}x{height}");

        Size::new(width, height)
    }

    fn extend_bounds(&mut self, bounds: Bounds) {
        self.content_bounds = Some(match self.content_bounds {
            Some(current) => current.merge(&bounds),
            None => bounds,
        });
    }

    fn create_arrow_marker(color: Color) -> svg_element::Marker {
        svg_element::Marker::new()
            .set("id", MARKER_ID)
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(
                svg_element::Path::new()
                    .set("d", "M 0 0 L 10 5 L 0 10 z")
                    .set("fill", color.to_string()),
            )
    }

    fn fill_for(&self, class: Option<ShapeClass>) -> String {
        class.map_or_else(|| "white".to_string(), |class| self.style.fill(class).to_string())
    }

    fn outline(&self, class: Option<ShapeClass>, bounds: Bounds) -> Box<dyn svg::Node> {
        let fill = self.fill_for(class);
        let stroke = self.stroke_color.to_string();
        let width = self.style.stroke_width();
        let center = bounds.center();

        match class {
            Some(ShapeClass::Decision) => Box::new(
                svg_element::Polygon::new()
                    .set(
                        "points",
                        polygon_points(&[
                            Point::new(center.x(), bounds.min_y()),
                            Point::new(bounds.max_x(), center.y()),
                            Point::new(center.x(), bounds.max_y()),
                            Point::new(bounds.min_x(), center.y()),
                        ]),
                    )
                    .set("fill", fill)
                    .set("stroke", stroke)
                    .set("stroke-width", width),
            ),
            Some(ShapeClass::Terminal) => Box::new(
                svg_element::Ellipse::new()
                    .set("cx", center.x())
                    .set("cy", center.y())
                    .set("rx", bounds.width() / 2.0)
                    .set("ry", bounds.height() / 2.0)
                    .set("fill", fill)
                    .set("stroke", stroke)
                    .set("stroke-width", width),
            ),
            Some(ShapeClass::Input) => {
                let skew = bounds.width() * 0.2;
                Box::new(
                    svg_element::Polygon::new()
                        .set(
                            "points",
                            polygon_points(&[
                                Point::new(bounds.min_x() + skew, bounds.min_y()),
                                Point::new(bounds.max_x(), bounds.min_y()),
                                Point::new(bounds.max_x() - skew, bounds.max_y()),
                                Point::new(bounds.min_x(), bounds.max_y()),
                            ]),
                        )
                        .set("fill", fill)
                        .set("stroke", stroke)
                        .set("stroke-width", width),
                )
            }
            Some(ShapeClass::Output) => Box::new(
                svg_element::Path::new()
                    .set("d", document_path_data(bounds))
                    .set("fill", fill)
                    .set("stroke", stroke)
                    .set("stroke-width", width),
            ),
            Some(ShapeClass::Process) | None => Box::new(
                svg_element::Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("fill", fill)
                    .set("stroke", stroke)
                    .set("stroke-width", width),
            ),
        }
    }
}

impl RenderTarget for SvgTarget {
    fn add_shape(&mut self, shape: &ShapeCommand) -> Result<(), Error> {
        let bounds = shape.bounds;
        if bounds.is_degenerate() {
            return Err(Error::Render(format!(
                "shape of class {} has an empty box",
                shape.class_id
            )));
        }

        let class = shape.class();
        let mut group = svg_element::Group::new().add(self.outline(class, bounds));
        if !shape.text.is_empty() {
            let center = bounds.center();
            group = group.add(
                svg_element::Text::new(shape.text.as_str())
                    .set("x", center.x())
                    .set("y", center.y())
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "central")
                    .set("font-family", FONT_FAMILY)
                    .set("font-size", FONT_SIZE),
            );
        }

        self.shapes.push(Box::new(group));
        self.extend_bounds(bounds);
        Ok(())
    }

    fn add_line(&mut self, from: Point, to: Point) -> Result<(), Error> {
        let path = svg_element::Path::new()
            .set("d", path_data_from_points(from, to))
            .set("fill", "none")
            .set("stroke", self.stroke_color.to_string())
            .set("stroke-opacity", self.stroke_color.alpha())
            .set("stroke-width", self.style.stroke_width())
            .set("marker-end", format!("url(#{MARKER_ID})"));

        self.lines.push(Box::new(path));
        self.extend_bounds(Bounds::new_from_corners(
            Point::new(from.x().min(to.x()), from.y().min(to.y())),
            Point::new(from.x().max(to.x()), from.y().max(to.y())),
        ));
        Ok(())
    }
}

/// Create a path data string from two points
fn path_data_from_points(start: Point, end: Point) -> String {
    format!("M {} {} L {} {}", start.x(), start.y(), end.x(), end.y())
}

fn polygon_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", point.x(), point.y()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rectangle whose bottom edge is a single wave.
fn document_path_data(bounds: Bounds) -> String {
    let wave = bounds.height() * 0.1;
    let bottom = bounds.max_y() - wave;
    format!(
        "M {} {} L {} {} L {} {} C {} {}, {} {}, {} {} Z",
        bounds.min_x(),
        bounds.min_y(),
        bounds.max_x(),
        bounds.min_y(),
        bounds.max_x(),
        bottom,
        bounds.min_x() + bounds.width() * 0.75,
        bottom - 2.0 * wave,
        bounds.min_x() + bounds.width() * 0.25,
        bounds.max_y() + wave,
        bounds.min_x(),
        bottom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(class_id: u32, text: &str) -> ShapeCommand {
        ShapeCommand {
            class_id,
            bounds: Bounds::from_xywh([0.0, 0.0, 100.0, 40.0]),
            text: text.to_string(),
        }
    }

    fn render(commands: &[ShapeCommand]) -> String {
        let mut target = SvgTarget::new(&StyleConfig::default()).unwrap();
        for command in commands {
            target.add_shape(command).unwrap();
        }
        target.finish()
    }

    #[test]
    fn test_shape_outlines_per_class() {
        assert!(render(&[command(4, "")]).contains("<polygon"));
        assert!(render(&[command(9, "")]).contains("<ellipse"));
        assert!(render(&[command(8, "")]).contains("<polygon"));
        assert!(render(&[command(6, "")]).contains(" C "));
        assert!(render(&[command(7, "")]).contains("<rect"));
        assert!(render(&[command(42, "")]).contains("<rect"));
    }

    #[test]
    fn test_text_is_drawn_when_present() {
        assert!(render(&[command(7, "Compute")]).contains("Compute"));
        assert!(!render(&[command(7, "")]).contains("<text"));
    }

    #[test]
    fn test_lines_reference_arrow_marker() {
        let mut target = SvgTarget::new(&StyleConfig::default()).unwrap();
        target
            .add_line(Point::new(0.0, 0.0), Point::new(0.0, 100.0))
            .unwrap();
        let svg = target.finish();

        assert!(svg.contains("<marker"));
        assert!(svg.contains("url(#arrow-head)"));
        assert!(svg.contains("M 0 0 L 0 100"));
    }

    #[test]
    fn test_dimensions_include_margin() {
        let svg = render(&[command(7, "")]);
        assert!(svg.contains("viewBox=\"0 0 200 140\""));
    }

    #[test]
    fn test_degenerate_shape_is_rejected() {
        let mut target = SvgTarget::new(&StyleConfig::default()).unwrap();
        let mut flat = command(7, "");
        flat.bounds = Bounds::from_xywh([0.0, 0.0, 0.0, 40.0]);
        assert!(matches!(target.add_shape(&flat), Err(Error::Render(_))));
    }

    #[test]
    fn test_polygon_points_format() {
        let points = [Point::new(1.0, 2.0), Point::new(3.5, 4.0)];
        assert_eq!(polygon_points(&points), "1,2 3.5,4");
    }
}
