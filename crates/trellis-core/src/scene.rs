//! Renderer-facing projection of a diagram.
//!
//! The model stores only what the user edits; everything a renderer needs to
//! paint (box rectangles, line endpoints, stroke patterns, decoration
//! polygons) is derived here on demand, so it always reflects the current
//! box positions and contents.
//!
//! ```text
//!   ┌────────────────┐  ─┐
//!   │     Name       │   │ header_height
//!   ├────────────────┤  ─┤
//!   │ field          │   │ fields: n * line_height + 2 * padding
//!   ├────────────────┤  ─┤ (empty_compartment when n == 0)
//!   │ method()       │   │ methods: same rule
//!   └────────────────┘  ─┘
//!   ◄──── width ────►
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    error::ModelError,
    geometry::{Bounds, Point, Size, arrow_points, flatten_points},
    identifier::ElementId,
    model::{ClassBox, Diagram, ElementKind},
    relation::{Decoration, LineStyle, RelationKind},
};

/// Dimensions used to turn box contents into a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BoxMetrics {
    /// Fixed box width.
    pub width: f64,
    /// Height of the name compartment.
    pub header_height: f64,
    /// Height of one field or method entry.
    pub line_height: f64,
    /// Space above and below the entries of a non-empty compartment.
    pub padding: f64,
    /// Height of a compartment with no entries.
    pub empty_compartment: f64,
}

impl Default for BoxMetrics {
    fn default() -> Self {
        Self {
            width: 140.0,
            header_height: 30.0,
            line_height: 16.0,
            padding: 5.0,
            empty_compartment: 10.0,
        }
    }
}

impl BoxMetrics {
    fn compartment_height(&self, entries: usize) -> f64 {
        if entries == 0 {
            self.empty_compartment
        } else {
            entries as f64 * self.line_height + self.padding * 2.0
        }
    }
}

impl ClassBox {
    /// Rendered size of this box.
    pub fn size(&self, metrics: &BoxMetrics) -> Size {
        let height = metrics.header_height
            + metrics.compartment_height(self.fields().len())
            + metrics.compartment_height(self.methods().len());
        Size::new(metrics.width, height)
    }

    /// Rendered rectangle of this box at its current position.
    pub fn bounds(&self, metrics: &BoxMetrics) -> Bounds {
        Bounds::new_from_top_left(self.position(), self.size(metrics))
    }

    /// Y coordinate of the divider between the field and method compartments.
    pub fn divider_y(&self, metrics: &BoxMetrics) -> f64 {
        self.position().y()
            + metrics.header_height
            + metrics.compartment_height(self.fields().len())
    }
}

impl Diagram {
    /// Current visual endpoints of a line: the centres of its source and target boxes.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] or [`ModelError::WrongKind`] if
    /// `line_id` is not a line.
    pub fn endpoints(
        &self,
        line_id: ElementId,
        metrics: &BoxMetrics,
    ) -> Result<(Point, Point), ModelError> {
        let line = match self.kind_of(line_id) {
            Some(ElementKind::Line) => self.line(line_id),
            Some(found) => {
                return Err(ModelError::WrongKind {
                    id: line_id,
                    expected: ElementKind::Line,
                    found,
                });
            }
            None => None,
        }
        .ok_or(ModelError::UnknownElement(line_id))?;

        let center = |id: ElementId| {
            self.class_box(id)
                .map(|class_box| class_box.bounds(metrics).center())
                .ok_or(ModelError::UnknownElement(id))
        };
        Ok((center(line.source())?, center(line.target())?))
    }

    /// Builds the full scene for a renderer.
    ///
    /// Decoration polygons are computed with [`arrow_points`] using
    /// `arrow_size` for relations that need one.
    pub fn scene(&self, metrics: &BoxMetrics, arrow_size: f64) -> Scene<'_> {
        let boxes = self
            .boxes()
            .map(|class_box| BoxVisual {
                id: class_box.id(),
                bounds: class_box.bounds(metrics),
                divider_y: class_box.divider_y(metrics),
                name: class_box.name(),
                fields: class_box.fields(),
                methods: class_box.methods(),
            })
            .collect();

        let lines = self
            .lines()
            .filter_map(|line| {
                let (source, target) = self.endpoints(line.id(), metrics).ok()?;
                let relation = line.relation();
                let decoration = relation.decoration();
                let polygon = decoration
                    .shape()
                    .map(|shape| arrow_points(source, target, shape, arrow_size))
                    .unwrap_or_default();
                Some(LineVisual {
                    id: line.id(),
                    relation,
                    source,
                    target,
                    style: relation.line_style(),
                    dash: relation.line_style().dash_pattern(),
                    decoration,
                    flat_polygon: flatten_points(&polygon),
                    polygon,
                })
            })
            .collect();

        let labels = self
            .labels()
            .map(|label| LabelVisual {
                id: label.id(),
                text: label.text(),
                position: label.position(),
            })
            .collect();

        Scene {
            boxes,
            lines,
            labels,
        }
    }
}

/// Everything a renderer needs to paint a diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene<'a> {
    pub boxes: Vec<BoxVisual<'a>>,
    pub lines: Vec<LineVisual>,
    pub labels: Vec<LabelVisual<'a>>,
}

/// Rectangle and text of one box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxVisual<'a> {
    pub id: ElementId,
    pub bounds: Bounds,
    pub divider_y: f64,
    pub name: &'a str,
    pub fields: &'a [String],
    pub methods: &'a [String],
}

/// Stroke and decoration of one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineVisual {
    pub id: ElementId,
    pub relation: RelationKind,
    pub source: Point,
    pub target: Point,
    pub style: LineStyle,
    pub dash: Option<[f64; 2]>,
    pub decoration: Decoration,
    /// Closed decoration polygon, tip first; empty when the decoration is not a polygon.
    pub polygon: Vec<Point>,
    /// `polygon` as `[x0, y0, x1, y1, ...]`.
    pub flat_polygon: Vec<f64>,
}

/// Text and anchor of one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelVisual<'a> {
    pub id: ElementId,
    pub text: &'a str,
    pub position: Point,
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::geometry::ArrowShape;

    #[test]
    fn test_box_size_with_empty_compartments() {
        let mut diagram = Diagram::new();
        let id = diagram.add_box("Empty", vec![], vec![], Point::new(50.0, 50.0)).unwrap();
        let size = diagram.class_box(id).unwrap().size(&BoxMetrics::default());

        assert_approx_eq!(f64, size.width(), 140.0);
        assert_approx_eq!(f64, size.height(), 30.0 + 10.0 + 10.0);
    }

    #[test]
    fn test_box_size_and_divider_with_entries() {
        let mut diagram = Diagram::new();
        let id = diagram.add_box(
            "Dog",
            vec!["name".to_string(), "age".to_string()],
            vec!["bark()".to_string()],
            Point::new(0.0, 100.0),
        ).unwrap();
        let class_box = diagram.class_box(id).unwrap();
        let metrics = BoxMetrics::default();

        // header 30, fields 2*16 + 10, methods 1*16 + 10
        assert_approx_eq!(f64, class_box.size(&metrics).height(), 30.0 + 42.0 + 26.0);
        assert_approx_eq!(f64, class_box.divider_y(&metrics), 100.0 + 30.0 + 42.0);
    }

    #[test]
    fn test_endpoints_follow_box_moves() {
        let mut diagram = Diagram::new();
        let a = diagram.add_box("A", vec![], vec![], Point::new(0.0, 0.0)).unwrap();
        let b = diagram.add_box("B", vec![], vec![], Point::new(300.0, 0.0)).unwrap();
        let line = diagram.connect(a, b, RelationKind::Association).unwrap();
        let metrics = BoxMetrics::default();

        let (source, target) = diagram.endpoints(line, &metrics).unwrap();
        assert_eq!(source, Point::new(70.0, 25.0));
        assert_eq!(target, Point::new(370.0, 25.0));

        diagram.move_box(b, Point::new(300.0, 200.0)).unwrap();
        let (_, target) = diagram.endpoints(line, &metrics).unwrap();
        assert_eq!(target, Point::new(370.0, 225.0));
    }

    #[test]
    fn test_endpoints_of_non_line() {
        let mut diagram = Diagram::new();
        let a = diagram.add_box("A", vec![], vec![], Point::default()).unwrap();
        assert!(matches!(
            diagram.endpoints(a, &BoxMetrics::default()),
            Err(ModelError::WrongKind { .. })
        ));
        assert_eq!(
            diagram.endpoints(ElementId::new(99), &BoxMetrics::default()),
            Err(ModelError::UnknownElement(ElementId::new(99)))
        );
    }

    #[test]
    fn test_scene_decorations() {
        let mut diagram = Diagram::new();
        let a = diagram.add_box("A", vec![], vec![], Point::new(0.0, 0.0)).unwrap();
        let b = diagram.add_box("B", vec![], vec![], Point::new(300.0, 0.0)).unwrap();
        diagram.connect(a, b, RelationKind::Composition).unwrap();
        diagram.connect(b, a, RelationKind::Realization).unwrap();
        diagram.add_label("note", Point::new(5.0, 5.0)).unwrap();

        let scene = diagram.scene(&BoxMetrics::default(), 15.0);

        assert_eq!(scene.boxes.len(), 2);
        assert_eq!(scene.labels[0].text, "note");

        let composition = &scene.lines[0];
        assert_eq!(composition.decoration.shape(), Some(ArrowShape::Diamond));
        assert_eq!(composition.polygon.len(), 4);
        assert_eq!(composition.polygon[0], composition.target);
        assert_eq!(composition.flat_polygon.len(), 8);
        assert_eq!(composition.flat_polygon[0], composition.target.x());
        assert_eq!(composition.flat_polygon[1], composition.target.y());
        assert_eq!(composition.dash, None);

        let realization = &scene.lines[1];
        assert_eq!(realization.decoration, Decoration::None);
        assert!(realization.polygon.is_empty());
        assert!(realization.flat_polygon.is_empty());
        assert_eq!(realization.dash, Some([4.0, 2.0]));
    }
}
