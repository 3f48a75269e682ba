//! Geometric primitives and arrowhead construction.
//!
//! This module provides the value types used to place diagram elements and
//! the pure function that builds the decoration polygon drawn at the target
//! end of a relationship line.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//! - [`ArrowShape`] and [`arrow_points`] - Rotated arrowhead polygons
//!
//! # Coordinate System
//!
//! Trellis uses the same coordinate system as SVG and most canvas APIs:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default edge length of an arrowhead decoration.
pub const DEFAULT_ARROW_SIZE: f64 = 15.0;

/// A 2D point representing a position in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use trellis_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// assert_eq!(p1.sub_point(p2), Point::new(5.0, 15.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Rotates this point around the origin by `angle` radians.
    ///
    /// Uses the standard 2D rotation matrix, so with y pointing down a
    /// positive angle turns clockwise on screen.
    pub fn rotate(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Returns true when both coordinates are finite numbers.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f64 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f64 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f64 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f64 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Polygon outline used to decorate the target end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowShape {
    /// Three vertices: tip and two back corners.
    Triangle,
    /// Four vertices: tip, upper, back and lower corners.
    Diamond,
}

impl ArrowShape {
    /// Vertices in shape-local space with the tip at the origin, pointing along +x.
    fn local_points(self, size: f64) -> Vec<Point> {
        match self {
            Self::Triangle => vec![
                Point::new(0.0, 0.0),
                Point::new(-size, -size / 1.5),
                Point::new(-size, size / 1.5),
            ],
            Self::Diamond => vec![
                Point::new(0.0, 0.0),
                Point::new(-size, -size / 2.0),
                Point::new(-size * 2.0, 0.0),
                Point::new(-size, size / 2.0),
            ],
        }
    }
}

/// Computes the polygon for an arrowhead at `target`, oriented along the
/// direction from `source` to `target`.
///
/// The returned vertices form a closed polygon starting at the tip, which is
/// always exactly `target`. Coincident endpoints are not an error: the angle
/// degenerates to zero and the shape points along +x.
///
/// # Examples
///
/// ```
/// # use trellis_core::geometry::{ArrowShape, Point, arrow_points};
/// let points = arrow_points(
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     ArrowShape::Triangle,
///     15.0,
/// );
/// assert_eq!(points.len(), 3);
/// assert_eq!(points[0], Point::new(10.0, 0.0));
/// ```
pub fn arrow_points(source: Point, target: Point, shape: ArrowShape, size: f64) -> Vec<Point> {
    let delta = target.sub_point(source);
    let angle = delta.y.atan2(delta.x);

    shape
        .local_points(size)
        .into_iter()
        .map(|point| point.rotate(angle).add_point(target))
        .collect()
}

/// Flattens points into `[x0, y0, x1, y1, ...]`, the layout canvas polygon calls expect.
pub fn flatten_points(points: &[Point]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn coord() -> impl Strategy<Value = f64> {
        -1000.0f64..1000.0
    }

    proptest! {
        #[test]
        fn tip_is_always_target(x1 in coord(), y1 in coord(), x2 in coord(), y2 in coord()) {
            let target = Point::new(x2, y2);
            for shape in [ArrowShape::Triangle, ArrowShape::Diamond] {
                let points = arrow_points(Point::new(x1, y1), target, shape, DEFAULT_ARROW_SIZE);
                prop_assert_eq!(points[0], target);
            }
        }

        #[test]
        fn triangle_back_corners_are_equidistant_from_tip(
            x1 in coord(), y1 in coord(), x2 in coord(), y2 in coord(),
        ) {
            let points = arrow_points(
                Point::new(x1, y1),
                Point::new(x2, y2),
                ArrowShape::Triangle,
                DEFAULT_ARROW_SIZE,
            );
            let tip = points[0];
            let left = points[1].sub_point(tip);
            let right = points[2].sub_point(tip);
            prop_assert!(approx_eq!(
                f64,
                left.x().hypot(left.y()),
                right.x().hypot(right.y()),
                epsilon = 0.001
            ));
        }
    }
}
