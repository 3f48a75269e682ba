//! Relationship kinds and how they are drawn.
//!
//! Every [`RelationKind`] maps to a [`LineStyle`] (solid or dashed stroke)
//! and a [`Decoration`] placed at the target end of the line:
//!
//! | Relation | Line style | Decoration |
//! |--------------|------------|-----------------|
//! | Association | solid | plain arrow |
//! | Inheritance | solid | hollow triangle |
//! | Realization | dashed | none |
//! | Dependency | dashed | plain arrow |
//! | Aggregation | solid | hollow diamond |
//! | Composition | solid | filled diamond |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::ArrowShape;

/// The UML relationship a line expresses, from source to target.
///
/// Names serialize exactly as written here (`"Association"`, `"Inheritance"`, ...).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    #[default]
    Association,
    Inheritance,
    Realization,
    Dependency,
    Aggregation,
    Composition,
}

impl RelationKind {
    /// All relation kinds in toolbar order.
    pub const ALL: [RelationKind; 6] = [
        Self::Association,
        Self::Inheritance,
        Self::Realization,
        Self::Dependency,
        Self::Aggregation,
        Self::Composition,
    ];

    /// Returns the persisted name of this relation kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Association => "Association",
            Self::Inheritance => "Inheritance",
            Self::Realization => "Realization",
            Self::Dependency => "Dependency",
            Self::Aggregation => "Aggregation",
            Self::Composition => "Composition",
        }
    }

    /// Stroke pattern used for lines of this kind.
    pub fn line_style(self) -> LineStyle {
        match self {
            Self::Realization | Self::Dependency => LineStyle::Dashed,
            Self::Association | Self::Inheritance | Self::Aggregation | Self::Composition => {
                LineStyle::Solid
            }
        }
    }

    /// Decoration drawn at the target end of lines of this kind.
    pub fn decoration(self) -> Decoration {
        match self {
            Self::Association | Self::Dependency => Decoration::Arrow,
            Self::Inheritance => Decoration::Polygon {
                shape: ArrowShape::Triangle,
                fill: Fill::Hollow,
            },
            Self::Aggregation => Decoration::Polygon {
                shape: ArrowShape::Diamond,
                fill: Fill::Hollow,
            },
            Self::Composition => Decoration::Polygon {
                shape: ArrowShape::Diamond,
                fill: Fill::Filled,
            },
            Self::Realization => Decoration::None,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stroke pattern of a relationship line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

impl LineStyle {
    /// Dash and gap lengths for patterned strokes, `None` for solid lines.
    pub fn dash_pattern(self) -> Option<[f64; 2]> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some([4.0, 2.0]),
        }
    }
}

/// Interior of a decoration polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    /// Outlined with a white interior.
    Hollow,
    /// Solid black.
    Filled,
}

/// What the renderer draws at the target end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decoration {
    /// Bare line end.
    None,
    /// The renderer's stock open arrowhead.
    Arrow,
    /// A polygon computed with [`arrow_points`](crate::geometry::arrow_points).
    Polygon { shape: ArrowShape, fill: Fill },
}

impl Decoration {
    /// Returns the polygon shape when this decoration needs computed geometry.
    pub fn shape(self) -> Option<ArrowShape> {
        match self {
            Self::Polygon { shape, .. } => Some(shape),
            Self::None | Self::Arrow => None,
        }
    }
}
