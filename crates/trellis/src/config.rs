//! Configuration types for Trellis editing sessions.
//!
//! All types implement [`serde::Deserialize`] with defaults for every field,
//! so a configuration file only needs to name the values it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`HistoryConfig`] - Undo history limits.
//! - [`CanvasConfig`] - Box metrics and decoration size used to build scenes.
//! - [`DefaultsConfig`] - Name and position of boxes added from the toolbar.
//!
//! # Example
//!
//! ```
//! # use trellis::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.history().max_depth(), 50);
//! assert_eq!(config.defaults().box_name(), "Class");
//! ```

use serde::Deserialize;

use trellis_core::{
    geometry::{DEFAULT_ARROW_SIZE, Point},
    scene::BoxMetrics,
};

use crate::history::DEFAULT_MAX_DEPTH;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    history: HistoryConfig,

    #[serde(default)]
    canvas: CanvasConfig,

    #[serde(default)]
    defaults: DefaultsConfig,
}

impl AppConfig {
    pub fn new(history: HistoryConfig, canvas: CanvasConfig, defaults: DefaultsConfig) -> Self {
        Self {
            history,
            canvas,
            defaults,
        }
    }

    pub fn history(&self) -> &HistoryConfig {
        &self.history
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }
}

/// Undo history limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept; older steps are discarded.
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl HistoryConfig {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Geometry settings for building renderer scenes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CanvasConfig {
    #[serde(default)]
    box_metrics: BoxMetrics,

    /// Length of arrowheads and diamonds along the line.
    #[serde(default = "default_arrow_size")]
    arrow_size: f64,
}

fn default_arrow_size() -> f64 {
    DEFAULT_ARROW_SIZE
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(BoxMetrics::default(), DEFAULT_ARROW_SIZE)
    }
}

impl CanvasConfig {
    pub fn new(box_metrics: BoxMetrics, arrow_size: f64) -> Self {
        Self {
            box_metrics,
            arrow_size,
        }
    }

    pub fn box_metrics(&self) -> &BoxMetrics {
        &self.box_metrics
    }

    pub fn arrow_size(&self) -> f64 {
        self.arrow_size
    }
}

/// Values used when a box is added without explicit content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_box_name")]
    box_name: String,

    #[serde(default = "default_box_position")]
    box_position: Point,
}

fn default_box_name() -> String {
    "Class".to_string()
}

fn default_box_position() -> Point {
    Point::new(50.0, 50.0)
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            box_name: default_box_name(),
            box_position: default_box_position(),
        }
    }
}

impl DefaultsConfig {
    pub fn new(box_name: impl Into<String>, box_position: Point) -> Self {
        Self {
            box_name: box_name.into(),
            box_position,
        }
    }

    pub fn box_name(&self) -> &str {
        &self.box_name
    }

    pub fn box_position(&self) -> Point {
        self.box_position
    }
}
