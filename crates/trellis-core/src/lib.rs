//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types of the Trellis class-diagram
//! editor. It includes:
//!
//! - **Identifiers**: One id namespace for all elements ([`identifier::ElementId`])
//! - **Geometry**: Points, bounds and arrowhead polygons ([`geometry`] module)
//! - **Relations**: Relationship kinds and their line styles ([`relation`] module)
//! - **Model**: The diagram aggregate and its elements ([`model`] module)
//! - **Scene**: Renderer-facing box rectangles and line decorations ([`scene`] module)

pub mod error;
pub mod geometry;
pub mod identifier;
pub mod model;
pub mod relation;
pub mod scene;

pub use error::{ConnectionProblem, ModelError};
