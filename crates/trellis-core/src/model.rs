//! Diagram element model.
//!
//! - [`Diagram`] - The aggregate owning every element and enforcing referential integrity
//! - [`ClassBox`], [`Line`], [`Label`] - The three element kinds
//! - [`ElementRef`] / [`ElementKind`] - Kind-agnostic access for selection and deletion

mod diagram;
mod element;

pub use diagram::Diagram;
pub use element::{ClassBox, ElementKind, ElementRef, Label, Line};
