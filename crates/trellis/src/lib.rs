//! Trellis - the editing core of a UML class-diagram editor.
//!
//! On top of the diagram model from `trellis_core` this crate adds what an
//! interactive editor needs: JSON persistence ([`document`]), snapshot-based
//! undo and redo ([`history`]), the click-driven selection and connect-mode
//! state machine ([`interaction`]), and an [`Editor`] session tying them
//! together.
//!
//! # Examples
//!
//! ```
//! use trellis::{Editor, document, geometry::Point, relation::RelationKind};
//!
//! let mut editor = Editor::default();
//! let animal = editor.add_box("Animal", vec![], vec![], Point::new(50.0, 50.0))?;
//! let dog = editor.add_box("Dog", vec![], vec![], Point::new(300.0, 50.0))?;
//! editor.connect(dog, animal, RelationKind::Inheritance)?;
//!
//! let json = editor.save_string()?;
//! let restored = document::deserialize(&json)?;
//! assert_eq!(&restored, editor.diagram());
//! # Ok::<(), trellis::TrellisError>(())
//! ```

pub mod config;
pub mod document;
pub mod history;
pub mod interaction;

mod editor;
mod error;

pub use trellis_core::{ModelError, geometry, identifier, model, relation, scene};

pub use editor::Editor;
pub use error::TrellisError;
