//! Errors raised by diagram model operations.
//!
//! Every failing operation leaves the [`Diagram`](crate::model::Diagram)
//! exactly as it was before the call.

use thiserror::Error;

use crate::{identifier::ElementId, model::ElementKind};

/// Why a connection request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionProblem {
    /// Source and target are the same box.
    SelfLoop,
    /// The source id does not name a box in the diagram.
    MissingSource,
    /// The target id does not name a box in the diagram.
    MissingTarget,
}

impl ConnectionProblem {
    fn describe(self) -> &'static str {
        match self {
            Self::SelfLoop => "a box cannot be connected to itself",
            Self::MissingSource => "source is not a box in this diagram",
            Self::MissingTarget => "target is not a box in this diagram",
        }
    }
}

/// Error type for mutations of the diagram model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid connection {from} -> {to}: {}", .problem.describe())]
    InvalidConnection {
        from: ElementId,
        to: ElementId,
        problem: ConnectionProblem,
    },

    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),

    #[error("Element id {0} is already in use")]
    DuplicateId(ElementId),

    #[error("Element {id} is a {found}, expected a {expected}")]
    WrongKind {
        id: ElementId,
        expected: ElementKind,
        found: ElementKind,
    },

    #[error("Position of a {0} must have finite coordinates")]
    NonFinitePosition(ElementKind),

    #[error("Element id {0} is out of range")]
    IdOutOfRange(ElementId),

    #[error("No element ids left to allocate")]
    IdsExhausted,
}
