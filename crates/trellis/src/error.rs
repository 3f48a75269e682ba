//! Error types for Trellis operations.
//!
//! [`TrellisError`] wraps every failure an [`Editor`](crate::Editor) command
//! can report. All of them are recoverable: a failed command leaves the
//! session as it was.

use std::io;

use thiserror::Error;

use trellis_core::ModelError;

use crate::{document::DocumentError, history::HistoryError, interaction::InteractionError};

/// The main error type for Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Interaction(#[from] InteractionError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
