//! Error type for CLI runs.

use std::io;

use thiserror::Error;

use trellis::{TrellisError, document::DocumentError};

use crate::config::ConfigError;

/// Everything a CLI run can fail with.
///
/// Document errors keep the text they were decoded from so syntax errors
/// can be shown in context.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {err}")]
    Document {
        err: DocumentError,
        src: String,
        path: String,
    },

    #[error(transparent)]
    Trellis(#[from] TrellisError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CliError {
    /// Create a new `Document` error with the text it was decoded from.
    pub fn new_document_error(
        err: DocumentError,
        src: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::Document {
            err,
            src: src.into(),
            path: path.into(),
        }
    }
}
