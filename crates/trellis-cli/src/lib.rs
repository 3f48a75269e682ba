//! CLI logic for the Trellis diagram tool.
//!
//! Each subcommand loads one diagram document, validates it, and then
//! reports on it, rewrites it, or projects it into a renderer scene.

pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::{Args, Command};
pub use config::ConfigError;
pub use error::CliError;

use std::{fs, io::Write};

use log::info;
use serde::Serialize;

use trellis::{Editor, TrellisError, config::AppConfig, model::Diagram};

/// Element counts reported by `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub boxes: usize,
    pub lines: usize,
    pub labels: usize,
}

impl Summary {
    fn of(diagram: &Diagram) -> Self {
        Self {
            boxes: diagram.box_count(),
            lines: diagram.line_count(),
            labels: diagram.label_count(),
        }
    }
}

/// Run the Trellis CLI application
///
/// # Errors
///
/// Returns [`CliError`] for:
/// - Configuration loading errors
/// - File I/O errors
/// - Malformed documents
/// - Output encoding errors
pub fn run(args: &Args) -> Result<(), CliError> {
    let file = args.command.file();
    info!(input_path = file; "Processing diagram");

    let app_config = config::load_config(args.config.as_ref())?;
    let editor = load(file, app_config)?;

    match &args.command {
        Command::Check { json, .. } => {
            let summary = Summary::of(editor.diagram());
            let report = if *json {
                serde_json::to_string(&summary)?
            } else {
                format!(
                    "{file}: {} boxes, {} lines, {} labels",
                    summary.boxes, summary.lines, summary.labels
                )
            };
            writeln!(std::io::stdout(), "{report}")?;
            info!(boxes = summary.boxes, lines = summary.lines, labels = summary.labels; "Document is valid");
        }
        Command::Format { output, .. } => {
            let target = output.as_deref().unwrap_or(file);
            editor.save_file(target)?;
            info!(output_file = target; "Document formatted");
        }
        Command::Scene { output, .. } => {
            let scene = serde_json::to_string_pretty(&editor.scene())?;
            match output {
                Some(path) => {
                    fs::write(path, scene)?;
                    info!(output_file = path; "Scene exported");
                }
                None => writeln!(std::io::stdout(), "{scene}")?,
            }
        }
    }

    Ok(())
}

/// Read a document into a fresh editing session.
fn load(path: &str, config: AppConfig) -> Result<Editor, CliError> {
    let src = fs::read_to_string(path)?;
    let mut editor = Editor::new(config);
    match editor.load_str(&src) {
        Ok(()) => Ok(editor),
        Err(TrellisError::Document(err)) => Err(CliError::new_document_error(err, src, path)),
        Err(err) => Err(err.into()),
    }
}
