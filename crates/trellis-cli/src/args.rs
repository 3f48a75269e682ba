//! Command-line argument definitions for the Trellis CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects what to do with a diagram document;
//! the configuration file and logging verbosity apply to all of them.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Trellis diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

/// What to do with the input document.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate a document, then print a summary
    Check {
        /// Path to the diagram document (JSON)
        file: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a document in canonical form
    Format {
        /// Path to the diagram document (JSON)
        file: String,

        /// Write here instead of rewriting the input in place
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Emit the renderer-facing scene of a document as JSON
    Scene {
        /// Path to the diagram document (JSON)
        file: String,

        /// Write here instead of standard output
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Command {
    /// Path of the document this command reads.
    pub fn file(&self) -> &str {
        match self {
            Self::Check { file, .. } | Self::Format { file, .. } | Self::Scene { file, .. } => file,
        }
    }
}
