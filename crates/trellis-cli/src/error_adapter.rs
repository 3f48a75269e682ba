//! Error adapter for converting CliError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! A document that fails integrity checks reports every offending entry;
//! each one is rendered as its own diagnostic.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};
use serde_json::error::Category;

use trellis::document::{DocumentError, IntegrityIssue};

use crate::{config::ConfigError, error::CliError};

/// Adapter for a JSON syntax or schema error, pointing into the document text.
pub struct SyntaxAdapter<'a> {
    err: &'a serde_json::Error,
    src: &'a str,
    path: &'a str,
}

impl<'a> SyntaxAdapter<'a> {
    pub fn new(err: &'a serde_json::Error, src: &'a str, path: &'a str) -> Self {
        Self { err, src, path }
    }

    fn span(&self) -> SourceSpan {
        let offset = line_column_to_offset(self.src, self.err.line(), self.err.column());
        let len = usize::from(offset < self.src.len());
        SourceSpan::new(offset.into(), len)
    }
}

impl fmt::Debug for SyntaxAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxAdapter")
            .field("err", &self.err)
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for SyntaxAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: malformed document", self.path)
    }
}

impl std::error::Error for SyntaxAdapter<'_> {}

impl MietteDiagnostic for SyntaxAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("trellis::malformed_document"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(syntax_help(self.err)))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_primary_with_span(Some(self.err.to_string()), self.span());
        Some(Box::new(std::iter::once(label)))
    }
}

/// Picks a hint matching what `serde_json` complained about.
fn syntax_help(err: &serde_json::Error) -> &'static str {
    if err.classify() != Category::Data {
        return "the document must be a JSON object with boxes, lines and labels arrays";
    }
    let message = err.to_string();
    if message.contains("unknown variant") {
        if message.contains("`Association`") {
            "relation types are Association, Inheritance, Realization, Dependency, Aggregation or Composition"
        } else {
            "label entries are tagged with \"type\": \"label\""
        }
    } else if message.contains("missing field") {
        "boxes need id, name, x and y; lines need start, end and type; labels need id, x and y"
    } else {
        "ids are unsigned integers, coordinates are numbers and names, fields, methods and texts are strings"
    }
}

/// Adapter for one referential-integrity problem.
#[derive(Debug)]
pub struct IssueAdapter<'a> {
    issue: &'a IntegrityIssue,
    path: &'a str,
}

impl<'a> IssueAdapter<'a> {
    pub fn new(issue: &'a IntegrityIssue, path: &'a str) -> Self {
        Self { issue, path }
    }
}

impl fmt::Display for IssueAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.issue)
    }
}

impl std::error::Error for IssueAdapter<'_> {}

impl MietteDiagnostic for IssueAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("trellis::malformed_document"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.issue {
            IntegrityIssue::DuplicateId { .. } => {
                "ids are shared by boxes, lines and labels and must be unique"
            }
            IntegrityIssue::InvalidLine { .. } => {
                "every line must join two different boxes listed in `boxes`"
            }
            IntegrityIssue::NonFinitePosition { .. } => "coordinates must be finite numbers",
            IntegrityIssue::IdOutOfRange { .. } => {
                "ids must be below 18446744073709551615 so that fresh ids remain"
            }
        };
        Some(Box::new(help))
    }
}

/// Adapter for [`CliError`] variants without document context.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CliError::Document { .. } => "trellis::malformed_document",
            CliError::Trellis(_) => "trellis::editor",
            CliError::Config(_) => "trellis::config",
            CliError::Io(_) => "trellis::io",
            CliError::Encode(_) => "trellis::encode",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            CliError::Config(ConfigError::Parse(_) | ConfigError::Validation(_)) => Some(Box::new(
                "see the [history], [canvas] and [defaults] sections of the configuration",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A JSON error with a location in the document.
    Syntax(SyntaxAdapter<'a>),
    /// One integrity problem of a well-formed document.
    Issue(IssueAdapter<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Syntax(s) => fmt::Display::fmt(s, f),
            Reportable::Issue(i) => fmt::Display::fmt(i, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Syntax(_) | Reportable::Issue(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Syntax(s) => s.code(),
            Reportable::Issue(i) => i.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Syntax(s) => s.help(),
            Reportable::Issue(i) => i.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Syntax(s) => s.source_code(),
            Reportable::Issue(i) => i.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Syntax(s) => s.labels(),
            Reportable::Issue(i) => i.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Byte offset of a 1-based line and column as reported by `serde_json`.
///
/// Positions past the end clamp to the end of `src`.
fn line_column_to_offset(src: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}

/// Convert a [`CliError`] into a list of reportable errors.
///
/// An integrity failure yields one [`Reportable`] per issue; every other
/// error yields a single one.
pub fn to_reportables(err: &CliError) -> Vec<Reportable<'_>> {
    match err {
        CliError::Document {
            err: DocumentError::Syntax(json_err),
            src,
            path,
        } => vec![Reportable::Syntax(SyntaxAdapter::new(json_err, src, path))],
        CliError::Document {
            err: DocumentError::Integrity(issues),
            path,
            ..
        } => issues
            .iter()
            .map(|issue| Reportable::Issue(IssueAdapter::new(issue, path)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use trellis::document;

    use super::*;

    fn document_error(src: &str) -> CliError {
        let err = document::deserialize(src).unwrap_err();
        CliError::new_document_error(err, src, "test.json")
    }

    #[test]
    fn test_syntax_error_points_at_location() {
        let src = "{\n  \"boxes\": [\n    {\"id\": 1,, }\n  ]\n}";
        let err = document_error(src);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        let Reportable::Syntax(adapter) = &reportables[0] else {
            panic!("Expected Syntax");
        };
        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        // The label sits on the third line, where the stray comma is.
        assert_eq!(src[..labels[0].offset()].matches('\n').count(), 2);
        assert_eq!(
            adapter.code().unwrap().to_string(),
            "trellis::malformed_document"
        );
    }

    fn syntax_help_for(src: &str) -> String {
        let err = document_error(src);
        let reportables = to_reportables(&err);
        let Reportable::Syntax(adapter) = &reportables[0] else {
            panic!("Expected Syntax");
        };
        adapter.help().unwrap().to_string()
    }

    #[test]
    fn test_syntax_help_matches_the_problem() {
        let missing_name = syntax_help_for(r#"{"boxes": [{"id": 1, "x": 0, "y": 0}]}"#);
        assert!(missing_name.starts_with("boxes need id, name"));
        assert!(!missing_name.contains("relation types"));

        let unknown_relation =
            syntax_help_for(r#"{"lines": [{"start": 1, "end": 2, "type": "Friendship"}]}"#);
        assert!(unknown_relation.starts_with("relation types are"));

        let wrong_tag = syntax_help_for(
            r#"{"labels": [{"id": 1, "type": "box", "text": "t", "x": 0, "y": 0}]}"#,
        );
        assert!(wrong_tag.contains("\"type\": \"label\""));

        let wrong_type =
            syntax_help_for(r#"{"boxes": [{"id": "one", "name": "A", "x": 0, "y": 0}]}"#);
        assert!(wrong_type.starts_with("ids are unsigned integers"));

        let not_json = syntax_help_for("{ not json");
        assert!(not_json.starts_with("the document must be a JSON object"));
    }

    #[test]
    fn test_largest_id_is_reported_as_issue() {
        let err = document_error(
            r#"{"boxes": [{"id": 18446744073709551615, "name": "A", "x": 0, "y": 0}]}"#,
        );

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        let Reportable::Issue(adapter) = &reportables[0] else {
            panic!("Expected Issue");
        };
        assert_eq!(
            adapter.to_string(),
            "test.json: box id 18446744073709551615 is out of range"
        );
        assert!(adapter.help().is_some());
    }

    #[test]
    fn test_one_reportable_per_issue() {
        let err = document_error(
            r#"{
                "boxes": [{"id": 1, "name": "A", "x": 0, "y": 0}],
                "lines": [
                    {"start": 1, "end": 5, "type": "Association"},
                    {"start": 1, "end": 1, "type": "Association"}
                ]
            }"#,
        );

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 2);
        assert!(reportables[0].to_string().starts_with("test.json: line #0"));
        assert!(reportables[1].to_string().starts_with("test.json: line #1"));
        assert!(reportables.iter().all(|r| matches!(r, Reportable::Issue(_))));
    }

    #[test]
    fn test_non_document_error() {
        let err = CliError::Config(ConfigError::Validation("bad".to_string()));

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Validation error: bad");
                assert_eq!(e.code().unwrap().to_string(), "trellis::config");
                assert!(e.help().is_some());
            }
            other => panic!("Expected Error, got {other:?}"),
        }
    }

    #[test]
    fn test_line_column_to_offset() {
        let src = "ab\ncde\nf";
        assert_eq!(line_column_to_offset(src, 1, 1), 0);
        assert_eq!(line_column_to_offset(src, 2, 2), 4);
        assert_eq!(line_column_to_offset(src, 3, 1), 7);
        assert_eq!(line_column_to_offset(src, 9, 9), src.len());
        assert_eq!(line_column_to_offset(src, 0, 0), 0);
    }
}
