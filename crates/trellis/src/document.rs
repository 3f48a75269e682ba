//! JSON persistence for diagrams.
//!
//! The persisted format is a single object with three arrays:
//!
//! ```json
//! {
//!   "boxes":  [ { "id": 1, "name": "Animal", "fields": [], "methods": [], "x": 50.0, "y": 50.0 } ],
//!   "lines":  [ { "id": 3, "start": 2, "end": 1, "type": "Inheritance" } ],
//!   "labels": [ { "id": 4, "type": "label", "text": "zoo", "x": 10.0, "y": 10.0 } ]
//! }
//! ```
//!
//! Any of the arrays may be missing. Line ids are optional on input; lines
//! without one receive a fresh id in document order. Output always writes
//! every id, in the diagram's insertion order, so serializing the same
//! diagram twice yields identical text.
//!
//! Loading validates referential integrity and reports every offending entry
//! instead of dropping it.

use std::{fmt, fs, io, path::Path};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use trellis_core::{
    ModelError,
    geometry::Point,
    identifier::ElementId,
    model::{Diagram, ElementKind},
    relation::RelationKind,
};

/// A document that could not be read or written.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Not valid JSON, or JSON that does not match the schema.
    #[error("Malformed document: {0}")]
    Syntax(#[from] serde_json::Error),

    /// Well-formed JSON describing an inconsistent diagram.
    #[error("Malformed document: {}", IssueList(.0))]
    Integrity(Vec<IntegrityIssue>),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One referential-integrity problem found in a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrityIssue {
    #[error("{kind} id {id} is already in use")]
    DuplicateId { id: ElementId, kind: ElementKind },

    #[error("line #{index} ({start} -> {end}): {reason}")]
    InvalidLine {
        index: usize,
        start: ElementId,
        end: ElementId,
        reason: ModelError,
    },

    #[error("{kind} {id} has a non-finite coordinate")]
    NonFinitePosition { id: ElementId, kind: ElementKind },

    #[error("{kind} id {id} is out of range")]
    IdOutOfRange { id: ElementId, kind: ElementKind },
}

impl IntegrityIssue {
    /// Classifies a rejected box or label insertion.
    fn rejected(id: ElementId, kind: ElementKind, err: ModelError) -> Self {
        match err {
            ModelError::NonFinitePosition(_) => Self::NonFinitePosition { id, kind },
            ModelError::IdOutOfRange(_) => Self::IdOutOfRange { id, kind },
            _ => Self::DuplicateId { id, kind },
        }
    }
}

struct IssueList<'a>(&'a [IntegrityIssue]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [single] => write!(f, "{single}"),
            issues => {
                write!(f, "{} problems", issues.len())?;
                for issue in issues {
                    write!(f, "; {issue}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    boxes: Vec<BoxEntry>,
    #[serde(default)]
    lines: Vec<LineEntry>,
    #[serde(default)]
    labels: Vec<LabelEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BoxEntry {
    id: ElementId,
    name: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    methods: Vec<String>,
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct LineEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<ElementId>,
    start: ElementId,
    end: ElementId,
    #[serde(rename = "type")]
    relation: RelationKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct LabelEntry {
    id: ElementId,
    #[serde(rename = "type", default)]
    tag: LabelTag,
    #[serde(default)]
    text: String,
    x: f64,
    y: f64,
}

/// The constant `"type": "label"` marker on label entries.
#[derive(Debug, Default, Serialize, Deserialize)]
enum LabelTag {
    #[default]
    #[serde(rename = "label")]
    Label,
}

impl Document {
    fn from_diagram(diagram: &Diagram) -> Self {
        let boxes = diagram
            .boxes()
            .map(|class_box| BoxEntry {
                id: class_box.id(),
                name: class_box.name().to_string(),
                fields: class_box.fields().to_vec(),
                methods: class_box.methods().to_vec(),
                x: class_box.position().x(),
                y: class_box.position().y(),
            })
            .collect();

        let labels = diagram
            .labels()
            .map(|label| LabelEntry {
                id: label.id(),
                tag: LabelTag::Label,
                text: label.text().to_string(),
                x: label.position().x(),
                y: label.position().y(),
            })
            .collect();

        let lines = diagram
            .lines()
            .map(|line| LineEntry {
                id: Some(line.id()),
                start: line.source(),
                end: line.target(),
                relation: line.relation(),
            })
            .collect();

        Self {
            boxes,
            lines,
            labels,
        }
    }

    fn into_diagram(self) -> Result<Diagram, DocumentError> {
        let mut diagram = Diagram::new();
        let mut issues = Vec::new();

        for entry in self.boxes {
            let position = Point::new(entry.x, entry.y);
            let inserted =
                diagram.insert_box(entry.id, entry.name, entry.fields, entry.methods, position);
            if let Err(err) = inserted {
                issues.push(IntegrityIssue::rejected(entry.id, ElementKind::Box, err));
            }
        }

        for entry in self.labels {
            let position = Point::new(entry.x, entry.y);
            if let Err(err) = diagram.insert_label(entry.id, entry.text, position) {
                issues.push(IntegrityIssue::rejected(entry.id, ElementKind::Label, err));
            }
        }

        // Explicit line ids must win over ids allocated for lines without one.
        // Out-of-range ids are reported when their line is inserted.
        for id in self.lines.iter().filter_map(|entry| entry.id) {
            diagram.reserve_id(id).ok();
        }

        for (index, entry) in self.lines.into_iter().enumerate() {
            match diagram.insert_line(entry.id, entry.start, entry.end, entry.relation) {
                Ok(_) => {}
                Err(ModelError::DuplicateId(id)) => issues.push(IntegrityIssue::DuplicateId {
                    id,
                    kind: ElementKind::Line,
                }),
                Err(ModelError::IdOutOfRange(id)) => issues.push(IntegrityIssue::IdOutOfRange {
                    id,
                    kind: ElementKind::Line,
                }),
                Err(reason) => issues.push(IntegrityIssue::InvalidLine {
                    index,
                    start: entry.start,
                    end: entry.end,
                    reason,
                }),
            }
        }

        if issues.is_empty() {
            Ok(diagram)
        } else {
            Err(DocumentError::Integrity(issues))
        }
    }
}

/// Serializes a diagram to pretty-printed JSON.
///
/// Coordinates are written with full `f64` precision, so a loaded document
/// saves back with the same numbers.
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] if the encoder fails.
pub fn serialize(diagram: &Diagram) -> Result<String, DocumentError> {
    let document = Document::from_diagram(diagram);
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses a diagram from JSON text.
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] for invalid JSON or schema violations
/// (such as an unknown relation type), and [`DocumentError::Integrity`]
/// listing every duplicate or out-of-range id and every line whose
/// endpoints do not resolve to two distinct boxes.
pub fn deserialize(text: &str) -> Result<Diagram, DocumentError> {
    let document: Document = serde_json::from_str(text)?;
    let diagram = document.into_diagram()?;
    debug!(
        boxes = diagram.box_count(),
        lines = diagram.line_count(),
        labels = diagram.label_count();
        "Document decoded"
    );
    Ok(diagram)
}

/// Reads and parses a diagram file.
///
/// # Errors
///
/// Returns [`DocumentError::Io`] if the file cannot be read, otherwise the
/// errors of [`deserialize`].
pub fn read_file(path: impl AsRef<Path>) -> Result<Diagram, DocumentError> {
    let path = path.as_ref();
    info!(path = path.display().to_string(); "Reading diagram");
    let text = fs::read_to_string(path)?;
    deserialize(&text)
}

/// Serializes a diagram and writes it to a file.
///
/// # Errors
///
/// Returns the errors of [`serialize`], or [`DocumentError::Io`] if the file
/// cannot be written.
pub fn write_file(path: impl AsRef<Path>, diagram: &Diagram) -> Result<(), DocumentError> {
    let path = path.as_ref();
    let text = serialize(diagram)?;
    fs::write(path, text)?;
    info!(path = path.display().to_string(); "Diagram written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use trellis_core::ConnectionProblem;

    use super::*;

    fn animal_and_dog() -> Diagram {
        let mut diagram = Diagram::new();
        let animal = diagram
            .add_box(
                "Animal",
                vec!["name: String".to_string()],
                vec!["speak()".to_string()],
                Point::new(50.0, 50.0),
            )
            .unwrap();
        let dog = diagram
            .add_box("Dog", vec![], vec![], Point::new(300.0, 50.0))
            .unwrap();
        diagram
            .connect(dog, animal, RelationKind::Inheritance)
            .unwrap();
        diagram.add_label("zoo", Point::new(10.0, 400.0)).unwrap();
        diagram
    }

    #[test]
    fn test_round_trip() {
        let diagram = animal_and_dog();
        let text = serialize(&diagram).unwrap();
        let restored = deserialize(&text).unwrap();

        assert_eq!(restored, diagram);
        assert_eq!(restored.box_count(), 2);
        assert_eq!(restored.line_count(), 1);
        assert_eq!(
            restored.lines().next().unwrap().relation(),
            RelationKind::Inheritance
        );
        // Re-serializing is byte-for-byte stable.
        assert_eq!(serialize(&restored).unwrap(), text);
    }

    #[test]
    fn test_serialized_shape() {
        let text = serialize(&animal_and_dog()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["boxes"][0]["name"], "Animal");
        assert_eq!(value["boxes"][0]["x"], 50.0);
        assert_eq!(value["lines"][0]["type"], "Inheritance");
        assert_eq!(value["lines"][0]["start"], 2);
        assert_eq!(value["lines"][0]["end"], 1);
        assert_eq!(value["labels"][0]["type"], "label");
        assert_eq!(value["labels"][0]["text"], "zoo");
    }

    #[test]
    fn test_legacy_document_without_line_ids_or_labels() {
        let text = r#"{
            "boxes": [
                {"id": 140234, "name": "A", "fields": [], "methods": [], "x": 10, "y": 20},
                {"id": 140999, "name": "B", "fields": ["x"], "methods": [], "x": 200.5, "y": 20}
            ],
            "lines": [
                {"start": 140234, "end": 140999, "type": "Aggregation"}
            ]
        }"#;

        let diagram = deserialize(text).unwrap();
        let line = diagram.lines().next().unwrap();
        assert_eq!(line.id(), ElementId::new(141000));
        assert_eq!(diagram.label_count(), 0);
        assert_eq!(
            diagram.class_box(ElementId::new(140999)).unwrap().position(),
            Point::new(200.5, 20.0)
        );
    }

    #[test]
    fn test_missing_arrays_mean_empty() {
        let diagram = deserialize("{}").unwrap();
        assert!(diagram.is_empty());
    }

    #[test]
    fn test_dangling_lines_are_all_reported() {
        let text = r#"{
            "boxes": [{"id": 1, "name": "A", "x": 0, "y": 0}],
            "lines": [
                {"start": 1, "end": 2, "type": "Association"},
                {"start": 1, "end": 1, "type": "Dependency"},
                {"start": 9, "end": 1, "type": "Composition"}
            ]
        }"#;

        let Err(DocumentError::Integrity(issues)) = deserialize(text) else {
            panic!("expected an integrity error");
        };

        assert_eq!(issues.len(), 3);
        assert!(matches!(
            &issues[0],
            IntegrityIssue::InvalidLine {
                index: 0,
                reason: ModelError::InvalidConnection {
                    problem: ConnectionProblem::MissingTarget,
                    ..
                },
                ..
            }
        ));
        assert!(matches!(
            &issues[1],
            IntegrityIssue::InvalidLine {
                index: 1,
                reason: ModelError::InvalidConnection {
                    problem: ConnectionProblem::SelfLoop,
                    ..
                },
                ..
            }
        ));
        assert!(matches!(&issues[2], IntegrityIssue::InvalidLine { index: 2, .. }));
    }

    #[test]
    fn test_line_to_label_is_rejected() {
        let text = r#"{
            "boxes": [{"id": 1, "name": "A", "x": 0, "y": 0}],
            "labels": [{"id": 2, "type": "label", "text": "t", "x": 0, "y": 0}],
            "lines": [{"start": 1, "end": 2, "type": "Association"}]
        }"#;
        assert!(matches!(
            deserialize(text),
            Err(DocumentError::Integrity(issues)) if issues.len() == 1
        ));
    }

    #[test]
    fn test_duplicate_ids_across_kinds() {
        let text = r#"{
            "boxes": [{"id": 1, "name": "A", "x": 0, "y": 0}],
            "labels": [{"id": 1, "type": "label", "text": "t", "x": 0, "y": 0}]
        }"#;
        let Err(DocumentError::Integrity(issues)) = deserialize(text) else {
            panic!("expected an integrity error");
        };
        assert_eq!(
            issues,
            vec![IntegrityIssue::DuplicateId {
                id: ElementId::new(1),
                kind: ElementKind::Label,
            }]
        );
    }

    #[test]
    fn test_explicit_line_ids_are_not_stolen() {
        let text = r#"{
            "boxes": [
                {"id": 1, "name": "A", "x": 0, "y": 0},
                {"id": 2, "name": "B", "x": 0, "y": 0}
            ],
            "lines": [
                {"start": 1, "end": 2, "type": "Association"},
                {"id": 3, "start": 2, "end": 1, "type": "Dependency"}
            ]
        }"#;

        let diagram = deserialize(text).unwrap();
        let ids: Vec<u64> = diagram.lines().map(|line| line.id().get()).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn test_schema_violations() {
        let unknown_relation = r#"{"lines": [{"start": 1, "end": 2, "type": "Friendship"}]}"#;
        assert!(matches!(
            deserialize(unknown_relation),
            Err(DocumentError::Syntax(_))
        ));

        let wrong_label_type =
            r#"{"labels": [{"id": 1, "type": "box", "text": "t", "x": 0, "y": 0}]}"#;
        assert!(matches!(
            deserialize(wrong_label_type),
            Err(DocumentError::Syntax(_))
        ));

        assert!(matches!(deserialize("not json"), Err(DocumentError::Syntax(_))));
    }

    #[test]
    fn test_largest_id_is_an_integrity_error() {
        let text = r#"{"boxes": [{"id": 18446744073709551615, "name": "A", "x": 0, "y": 0}]}"#;
        let Err(DocumentError::Integrity(issues)) = deserialize(text) else {
            panic!("expected an integrity error");
        };
        assert_eq!(
            issues,
            vec![IntegrityIssue::IdOutOfRange {
                id: ElementId::new(u64::MAX),
                kind: ElementKind::Box,
            }]
        );

        let text = r#"{
            "boxes": [
                {"id": 1, "name": "A", "x": 0, "y": 0},
                {"id": 2, "name": "B", "x": 0, "y": 0}
            ],
            "lines": [{"id": 18446744073709551615, "start": 1, "end": 2, "type": "Association"}]
        }"#;
        let Err(DocumentError::Integrity(issues)) = deserialize(text) else {
            panic!("expected an integrity error");
        };
        assert_eq!(
            issues,
            vec![IntegrityIssue::IdOutOfRange {
                id: ElementId::new(u64::MAX),
                kind: ElementKind::Line,
            }]
        );
    }

    #[test]
    fn test_id_below_maximum_still_loads() {
        let text = r#"{"labels": [{"id": 18446744073709551614, "text": "edge", "x": 0, "y": 0}]}"#;
        let mut diagram = deserialize(text).unwrap();
        assert_eq!(diagram.label_count(), 1);
        assert_eq!(
            diagram.add_label("more", Point::default()),
            Err(ModelError::IdsExhausted)
        );
    }

    #[test]
    fn test_coordinates_keep_full_precision() {
        let text = r#"{"boxes": [{"id": 1, "name": "A", "x": 123.456789012, "y": -0.1}]}"#;
        let diagram = deserialize(text).unwrap();
        let saved = serialize(&diagram).unwrap();

        let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(value["boxes"][0]["x"].as_f64(), Some(123.456789012));
        assert_eq!(value["boxes"][0]["y"].as_f64(), Some(-0.1));
        assert!(saved.contains("123.456789012"));
    }

    #[test]
    fn test_integrity_message_lists_every_issue() {
        let err = DocumentError::Integrity(vec![
            IntegrityIssue::DuplicateId {
                id: ElementId::new(1),
                kind: ElementKind::Box,
            },
            IntegrityIssue::DuplicateId {
                id: ElementId::new(2),
                kind: ElementKind::Label,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Malformed document: 2 problems; box id 1 is already in use; label id 2 is already in use"
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.json");
        let diagram = animal_and_dog();

        write_file(&path, &diagram).unwrap();
        assert_eq!(read_file(&path).unwrap(), diagram);

        assert!(matches!(
            read_file(dir.path().join("missing.json")),
            Err(DocumentError::Io(_))
        ));
    }
}
