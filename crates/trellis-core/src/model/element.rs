//! Element types owned by a [`Diagram`](super::Diagram).

use std::fmt;

use crate::{geometry::Point, identifier::ElementId, relation::RelationKind};

/// A class node with a name, field and method compartments.
///
/// Besides its content a box remembers the ids of every line touching it, so
/// that moving or deleting the box reaches its lines without a full scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBox {
    id: ElementId,
    name: String,
    fields: Vec<String>,
    methods: Vec<String>,
    position: Point,
    lines: Vec<ElementId>,
}

impl ClassBox {
    pub(super) fn new(
        id: ElementId,
        name: String,
        fields: Vec<String>,
        methods: Vec<String>,
        position: Point,
    ) -> Self {
        Self {
            id,
            name,
            fields,
            methods,
            position,
            lines: Vec::new(),
        }
    }

    /// Get the box identifier.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Get the class name shown in the header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the field compartment entries, in display order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Get the method compartment entries, in display order.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Get the top-left anchor of the box.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Ids of the lines that start or end at this box, oldest first.
    pub fn incident_lines(&self) -> &[ElementId] {
        &self.lines
    }

    pub(super) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(super) fn replace_content(&mut self, name: String, fields: Vec<String>, methods: Vec<String>) {
        self.name = name;
        self.fields = fields;
        self.methods = methods;
    }

    pub(super) fn attach_line(&mut self, line: ElementId) {
        self.lines.push(line);
    }

    pub(super) fn detach_line(&mut self, line: ElementId) {
        self.lines.retain(|id| *id != line);
    }
}

/// A directed, typed relationship between two boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    id: ElementId,
    source: ElementId,
    target: ElementId,
    relation: RelationKind,
}

impl Line {
    pub(super) fn new(
        id: ElementId,
        source: ElementId,
        target: ElementId,
        relation: RelationKind,
    ) -> Self {
        Self {
            id,
            source,
            target,
            relation,
        }
    }

    /// Get the line identifier.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Get the id of the box the line starts at.
    pub fn source(&self) -> ElementId {
        self.source
    }

    /// Get the id of the box the line points to.
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// Get the relationship this line expresses.
    pub fn relation(&self) -> RelationKind {
        self.relation
    }

    /// Returns true if `box_id` is either endpoint.
    pub fn touches(&self, box_id: ElementId) -> bool {
        self.source == box_id || self.target == box_id
    }
}

/// A free-floating text annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    id: ElementId,
    text: String,
    position: Point,
}

impl Label {
    pub(super) fn new(id: ElementId, text: String, position: Point) -> Self {
        Self { id, text, position }
    }

    /// Get the label identifier.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Get the annotation text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the anchor position of the label.
    pub fn position(&self) -> Point {
        self.position
    }

    pub(super) fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

/// Discriminator shared by all element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Box,
    Line,
    Label,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Box => "box",
            Self::Line => "line",
            Self::Label => "label",
        };
        f.write_str(name)
    }
}

/// Borrowed view of any element in a diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementRef<'a> {
    Box(&'a ClassBox),
    Line(&'a Line),
    Label(&'a Label),
}

impl ElementRef<'_> {
    /// Get the element identifier.
    pub fn id(&self) -> ElementId {
        match self {
            Self::Box(class_box) => class_box.id(),
            Self::Line(line) => line.id(),
            Self::Label(label) => label.id(),
        }
    }

    /// Get the element kind.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Box(_) => ElementKind::Box,
            Self::Line(_) => ElementKind::Line,
            Self::Label(_) => ElementKind::Label,
        }
    }
}
