//! The [`Diagram`] aggregate and its mutation API.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    error::{ConnectionProblem, ModelError},
    geometry::Point,
    identifier::{ElementId, IdAllocator},
    model::element::{ClassBox, ElementKind, ElementRef, Label, Line},
    relation::RelationKind,
};

/// A class diagram: boxes, the lines between them, and free labels.
///
/// All three element kinds draw their ids from one allocator, so an
/// [`ElementId`] names at most one element of any kind. Each kind is stored in
/// insertion order, which is also the order used when the diagram is saved.
///
/// # Invariants
///
/// 1. Ids are unique across boxes, lines and labels.
/// 2. Every line's source and target name boxes of this diagram, and differ.
/// 3. A line id appears in the incidence list of exactly its two endpoint boxes.
///
/// # Examples
///
/// ```
/// use trellis_core::{geometry::Point, model::Diagram, relation::RelationKind};
///
/// let mut diagram = Diagram::new();
/// let animal = diagram.add_box("Animal", vec![], vec![], Point::new(50.0, 50.0)).unwrap();
/// let dog = diagram.add_box("Dog", vec![], vec![], Point::new(300.0, 50.0)).unwrap();
///
/// let line = diagram.connect(dog, animal, RelationKind::Inheritance).unwrap();
/// assert_eq!(diagram.line(line).unwrap().target(), animal);
///
/// // Deleting an endpoint takes the line with it.
/// let removed = diagram.delete_element(animal).unwrap();
/// assert_eq!(removed, vec![animal, line]);
/// assert_eq!(diagram.line_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    boxes: IndexMap<ElementId, ClassBox>,
    lines: IndexMap<ElementId, Line>,
    labels: IndexMap<ElementId, Label>,
    ids: IdAllocator,
}

impl PartialEq for Diagram {
    /// Structural equality: same elements, regardless of the id allocator cursor.
    fn eq(&self, other: &Self) -> bool {
        self.boxes == other.boxes && self.lines == other.lines && self.labels == other.labels
    }
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    // ====================================================================
    // Creation
    // ====================================================================

    /// Add a class box and return its fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NonFinitePosition`] if either coordinate is NaN
    /// or infinite, and [`ModelError::IdsExhausted`] if no fresh id is left.
    pub fn add_box(
        &mut self,
        name: impl Into<String>,
        fields: Vec<String>,
        methods: Vec<String>,
        position: Point,
    ) -> Result<ElementId, ModelError> {
        check_position(position, ElementKind::Box)?;
        let id = self.ids.allocate()?;
        let class_box = ClassBox::new(id, name.into(), fields, methods, position);
        debug!(id = id.get(), name = class_box.name(); "Box added");
        self.boxes.insert(id, class_box);
        Ok(id)
    }

    /// Add a free-floating label and return its fresh id.
    ///
    /// # Errors
    ///
    /// Same as [`add_box`](Self::add_box).
    pub fn add_label(
        &mut self,
        text: impl Into<String>,
        position: Point,
    ) -> Result<ElementId, ModelError> {
        check_position(position, ElementKind::Label)?;
        let id = self.ids.allocate()?;
        self.labels.insert(id, Label::new(id, text.into(), position));
        debug!(id = id.get(); "Label added");
        Ok(id)
    }

    /// Connect two distinct boxes with a line of the given relation.
    ///
    /// The new line is registered on both endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConnection`] if `source == target` or if
    /// either id does not name a box. The diagram is unchanged on error.
    pub fn connect(
        &mut self,
        source: ElementId,
        target: ElementId,
        relation: RelationKind,
    ) -> Result<ElementId, ModelError> {
        self.check_connection(source, target)?;
        let id = self.ids.allocate()?;
        self.attach(Line::new(id, source, target, relation));
        debug!(id = id.get(), source = source.get(), target = target.get(), relation:?; "Boxes connected");
        Ok(id)
    }

    // ====================================================================
    // Restoring elements with known ids
    // ====================================================================

    /// Insert a box under an existing id, as when loading a saved document.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateId`] if `id` is already used by any
    /// element, [`ModelError::IdOutOfRange`] for `u64::MAX` and
    /// [`ModelError::NonFinitePosition`] for NaN or infinite coordinates.
    pub fn insert_box(
        &mut self,
        id: ElementId,
        name: impl Into<String>,
        fields: Vec<String>,
        methods: Vec<String>,
        position: Point,
    ) -> Result<(), ModelError> {
        check_position(position, ElementKind::Box)?;
        self.claim(id)?;
        let class_box = ClassBox::new(id, name.into(), fields, methods, position);
        self.boxes.insert(id, class_box);
        Ok(())
    }

    /// Insert a label under an existing id, as when loading a saved document.
    ///
    /// # Errors
    ///
    /// Same as [`insert_box`](Self::insert_box).
    pub fn insert_label(
        &mut self,
        id: ElementId,
        text: impl Into<String>,
        position: Point,
    ) -> Result<(), ModelError> {
        check_position(position, ElementKind::Label)?;
        self.claim(id)?;
        self.labels.insert(id, Label::new(id, text.into(), position));
        Ok(())
    }

    /// Insert a line, reusing `id` when given and allocating one otherwise.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`connect`](Self::connect), plus
    /// [`ModelError::DuplicateId`] or [`ModelError::IdOutOfRange`] for a
    /// given `id` and [`ModelError::IdsExhausted`] when allocating one.
    pub fn insert_line(
        &mut self,
        id: Option<ElementId>,
        source: ElementId,
        target: ElementId,
        relation: RelationKind,
    ) -> Result<ElementId, ModelError> {
        self.check_connection(source, target)?;
        let id = match id {
            Some(id) => {
                self.claim(id)?;
                id
            }
            None => self.ids.allocate()?,
        };
        self.attach(Line::new(id, source, target, relation));
        Ok(id)
    }

    /// Keep fresh allocations from ever returning `id`.
    ///
    /// Loaders call this for ids they will insert later, so that elements
    /// inserted without an id in the meantime cannot take them.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IdOutOfRange`] for `u64::MAX`.
    pub fn reserve_id(&mut self, id: ElementId) -> Result<(), ModelError> {
        self.ids.reserve(id)
    }

    // ====================================================================
    // Mutation
    // ====================================================================

    /// Delete any element by id.
    ///
    /// Deleting a box also deletes every line that starts or ends at it, and
    /// unregisters those lines from the box at their other end. Deleting a
    /// line unregisters it from both endpoints. Labels are removed alone.
    ///
    /// Returns the ids of all removed elements, `id` first.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] if nothing has this id.
    pub fn delete_element(&mut self, id: ElementId) -> Result<Vec<ElementId>, ModelError> {
        let mut removed = vec![id];

        if let Some(class_box) = self.boxes.shift_remove(&id) {
            for &line_id in class_box.incident_lines() {
                if let Some(line) = self.lines.shift_remove(&line_id) {
                    let other = if line.source() == id {
                        line.target()
                    } else {
                        line.source()
                    };
                    if let Some(other_box) = self.boxes.get_mut(&other) {
                        other_box.detach_line(line_id);
                    }
                    removed.push(line_id);
                }
            }
        } else if let Some(line) = self.lines.shift_remove(&id) {
            for endpoint in [line.source(), line.target()] {
                if let Some(class_box) = self.boxes.get_mut(&endpoint) {
                    class_box.detach_line(id);
                }
            }
        } else if self.labels.shift_remove(&id).is_none() {
            return Err(ModelError::UnknownElement(id));
        }

        debug!(id = id.get(), removed = removed.len(); "Element deleted");
        Ok(removed)
    }

    /// Remove every element.
    ///
    /// The id cursor is kept, so ids handed out before the clear are never
    /// reissued.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.lines.clear();
        self.labels.clear();
        debug!("Diagram cleared");
    }

    /// Move a box so its top-left corner sits at `position`.
    ///
    /// Lines are not stored with coordinates; [`Diagram::endpoints`] always
    /// reflects the current box positions.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] or [`ModelError::WrongKind`] if
    /// `id` is not a box, and [`ModelError::NonFinitePosition`] for NaN or
    /// infinite coordinates.
    pub fn move_box(&mut self, id: ElementId, position: Point) -> Result<(), ModelError> {
        let class_box = self.box_mut(id)?;
        check_position(position, ElementKind::Box)?;
        class_box.set_position(position);
        trace!(id = id.get(), x = position.x(), y = position.y(); "Box moved");
        Ok(())
    }

    /// Replace a box's name, fields and methods in one step.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] or [`ModelError::WrongKind`] if
    /// `id` is not a box.
    pub fn edit_box(
        &mut self,
        id: ElementId,
        name: impl Into<String>,
        fields: Vec<String>,
        methods: Vec<String>,
    ) -> Result<(), ModelError> {
        self.box_mut(id)?.replace_content(name.into(), fields, methods);
        debug!(id = id.get(); "Box edited");
        Ok(())
    }

    /// Replace a label's text.
    ///
    /// An empty `text` means no change was requested and leaves the label as it is.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] or [`ModelError::WrongKind`] if
    /// `id` is not a label.
    pub fn edit_label(&mut self, id: ElementId, text: impl Into<String>) -> Result<(), ModelError> {
        let text = text.into();
        if let Some(found) = self.kind_of(id).filter(|kind| *kind != ElementKind::Label) {
            return Err(ModelError::WrongKind {
                id,
                expected: ElementKind::Label,
                found,
            });
        }
        let label = self
            .labels
            .get_mut(&id)
            .ok_or(ModelError::UnknownElement(id))?;
        if !text.is_empty() {
            label.set_text(text);
            debug!(id = id.get(); "Label edited");
        }
        Ok(())
    }

    // ====================================================================
    // Queries
    // ====================================================================

    /// Look up any element by id.
    pub fn element(&self, id: ElementId) -> Option<ElementRef<'_>> {
        if let Some(class_box) = self.boxes.get(&id) {
            Some(ElementRef::Box(class_box))
        } else if let Some(line) = self.lines.get(&id) {
            Some(ElementRef::Line(line))
        } else {
            self.labels.get(&id).map(ElementRef::Label)
        }
    }

    /// Get the kind of the element with this id, if any.
    pub fn kind_of(&self, id: ElementId) -> Option<ElementKind> {
        self.element(id).map(|element| element.kind())
    }

    /// Returns true if any element has this id.
    pub fn contains(&self, id: ElementId) -> bool {
        self.boxes.contains_key(&id) || self.lines.contains_key(&id) || self.labels.contains_key(&id)
    }

    /// Get a box by id.
    pub fn class_box(&self, id: ElementId) -> Option<&ClassBox> {
        self.boxes.get(&id)
    }

    /// Get a line by id.
    pub fn line(&self, id: ElementId) -> Option<&Line> {
        self.lines.get(&id)
    }

    /// Get a label by id.
    pub fn label(&self, id: ElementId) -> Option<&Label> {
        self.labels.get(&id)
    }

    /// Iterate boxes in insertion order.
    pub fn boxes(&self) -> impl Iterator<Item = &ClassBox> {
        self.boxes.values()
    }

    /// Iterate lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    /// Iterate labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    /// Iterate the lines touching a box; empty if `box_id` is not a box.
    pub fn incident_lines(&self, box_id: ElementId) -> impl Iterator<Item = &Line> {
        self.boxes
            .get(&box_id)
            .map(ClassBox::incident_lines)
            .unwrap_or_default()
            .iter()
            .filter_map(|line_id| self.lines.get(line_id))
    }

    /// Number of boxes.
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of labels.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Total number of elements of all kinds.
    pub fn len(&self) -> usize {
        self.boxes.len() + self.lines.len() + self.labels.len()
    }

    /// Returns true if the diagram has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn check_connection(&self, source: ElementId, target: ElementId) -> Result<(), ModelError> {
        let problem = if source == target {
            Some(ConnectionProblem::SelfLoop)
        } else if !self.boxes.contains_key(&source) {
            Some(ConnectionProblem::MissingSource)
        } else if !self.boxes.contains_key(&target) {
            Some(ConnectionProblem::MissingTarget)
        } else {
            None
        };

        match problem {
            Some(problem) => Err(ModelError::InvalidConnection {
                from: source,
                to: target,
                problem,
            }),
            None => Ok(()),
        }
    }

    /// Store a validated line and register it on both endpoints.
    fn attach(&mut self, line: Line) {
        for endpoint in [line.source(), line.target()] {
            if let Some(class_box) = self.boxes.get_mut(&endpoint) {
                class_box.attach_line(line.id());
            }
        }
        self.lines.insert(line.id(), line);
    }

    fn claim(&mut self, id: ElementId) -> Result<(), ModelError> {
        if self.contains(id) {
            return Err(ModelError::DuplicateId(id));
        }
        self.ids.reserve(id)
    }

    fn box_mut(&mut self, id: ElementId) -> Result<&mut ClassBox, ModelError> {
        if let Some(found) = self.kind_of(id).filter(|kind| *kind != ElementKind::Box) {
            return Err(ModelError::WrongKind {
                id,
                expected: ElementKind::Box,
                found,
            });
        }
        self.boxes
            .get_mut(&id)
            .ok_or(ModelError::UnknownElement(id))
    }
}

fn check_position(position: Point, kind: ElementKind) -> Result<(), ModelError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(ModelError::NonFinitePosition(kind))
    }
}
