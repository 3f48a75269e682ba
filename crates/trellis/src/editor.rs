//! An editing session: one diagram with its selection and undo history.

use std::path::Path;

use log::{debug, info};

use trellis_core::{
    ModelError,
    geometry::Point,
    identifier::ElementId,
    model::{Diagram, ElementKind},
    relation::RelationKind,
    scene::Scene,
};

use crate::{
    config::AppConfig,
    document,
    error::TrellisError,
    history::HistoryEngine,
    interaction::{ClickOutcome, Controller, Mode},
};

/// An editing session.
///
/// Every command that changes the diagram is recorded as one undo step, and
/// only if it actually changed something. Failed commands leave the diagram,
/// the selection and the history untouched.
///
/// # Examples
///
/// ```
/// use trellis::{Editor, geometry::Point, relation::RelationKind};
///
/// let mut editor = Editor::default();
/// let animal = editor.add_box("Animal", vec![], vec![], Point::new(50.0, 50.0)).unwrap();
/// let dog = editor.add_box("Dog", vec![], vec![], Point::new(300.0, 50.0)).unwrap();
/// editor.connect(dog, animal, RelationKind::Inheritance).unwrap();
///
/// assert_eq!(editor.history().undo_depth(), 3);
/// editor.undo().unwrap();
/// assert_eq!(editor.diagram().line_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Editor {
    diagram: Diagram,
    controller: Controller,
    history: HistoryEngine,
    config: AppConfig,
    dragging: Option<ElementId>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Editor {
    /// Start a session on an empty diagram.
    pub fn new(config: AppConfig) -> Self {
        Self {
            diagram: Diagram::new(),
            controller: Controller::new(),
            history: HistoryEngine::new(config.history().max_depth()),
            config,
            dragging: None,
        }
    }

    /// The diagram being edited.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Selection and connect-mode state.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Undo and redo stacks of this session.
    pub fn history(&self) -> &HistoryEngine {
        &self.history
    }

    /// Configuration the session was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shorthand for the controller's current selection.
    pub fn selected(&self) -> Option<ElementId> {
        self.controller.selected()
    }

    /// Renderer-facing projection using the configured canvas settings.
    pub fn scene(&self) -> Scene<'_> {
        let canvas = self.config.canvas();
        self.diagram
            .scene(canvas.box_metrics(), canvas.arrow_size())
    }

    // ====================================================================
    // Element commands
    // ====================================================================

    /// Add a box at `position`.
    ///
    /// Fails without recording anything if a coordinate is NaN or infinite.
    pub fn add_box(
        &mut self,
        name: impl Into<String>,
        fields: Vec<String>,
        methods: Vec<String>,
        position: Point,
    ) -> Result<ElementId, TrellisError> {
        let name = name.into();
        self.record(|diagram| Ok(diagram.add_box(name, fields, methods, position)?))
    }

    /// Add an empty box with the configured default name and position.
    pub fn add_default_box(&mut self) -> Result<ElementId, TrellisError> {
        let defaults = self.config.defaults();
        let (name, position) = (defaults.box_name().to_string(), defaults.box_position());
        self.add_box(name, vec![], vec![], position)
    }

    pub fn add_label(
        &mut self,
        text: impl Into<String>,
        position: Point,
    ) -> Result<ElementId, TrellisError> {
        let text = text.into();
        self.record(|diagram| Ok(diagram.add_label(text, position)?))
    }

    pub fn connect(
        &mut self,
        source: ElementId,
        target: ElementId,
        relation: RelationKind,
    ) -> Result<ElementId, TrellisError> {
        self.record(|diagram| Ok(diagram.connect(source, target, relation)?))
    }

    pub fn edit_box(
        &mut self,
        id: ElementId,
        name: impl Into<String>,
        fields: Vec<String>,
        methods: Vec<String>,
    ) -> Result<(), TrellisError> {
        let name = name.into();
        self.record(|diagram| Ok(diagram.edit_box(id, name, fields, methods)?))
    }

    /// Replace a label's text; empty text changes nothing and records nothing.
    pub fn edit_label(&mut self, id: ElementId, text: impl Into<String>) -> Result<(), TrellisError> {
        let text = text.into();
        self.record(|diagram| Ok(diagram.edit_label(id, text)?))
    }

    /// Delete an element and everything that depends on it.
    ///
    /// Returns the removed ids; the selection forgets any of them.
    pub fn delete(&mut self, id: ElementId) -> Result<Vec<ElementId>, TrellisError> {
        let removed = self.record(|diagram| Ok(diagram.delete_element(id)?))?;
        self.controller.forget(&removed);
        if self.dragging.is_some_and(|dragged| removed.contains(&dragged)) {
            self.dragging = None;
        }
        Ok(removed)
    }

    /// Delete the selected element, if any.
    pub fn delete_selected(&mut self) -> Result<Option<Vec<ElementId>>, TrellisError> {
        self.controller
            .selected()
            .map(|id| self.delete(id))
            .transpose()
    }

    /// Remove every element. Undoable like any other edit.
    ///
    /// Ids issued before the clear are not handed out again.
    pub fn clear(&mut self) -> Result<(), TrellisError> {
        self.record(|diagram| {
            diagram.clear();
            Ok(())
        })?;
        self.controller.retain_existing(&self.diagram);
        self.dragging = None;
        info!("Diagram cleared");
        Ok(())
    }

    // ====================================================================
    // Dragging
    // ====================================================================

    /// Start dragging a box. The whole drag becomes one undo step.
    pub fn begin_move(&mut self, id: ElementId) -> Result<(), TrellisError> {
        self.expect_box(id)?;
        self.history.begin_recording(&self.diagram)?;
        self.dragging = Some(id);
        Ok(())
    }

    /// Move a box so its top-left corner sits at `position`.
    ///
    /// Between [`begin_move`](Self::begin_move) and
    /// [`end_move`](Self::end_move) this is one step of the drag; otherwise
    /// the move is recorded on its own.
    pub fn move_box(&mut self, id: ElementId, position: Point) -> Result<(), TrellisError> {
        if self.dragging.is_some() {
            self.diagram.move_box(id, position)?;
            Ok(())
        } else {
            self.record(|diagram| Ok(diagram.move_box(id, position)?))
        }
    }

    /// Finish a drag. Returns `true` if an undo step was recorded.
    pub fn end_move(&mut self) -> Result<bool, TrellisError> {
        if self.dragging.take().is_none() {
            return Ok(false);
        }
        Ok(self.history.commit_recording(&self.diagram)?)
    }

    // ====================================================================
    // Selection and connect mode
    // ====================================================================

    /// Handle a click on an element, or on empty canvas when `None`.
    ///
    /// A click that completes a connection is recorded as one undo step.
    pub fn click(&mut self, target: Option<ElementId>) -> Result<ClickOutcome, TrellisError> {
        if self.controller.mode() != Mode::AwaitingTarget {
            return Ok(self.controller.click(&mut self.diagram, target)?);
        }

        self.history.begin_recording(&self.diagram)?;
        match self.controller.click(&mut self.diagram, target) {
            Ok(outcome) => {
                self.history.commit_recording(&self.diagram)?;
                Ok(outcome)
            }
            Err(err) => {
                self.history.cancel_recording();
                Err(err.into())
            }
        }
    }

    pub fn toggle_connect_mode(&mut self) -> Mode {
        self.controller.toggle_connect_mode()
    }

    /// Choose the relation used for lines created by clicks.
    pub fn set_relation(&mut self, relation: RelationKind) {
        self.controller.set_relation(relation);
    }

    // ====================================================================
    // History
    // ====================================================================

    pub fn undo(&mut self) -> Result<(), TrellisError> {
        self.dragging = None;
        self.history.undo(&mut self.diagram)?;
        self.controller.retain_existing(&self.diagram);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), TrellisError> {
        self.dragging = None;
        self.history.redo(&mut self.diagram)?;
        self.controller.retain_existing(&self.diagram);
        Ok(())
    }

    // ====================================================================
    // Persistence
    // ====================================================================

    /// Replace the diagram with one parsed from JSON text.
    ///
    /// The replacement is undoable. A malformed document leaves the session
    /// untouched.
    pub fn load_str(&mut self, text: &str) -> Result<(), TrellisError> {
        let loaded = document::deserialize(text)?;
        self.replace(loaded)
    }

    /// Replace the diagram with the contents of a file; see [`load_str`](Self::load_str).
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), TrellisError> {
        let loaded = document::read_file(path)?;
        self.replace(loaded)
    }

    pub fn save_string(&self) -> Result<String, TrellisError> {
        Ok(document::serialize(&self.diagram)?)
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), TrellisError> {
        document::write_file(path, &self.diagram)?;
        Ok(())
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn replace(&mut self, loaded: Diagram) -> Result<(), TrellisError> {
        self.record(|diagram| {
            *diagram = loaded;
            Ok(())
        })?;
        self.dragging = None;
        self.controller.retain_existing(&self.diagram);
        debug!(elements = self.diagram.len(); "Diagram replaced");
        Ok(())
    }

    /// Run `edit` as one undo step, recorded only if it succeeds and changes something.
    fn record<T>(
        &mut self,
        edit: impl FnOnce(&mut Diagram) -> Result<T, TrellisError>,
    ) -> Result<T, TrellisError> {
        self.history.begin_recording(&self.diagram)?;
        match edit(&mut self.diagram) {
            Ok(value) => {
                self.history.commit_recording(&self.diagram)?;
                Ok(value)
            }
            Err(err) => {
                self.history.cancel_recording();
                Err(err)
            }
        }
    }

    fn expect_box(&self, id: ElementId) -> Result<(), ModelError> {
        match self.diagram.kind_of(id) {
            Some(ElementKind::Box) => Ok(()),
            Some(found) => Err(ModelError::WrongKind {
                id,
                expected: ElementKind::Box,
                found,
            }),
            None => Err(ModelError::UnknownElement(id)),
        }
    }
}
