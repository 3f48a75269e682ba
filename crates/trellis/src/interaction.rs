//! Selection and connect-mode state machine.
//!
//! The controller turns clicks on the canvas into selection changes or new
//! lines. It never draws; callers pass in which element (if any) sits under
//! the pointer and react to the returned [`ClickOutcome`].
//!
//! ```text
//!            toggle                 click box
//!   Idle ─────────────► AwaitingSource ─────────► AwaitingTarget
//!    ▲                        ▲                        │
//!    │        toggle          │  click other box       │
//!    └────────────────────────┴──── (line created) ◄───┘
//! ```

use log::{debug, trace};
use thiserror::Error;

use trellis_core::{
    ModelError,
    identifier::ElementId,
    model::{Diagram, ElementKind},
    relation::RelationKind,
};

/// Error type for click handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("Cannot connect box {0} to itself")]
    SelfConnection(ElementId),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Where the controller is in the connect flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal selection mode.
    Idle,
    /// Connect mode, waiting for the source box.
    AwaitingSource,
    /// Connect mode, source captured, waiting for the target box.
    AwaitingTarget,
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(ElementId),
    Deselected,
    SourceCaptured(ElementId),
    Connected(ElementId),
    Ignored,
}

/// Selection, connect mode and the relation used for new lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controller {
    selected: Option<ElementId>,
    connect_mode: bool,
    pending_source: Option<ElementId>,
    relation: RelationKind,
}

impl Controller {
    /// Idle controller with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of the connect-mode state machine.
    pub fn mode(&self) -> Mode {
        match (self.connect_mode, self.pending_source) {
            (false, _) => Mode::Idle,
            (true, None) => Mode::AwaitingSource,
            (true, Some(_)) => Mode::AwaitingTarget,
        }
    }

    /// The selected element, if any.
    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    /// Source box captured by the first click in connect mode.
    pub fn pending_source(&self) -> Option<ElementId> {
        self.pending_source
    }

    /// Returns true in either connect-mode state.
    pub fn is_connect_mode(&self) -> bool {
        self.connect_mode
    }

    /// Relation used for lines created by clicks.
    pub fn relation(&self) -> RelationKind {
        self.relation
    }

    pub fn set_relation(&mut self, relation: RelationKind) {
        self.relation = relation;
    }

    /// Enter or leave connect mode.
    ///
    /// Entering clears the selection; either direction forgets any captured
    /// source. Returns the new mode.
    pub fn toggle_connect_mode(&mut self) -> Mode {
        self.connect_mode = !self.connect_mode;
        self.pending_source = None;
        if self.connect_mode {
            self.selected = None;
        }
        debug!(connect_mode = self.connect_mode; "Connect mode toggled");
        self.mode()
    }

    /// Handle a click on `target`, or on empty canvas when `None`.
    ///
    /// In [`Mode::AwaitingTarget`] a click on a second box connects the two
    /// with the current relation and returns to [`Mode::AwaitingSource`], so
    /// several lines can be drawn in a row.
    ///
    /// # Errors
    ///
    /// Returns [`InteractionError::SelfConnection`] when the target is the
    /// captured source; the controller and diagram are unchanged. Model
    /// errors from connecting are passed through the same way.
    pub fn click(
        &mut self,
        diagram: &mut Diagram,
        target: Option<ElementId>,
    ) -> Result<ClickOutcome, InteractionError> {
        let kind = target.and_then(|id| diagram.kind_of(id));

        let outcome = match (self.mode(), target, kind) {
            (Mode::Idle, Some(id), Some(_)) => {
                self.selected = Some(id);
                ClickOutcome::Selected(id)
            }
            (Mode::Idle, _, _) => {
                self.selected = None;
                ClickOutcome::Deselected
            }
            (Mode::AwaitingSource, Some(id), Some(ElementKind::Box)) => {
                self.pending_source = Some(id);
                ClickOutcome::SourceCaptured(id)
            }
            (Mode::AwaitingTarget, Some(id), Some(ElementKind::Box)) => {
                let source = self.pending_source.ok_or(ModelError::UnknownElement(id))?;
                if source == id {
                    return Err(InteractionError::SelfConnection(id));
                }
                let line = diagram.connect(source, id, self.relation)?;
                self.pending_source = None;
                ClickOutcome::Connected(line)
            }
            (Mode::AwaitingSource | Mode::AwaitingTarget, _, _) => ClickOutcome::Ignored,
        };

        trace!(outcome:?; "Click handled");
        Ok(outcome)
    }

    /// Drop references to removed elements.
    pub fn forget(&mut self, removed: &[ElementId]) {
        if self.selected.is_some_and(|id| removed.contains(&id)) {
            self.selected = None;
        }
        if self.pending_source.is_some_and(|id| removed.contains(&id)) {
            self.pending_source = None;
        }
    }

    /// Drop references that no longer resolve in `diagram`.
    ///
    /// A pending source must still be a box.
    pub fn retain_existing(&mut self, diagram: &Diagram) {
        if self.selected.is_some_and(|id| !diagram.contains(id)) {
            self.selected = None;
        }
        if self
            .pending_source
            .is_some_and(|id| diagram.class_box(id).is_none())
        {
            self.pending_source = None;
        }
    }
}
