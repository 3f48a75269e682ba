//! Snapshot-based undo and redo.
//!
//! Every undoable edit is bracketed by [`HistoryEngine::begin_recording`] and
//! [`HistoryEngine::commit_recording`]. Begin captures the serialized diagram;
//! commit pushes that snapshot onto the undo stack only if the diagram
//! actually changed in between, so a click that edits nothing leaves no
//! empty undo step behind.
//!
//! ```text
//!   begin ──► pending ──commit(changed)──► undo stack ──undo──► redo stack
//!                 │                             ▲                   │
//!                 └──commit(unchanged)/cancel   └────────redo───────┘
//!                          (dropped)
//! ```
//!
//! Snapshots are owned JSON strings produced by [`document::serialize`], so
//! later edits can never alter a stored state.

use std::collections::VecDeque;

use log::{debug, trace};
use thiserror::Error;

use trellis_core::model::Diagram;

use crate::document::{self, DocumentError};

/// Default bound on the number of undo steps kept.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Error type for history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] DocumentError),
}

/// Bounded undo stack, unbounded redo stack and one pending snapshot.
#[derive(Debug, Clone)]
pub struct HistoryEngine {
    undo: VecDeque<String>,
    redo: Vec<String>,
    pending: Option<String>,
    max_depth: usize,
}

impl Default for HistoryEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl HistoryEngine {
    /// Create an empty history keeping at most `max_depth` undo steps.
    ///
    /// A depth of zero is raised to one.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            pending: None,
            max_depth: max_depth.max(1),
        }
    }

    /// Capture the current state as the pending snapshot.
    ///
    /// An uncommitted pending snapshot from an earlier call is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Snapshot`] if the diagram cannot be serialized.
    /// The previous pending snapshot is kept in that case.
    pub fn begin_recording(&mut self, diagram: &Diagram) -> Result<(), HistoryError> {
        let snapshot = document::serialize(diagram)?;
        if self.pending.replace(snapshot).is_some() {
            trace!("Replacing uncommitted snapshot");
        }
        Ok(())
    }

    /// Finish a recording started by [`begin_recording`](Self::begin_recording).
    ///
    /// Returns `true` if the diagram differs from the pending snapshot, in
    /// which case the snapshot becomes the newest undo step and the redo
    /// stack is cleared. Returns `false` if nothing changed or nothing was
    /// being recorded.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Snapshot`] if the diagram cannot be serialized;
    /// the pending snapshot is dropped.
    pub fn commit_recording(&mut self, diagram: &Diagram) -> Result<bool, HistoryError> {
        let Some(before) = self.pending.take() else {
            return Ok(false);
        };
        let after = document::serialize(diagram)?;
        if before == after {
            trace!("Recording unchanged, dropped");
            return Ok(false);
        }

        self.push_undo(before);
        self.redo.clear();
        debug!(undo_depth = self.undo.len(); "Undo step recorded");
        Ok(true)
    }

    /// Drop the pending snapshot without recording anything.
    pub fn cancel_recording(&mut self) {
        self.pending = None;
    }

    /// Restore the newest undo step, saving the current state for redo.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NothingToUndo`] if the undo stack is empty, or
    /// [`HistoryError::Snapshot`] if a snapshot cannot be encoded or decoded.
    /// Neither the diagram nor the stacks change on error.
    pub fn undo(&mut self, diagram: &mut Diagram) -> Result<(), HistoryError> {
        let snapshot = self.undo.back().ok_or(HistoryError::NothingToUndo)?;
        let restored = document::deserialize(snapshot)?;
        let current = document::serialize(diagram)?;

        self.undo.pop_back();
        self.redo.push(current);
        self.pending = None;
        *diagram = restored;
        debug!(undo_depth = self.undo.len(), redo_depth = self.redo.len(); "Undo");
        Ok(())
    }

    /// Restore the newest redo step, saving the current state for undo.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NothingToRedo`] if the redo stack is empty, or
    /// [`HistoryError::Snapshot`] if a snapshot cannot be encoded or decoded.
    /// Neither the diagram nor the stacks change on error.
    pub fn redo(&mut self, diagram: &mut Diagram) -> Result<(), HistoryError> {
        let snapshot = self.redo.last().ok_or(HistoryError::NothingToRedo)?;
        let restored = document::deserialize(snapshot)?;
        let current = document::serialize(diagram)?;

        self.redo.pop();
        self.push_undo(current);
        self.pending = None;
        *diagram = restored;
        debug!(undo_depth = self.undo.len(), redo_depth = self.redo.len(); "Redo");
        Ok(())
    }

    /// Drop both stacks and the pending snapshot.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.pending = None;
    }

    /// Returns true if [`undo`](Self::undo) has a step to restore.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Returns true if [`redo`](Self::redo) has a step to restore.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps currently kept.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps currently kept.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Returns true between a begin and its commit or cancel.
    pub fn is_recording(&self) -> bool {
        self.pending.is_some()
    }

    /// Bound on [`undo_depth`](Self::undo_depth).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn push_undo(&mut self, snapshot: String) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::{geometry::Point, relation::RelationKind};

    use super::*;

    fn record(
        history: &mut HistoryEngine,
        diagram: &mut Diagram,
        edit: impl FnOnce(&mut Diagram),
    ) -> bool {
        history.begin_recording(diagram).unwrap();
        edit(diagram);
        history.commit_recording(diagram).unwrap()
    }

    #[test]
    fn test_begin_then_commit_without_change_pushes_nothing() {
        let mut history = HistoryEngine::default();
        let mut diagram = Diagram::new();
        diagram.add_box("A", vec![], vec![], Point::default()).unwrap();

        assert!(!record(&mut history, &mut diagram, |_| {}));
        assert!(!history.can_undo());
        assert!(!history.is_recording());
    }

    #[test]
    fn test_commit_without_begin() {
        let mut history = HistoryEngine::default();
        let mut diagram = Diagram::new();
        diagram.add_box("A", vec![], vec![], Point::default()).unwrap();
        assert!(!history.commit_recording(&diagram).unwrap());
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn test_undo_restores_exact_serialization() {
        let mut history = HistoryEngine::default();
        let mut diagram = Diagram::new();
        let a = diagram.add_box("A", vec![], vec![], Point::new(50.0, 50.0)).unwrap();
        let before = document::serialize(&diagram).unwrap();

        assert!(record(&mut history, &mut diagram, |d| {
            let b = d.add_box("B", vec![], vec![], Point::new(300.0, 50.0)).unwrap();
            d.connect(b, a, RelationKind::Inheritance).unwrap();
        }));
        let after = document::serialize(&diagram).unwrap();

        history.undo(&mut diagram).unwrap();
        assert_eq!(document::serialize(&diagram).unwrap(), before);
        assert!(history.can_redo());

        history.redo(&mut diagram).unwrap();
        assert_eq!(document::serialize(&diagram).unwrap(), after);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_report_errors() {
        let mut history = HistoryEngine::default();
        let mut diagram = Diagram::new();
        assert!(matches!(
            history.undo(&mut diagram),
            Err(HistoryError::NothingToUndo)
        ));
        assert!(matches!(
            history.redo(&mut diagram),
            Err(HistoryError::NothingToRedo)
        ));
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut history = HistoryEngine::default();
        let mut diagram = Diagram::new();

        record(&mut history, &mut diagram, |d| {
            d.add_box("A", vec![], vec![], Point::default()).unwrap();
        });
        history.undo(&mut diagram).unwrap();
        assert_eq!(history.redo_depth(), 1);

        record(&mut history, &mut diagram, |d| {
            d.add_label("note", Point::default()).unwrap();
        });
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_undo_stack_is_bounded() {
        let mut history = HistoryEngine::new(3);
        let mut diagram = Diagram::new();

        for i in 0..5 {
            record(&mut history, &mut diagram, |d| {
                d.add_box(format!("C{i}"), vec![], vec![], Point::default()).unwrap();
            });
        }

        assert_eq!(history.undo_depth(), 3);
        for _ in 0..3 {
            history.undo(&mut diagram).unwrap();
        }
        // The two oldest steps were evicted.
        assert_eq!(diagram.box_count(), 2);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_begin_overwrites_pending() {
        let mut history = HistoryEngine::default();
        let mut diagram = Diagram::new();

        history.begin_recording(&diagram).unwrap();
        diagram.add_box("A", vec![], vec![], Point::default()).unwrap();
        history.begin_recording(&diagram).unwrap();
        assert!(!history.commit_recording(&diagram).unwrap());
    }

    #[test]
    fn test_cancel_recording() {
        let mut history = HistoryEngine::default();
        let mut diagram = Diagram::new();

        history.begin_recording(&diagram).unwrap();
        diagram.add_box("A", vec![], vec![], Point::default()).unwrap();
        history.cancel_recording();
        assert!(!history.commit_recording(&diagram).unwrap());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_failed_snapshot_leaves_state_untouched() {
        let mut history = HistoryEngine::default();
        let mut diagram = Diagram::new();
        record(&mut history, &mut diagram, |d| {
            d.add_box("A", vec![], vec![], Point::default()).unwrap();
        });

        // A snapshot that cannot be decoded must not be popped.
        history.undo[0] = "{ not json".to_string();
        let before = diagram.clone();
        assert!(matches!(
            history.undo(&mut diagram),
            Err(HistoryError::Snapshot(_))
        ));
        assert_eq!(diagram, before);
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_zero_depth_is_raised() {
        assert_eq!(HistoryEngine::new(0).max_depth(), 1);
    }
}
