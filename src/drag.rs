// Drag interaction state machine. Translates pointer gestures into move
// intents; the reducer below is the only path that turns an intent into a
// new order map, keeping the reorder engine pure and testable on its own.

use crate::order::OrderMap;
use crate::reorder::{insert_before, move_to_column_end};

/// Something a dragged card can be released over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// A column's end-zone: "move to last position in this column".
    ColumnEnd(i64),
    /// Another feed card, identified by feed key.
    Card(String),
}

/// A committed move, consumed by `apply_intent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveIntent {
    ToColumnEnd { feed: String, column: i64 },
    Before { feed: String, target: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        subject: String,
        origin_column: i64,
    },
}

#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
    hover: Option<DropTarget>,
}

impl DragController {
    pub fn new() -> Self {
        DragController::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn subject(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { subject, .. } => Some(subject),
            DragState::Idle => None,
        }
    }

    pub fn origin_column(&self) -> Option<i64> {
        match &self.state {
            DragState::Dragging { origin_column, .. } => Some(*origin_column),
            DragState::Idle => None,
        }
    }

    /// Current hover target, for drawing the drop affordance.
    pub fn hover_target(&self) -> Option<&DropTarget> {
        self.hover.as_ref()
    }

    /// Begin a drag from a card's header region.
    pub fn start(&mut self, subject: impl Into<String>, origin_column: i64) {
        self.state = DragState::Dragging {
            subject: subject.into(),
            origin_column,
        };
        self.hover = None;
    }

    /// Update the hover target while dragging. Returns the candidate move
    /// this drop would commit, for drawing the affordance; nothing persists.
    pub fn hover(&mut self, target: Option<DropTarget>) -> Option<MoveIntent> {
        if !self.is_dragging() {
            self.hover = None;
            return None;
        }
        let candidate = target.as_ref().and_then(|t| self.intent_for(t));
        self.hover = if candidate.is_some() { target } else { None };
        candidate
    }

    /// Release over a target. Always returns to Idle; yields an intent only
    /// for a valid target (an end-zone, or a card other than the subject).
    pub fn drop(&mut self, target: Option<DropTarget>) -> Option<MoveIntent> {
        let intent = target.as_ref().and_then(|t| self.intent_for(t));
        self.reset();
        intent
    }

    /// Abort path: pointer released outside any valid target, Escape, or a
    /// drag-end with nothing under the pointer. Never produces an intent.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.hover = None;
    }

    fn intent_for(&self, target: &DropTarget) -> Option<MoveIntent> {
        let subject = self.subject()?;
        match target {
            DropTarget::ColumnEnd(column) => Some(MoveIntent::ToColumnEnd {
                feed: subject.to_string(),
                column: *column,
            }),
            DropTarget::Card(key) if key != subject => Some(MoveIntent::Before {
                feed: subject.to_string(),
                target: key.clone(),
            }),
            DropTarget::Card(_) => None,
        }
    }
}

/// Reducer: dispatch one move intent into the reorder engine, producing the
/// next order map. Callers persist the result and re-project.
pub fn apply_intent(order: &OrderMap, live_keys: &[String], intent: &MoveIntent) -> OrderMap {
    match intent {
        MoveIntent::ToColumnEnd { feed, column } => {
            move_to_column_end(order, live_keys, feed, *column)
        }
        MoveIntent::Before { feed, target } => insert_before(order, live_keys, feed, target),
    }
}
