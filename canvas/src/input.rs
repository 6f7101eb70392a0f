//! Drag input: the pointer gesture state machine for moving text layers.
//!
//! `InputState` is the active gesture tracked between pointer-down on a layer
//! and the next pointer-up. The grab offset is captured once, at pointer-down,
//! and held for the whole session so the layer keeps its position relative to
//! the pointer instead of jumping its anchor under it.
//!
//! All positions here are normalized frame coordinates; conversion from client
//! pixels happens in [`crate::geometry::GeometryEngine`] before these methods
//! are called.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{UNIT_RANGE, clamp_to};
use crate::doc::{LayerId, TextLayer};
use crate::geometry::Point;

/// A layer being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Id of the layer under the pointer at grab time.
    pub layer_id: LayerId,
    /// Pointer position minus layer anchor at grab time, normalized.
    pub offset: Point,
}

/// Internal state for the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down on a layer.
    #[default]
    Idle,
    /// A layer follows the pointer until pointer-up.
    Dragging(DragSession),
}

/// Turns pointer positions into layer positions.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: InputState,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> InputState {
        self.state
    }

    #[must_use]
    pub fn session(&self) -> Option<DragSession> {
        match self.state {
            InputState::Dragging(session) => Some(session),
            InputState::Idle => None,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, InputState::Dragging(_))
    }

    /// Begin dragging `layer`, grabbed at normalized `pointer`.
    ///
    /// Only one session exists at a time: returns `false` and keeps the
    /// current session if a drag is already in progress.
    pub fn grab(&mut self, layer: &TextLayer, pointer: Point) -> bool {
        if self.is_dragging() {
            return false;
        }
        let offset = Point::new(pointer.x - layer.x, pointer.y - layer.y);
        self.state = InputState::Dragging(DragSession { layer_id: layer.id, offset });
        true
    }

    /// Where the dragged layer's anchor goes for a pointer at `pointer`.
    ///
    /// Each axis is `clamp(pointer - offset, 0, 1)`. `None` when idle.
    #[must_use]
    pub fn drag_to(&self, pointer: Point) -> Option<(LayerId, Point)> {
        let session = self.session()?;
        let x = clamp_to(pointer.x - session.offset.x, &UNIT_RANGE);
        let y = clamp_to(pointer.y - session.offset.y, &UNIT_RANGE);
        Some((session.layer_id, Point::new(x, y)))
    }

    /// End the session, returning the id that was being dragged.
    pub fn release(&mut self) -> Option<LayerId> {
        let id = self.session().map(|s| s.layer_id);
        self.state = InputState::Idle;
        id
    }

    /// End the session if it is dragging `id` (the layer went away).
    pub fn abandon(&mut self, id: &LayerId) -> bool {
        if self.session().is_some_and(|s| s.layer_id == *id) {
            self.state = InputState::Idle;
            return true;
        }
        false
    }
}
