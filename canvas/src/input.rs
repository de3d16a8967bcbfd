//! Pointer gestures for placed entities.
//!
//! Every character and text block owns an [`InteractionController`]. The
//! controller turns the host's pointer events into document actions: a
//! press on the body selects the entity and starts a drag, a press on the
//! resize handle starts a resize, and release or leave ends the gesture.
//! While a gesture is active the controller holds the pointer capture and
//! ignores events from any other pointer.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::action::Action;
use crate::consts::MIN_ENTITY_SIZE_PX;
use crate::doc::{CharacterPatch, Document, EntityId, EntityKind, Position, Size, TextPatch, WidthMode};
use crate::geom::Point;

/// Host pointer identifier.
pub type PointerId = i32;

/// A pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub point: Point,
    /// The press landed on a control surface (toolbar, input, button) inside the entity.
    pub on_control: bool,
}

impl PointerEvent {
    #[must_use]
    pub fn new(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self { pointer_id, point: Point::new(x, y), on_control: false }
    }

    #[must_use]
    pub fn on_control(mut self) -> Self {
        self.on_control = true;
        self
    }
}

/// Editor chrome state that is not part of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    /// Selection borders and handles are drawn.
    pub show_unrendered_styles: bool,
    /// An export capture is in progress.
    pub capturing: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { show_unrendered_styles: true, capturing: false }
    }
}

/// Active gesture for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    #[default]
    Idle,
    /// Moving the entity; position follows the pointer delta.
    Dragging {
        pointer_id: PointerId,
        start_position: Position,
        start_pointer: Point,
    },
    /// Resizing from the bottom-right handle. Text blocks only change width.
    Resizing {
        pointer_id: PointerId,
        start_size: Size,
        start_pointer: Point,
    },
}

impl InputState {
    /// The pointer holding capture, if a gesture is active.
    #[must_use]
    pub fn captured_pointer(&self) -> Option<PointerId> {
        match *self {
            Self::Idle => None,
            Self::Dragging { pointer_id, .. } | Self::Resizing { pointer_id, .. } => Some(pointer_id),
        }
    }
}

/// Gesture state machine for a single entity.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionController {
    entity_id: EntityId,
    kind: EntityKind,
    /// When false, presses select but never drag.
    pub draggable: bool,
    state: InputState,
}

impl InteractionController {
    #[must_use]
    pub fn new(entity_id: EntityId, kind: EntityKind) -> Self {
        Self { entity_id, kind, draggable: true, state: InputState::Idle }
    }

    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn state(&self) -> InputState {
        self.state
    }

    /// Whether `pointer_id` holds this controller's capture.
    #[must_use]
    pub fn has_capture(&self, pointer_id: PointerId) -> bool {
        self.state.captured_pointer() == Some(pointer_id)
    }

    /// Press on the entity body. Returns the actions to dispatch.
    pub fn pointer_down(&mut self, doc: &Document, ev: PointerEvent) -> Vec<Action> {
        if ev.on_control {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if !doc.is_selected(&self.entity_id) {
            actions.push(Action::select(self.entity_id.clone()));
        }
        if !self.draggable || matches!(self.state, InputState::Resizing { .. }) {
            return actions;
        }
        let Some(start_position) = doc.position_of(&self.entity_id) else {
            return actions;
        };
        self.state = InputState::Dragging { pointer_id: ev.pointer_id, start_position, start_pointer: ev.point };
        actions
    }

    /// Press on the resize handle. Only a selected entity can be resized,
    /// and a text block only while it has a fixed width. Returns whether a
    /// resize started.
    pub fn resize_handle_down(&mut self, doc: &Document, ev: PointerEvent) -> bool {
        if !doc.is_selected(&self.entity_id) {
            return false;
        }
        let start_size = match self.kind {
            EntityKind::Character => doc.character(&self.entity_id).map(|c| c.size),
            EntityKind::Text => doc
                .text(&self.entity_id)
                .filter(|t| t.width_mode == WidthMode::Fixed)
                .map(|t| Size::new(t.width, 0.0)),
        };
        let Some(start_size) = start_size else {
            return false;
        };
        self.state = InputState::Resizing { pointer_id: ev.pointer_id, start_size, start_pointer: ev.point };
        true
    }

    /// Pointer moved. Emits one update while a gesture from the same pointer is active.
    pub fn pointer_move(&mut self, ev: PointerEvent) -> Option<Action> {
        if !self.has_capture(ev.pointer_id) {
            return None;
        }
        match self.state {
            InputState::Idle => None,
            InputState::Dragging { start_position, start_pointer, .. } => {
                if !self.draggable {
                    return None;
                }
                let position =
                    start_position.offset(ev.point.x - start_pointer.x, ev.point.y - start_pointer.y);
                Some(self.position_update(position))
            }
            InputState::Resizing { start_size, start_pointer, .. } => {
                let width = (start_size.width + ev.point.x - start_pointer.x).max(MIN_ENTITY_SIZE_PX);
                let action = match self.kind {
                    EntityKind::Character => {
                        let height = (start_size.height + ev.point.y - start_pointer.y).max(MIN_ENTITY_SIZE_PX);
                        Action::update_character(self.entity_id.clone(), CharacterPatch::size(Size::new(width, height)))
                    }
                    EntityKind::Text => Action::update_text(self.entity_id.clone(), TextPatch::width(width)),
                };
                Some(action)
            }
        }
    }

    /// Release. Returns whether capture was released.
    pub fn pointer_up(&mut self, ev: PointerEvent) -> bool {
        self.release(ev.pointer_id)
    }

    /// Pointer left the surface. Ends the gesture like a release.
    pub fn pointer_leave(&mut self, ev: PointerEvent) -> bool {
        self.release(ev.pointer_id)
    }

    /// Drop any active gesture, regardless of pointer.
    pub fn cancel(&mut self) {
        self.state = InputState::Idle;
    }

    fn release(&mut self, pointer_id: PointerId) -> bool {
        if !self.has_capture(pointer_id) {
            return false;
        }
        self.state = InputState::Idle;
        true
    }

    fn position_update(&self, position: Position) -> Action {
        match self.kind {
            EntityKind::Character => Action::update_character(self.entity_id.clone(), CharacterPatch::position(position)),
            EntityKind::Text => Action::update_text(self.entity_id.clone(), TextPatch::position(position)),
        }
    }
}
