#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{CharacterEntity, TextEntity};

fn doc_with_character(selected: bool) -> Document {
    let mut doc = Document::default();
    let mut c = CharacterEntity::new(EntityId::from("c1"));
    c.position = Position::new(10.0, 20.0);
    doc.characters.push(c);
    if selected {
        doc.selected_id = Some(EntityId::from("c1"));
    }
    doc
}

fn doc_with_text(width_mode: WidthMode) -> Document {
    let mut doc = Document::default();
    let mut t = TextEntity::new(EntityId::from("t1"));
    t.width_mode = width_mode;
    t.width = 120.0;
    doc.texts.push(t);
    doc.selected_id = Some(EntityId::from("t1"));
    doc
}

fn character() -> InteractionController {
    InteractionController::new(EntityId::from("c1"), EntityKind::Character)
}

fn text() -> InteractionController {
    InteractionController::new(EntityId::from("t1"), EntityKind::Text)
}

// =============================================================
// Press
// =============================================================

#[test]
fn press_on_unselected_entity_selects_and_drags() {
    let doc = doc_with_character(false);
    let mut ctl = character();
    let actions = ctl.pointer_down(&doc, PointerEvent::new(1, 50.0, 50.0));
    assert_eq!(actions, vec![Action::select(EntityId::from("c1"))]);
    assert!(matches!(ctl.state(), InputState::Dragging { pointer_id: 1, .. }));
    assert!(ctl.has_capture(1));
}

#[test]
fn press_on_selected_entity_does_not_reselect() {
    let doc = doc_with_character(true);
    let mut ctl = character();
    assert!(ctl.pointer_down(&doc, PointerEvent::new(1, 0.0, 0.0)).is_empty());
    assert!(matches!(ctl.state(), InputState::Dragging { .. }));
}

#[test]
fn press_on_control_surface_is_ignored() {
    let doc = doc_with_character(false);
    let mut ctl = character();
    assert!(ctl.pointer_down(&doc, PointerEvent::new(1, 0.0, 0.0).on_control()).is_empty());
    assert_eq!(ctl.state(), InputState::Idle);
}

#[test]
fn non_draggable_entity_selects_without_dragging() {
    let doc = doc_with_character(false);
    let mut ctl = character();
    ctl.draggable = false;
    let actions = ctl.pointer_down(&doc, PointerEvent::new(1, 0.0, 0.0));
    assert_eq!(actions.len(), 1);
    assert_eq!(ctl.state(), InputState::Idle);
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_emits_position_from_start_plus_delta() {
    let doc = doc_with_character(true);
    let mut ctl = character();
    ctl.pointer_down(&doc, PointerEvent::new(1, 100.0, 100.0));
    let first = ctl.pointer_move(PointerEvent::new(1, 130.0, 90.0));
    assert_eq!(
        first,
        Some(Action::update_character(EntityId::from("c1"), CharacterPatch::position(Position::new(40.0, 10.0))))
    );
    // Deltas are measured from the press, not the previous move.
    let second = ctl.pointer_move(PointerEvent::new(1, 90.0, 100.0));
    assert_eq!(
        second,
        Some(Action::update_character(EntityId::from("c1"), CharacterPatch::position(Position::new(0.0, 20.0))))
    );
}

#[test]
fn drag_text_emits_text_update() {
    let doc = doc_with_text(WidthMode::Auto);
    let mut ctl = text();
    ctl.pointer_down(&doc, PointerEvent::new(3, 0.0, 0.0));
    let action = ctl.pointer_move(PointerEvent::new(3, 5.0, 7.0));
    assert_eq!(action, Some(Action::update_text(EntityId::from("t1"), TextPatch::position(Position::new(5.0, 7.0)))));
}

#[test]
fn moves_from_other_pointers_are_ignored() {
    let doc = doc_with_character(true);
    let mut ctl = character();
    ctl.pointer_down(&doc, PointerEvent::new(1, 0.0, 0.0));
    assert_eq!(ctl.pointer_move(PointerEvent::new(2, 50.0, 50.0)), None);
    assert!(!ctl.pointer_up(PointerEvent::new(2, 50.0, 50.0)));
    assert!(ctl.has_capture(1));
}

#[test]
fn move_while_idle_does_nothing() {
    let mut ctl = character();
    assert_eq!(ctl.pointer_move(PointerEvent::new(1, 5.0, 5.0)), None);
}

#[test]
fn release_and_leave_end_gesture() {
    let doc = doc_with_character(true);
    let mut ctl = character();
    ctl.pointer_down(&doc, PointerEvent::new(1, 0.0, 0.0));
    assert!(ctl.pointer_up(PointerEvent::new(1, 0.0, 0.0)));
    assert_eq!(ctl.state(), InputState::Idle);
    assert_eq!(ctl.pointer_move(PointerEvent::new(1, 9.0, 9.0)), None);

    ctl.pointer_down(&doc, PointerEvent::new(1, 0.0, 0.0));
    assert!(ctl.pointer_leave(PointerEvent::new(1, 0.0, 0.0)));
    assert_eq!(ctl.state(), InputState::Idle);
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_requires_selection() {
    let doc = doc_with_character(false);
    let mut ctl = character();
    assert!(!ctl.resize_handle_down(&doc, PointerEvent::new(1, 0.0, 0.0)));
    assert_eq!(ctl.state(), InputState::Idle);
}

#[test]
fn resize_character_clamps_both_dimensions_to_minimum() {
    let doc = doc_with_character(true);
    let mut ctl = character();
    assert!(ctl.resize_handle_down(&doc, PointerEvent::new(1, 400.0, 400.0)));
    let action = ctl.pointer_move(PointerEvent::new(1, 0.0, 0.0));
    assert_eq!(
        action,
        Some(Action::update_character(EntityId::from("c1"), CharacterPatch::size(Size::new(50.0, 50.0))))
    );
}

#[test]
fn resize_character_grows_with_delta() {
    let doc = doc_with_character(true);
    let mut ctl = character();
    ctl.resize_handle_down(&doc, PointerEvent::new(1, 400.0, 400.0));
    let action = ctl.pointer_move(PointerEvent::new(1, 425.0, 380.0));
    assert_eq!(
        action,
        Some(Action::update_character(EntityId::from("c1"), CharacterPatch::size(Size::new(425.0, 380.0))))
    );
}

#[test]
fn resize_text_requires_fixed_width() {
    let doc = doc_with_text(WidthMode::Auto);
    let mut ctl = text();
    assert!(!ctl.resize_handle_down(&doc, PointerEvent::new(1, 0.0, 0.0)));
}

#[test]
fn resize_text_changes_width_only() {
    let doc = doc_with_text(WidthMode::Fixed);
    let mut ctl = text();
    assert!(ctl.resize_handle_down(&doc, PointerEvent::new(1, 100.0, 100.0)));
    assert_eq!(
        ctl.pointer_move(PointerEvent::new(1, 130.0, 500.0)),
        Some(Action::update_text(EntityId::from("t1"), TextPatch::width(150.0)))
    );
    assert_eq!(
        ctl.pointer_move(PointerEvent::new(1, -500.0, 0.0)),
        Some(Action::update_text(EntityId::from("t1"), TextPatch::width(50.0)))
    );
}

#[test]
fn press_during_resize_selects_but_does_not_drag() {
    let mut doc = doc_with_character(true);
    let mut ctl = character();
    ctl.resize_handle_down(&doc, PointerEvent::new(1, 0.0, 0.0));
    doc.selected_id = None;
    let actions = ctl.pointer_down(&doc, PointerEvent::new(1, 0.0, 0.0));
    assert_eq!(actions, vec![Action::select(EntityId::from("c1"))]);
    assert!(matches!(ctl.state(), InputState::Resizing { .. }));
}

#[test]
fn cancel_drops_gesture() {
    let doc = doc_with_character(true);
    let mut ctl = character();
    ctl.pointer_down(&doc, PointerEvent::new(1, 0.0, 0.0));
    ctl.cancel();
    assert_eq!(ctl.state(), InputState::Idle);
}

// =============================================================
// UiState
// =============================================================

#[test]
fn ui_state_defaults_show_chrome() {
    let ui = UiState::default();
    assert!(ui.show_unrendered_styles);
    assert!(!ui.capturing);
}
