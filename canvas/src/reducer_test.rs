#![allow(clippy::float_cmp)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::doc::{
    Background, CharacterPatch, ImageOrder, Position, RenderMode, Size, TemplatePayload, TextPatch, WidthMode,
};
use crate::ids::SequentialIds;

fn apply_all(actions: Vec<Action>, ids: &mut SequentialIds) -> Document {
    actions.into_iter().fold(Document::default(), |doc, action| reduce(doc, action, ids))
}

/// Selection is unset or names a present entity.
fn selection_is_valid(doc: &Document) -> bool {
    doc.selected_id.as_ref().is_none_or(|id| doc.contains(id))
}

fn id(s: &str) -> EntityId {
    EntityId::from(s)
}

// =============================================================
// Background
// =============================================================

#[test]
fn background_setters_only_touch_their_field() {
    let mut ids = SequentialIds::new("e");
    let doc = apply_all(
        vec![
            Action::SetBackgroundImage(Some("data:image/png;base64,AA".into())),
            Action::SetBackgroundSize(Size::new(800.0, 600.0)),
            Action::SetBackgroundImageOrder(ImageOrder::Top),
        ],
        &mut ids,
    );
    assert_eq!(doc.background.image_src.as_deref(), Some("data:image/png;base64,AA"));
    assert_eq!(doc.background.size, Size::new(800.0, 600.0));
    assert_eq!(doc.background.image_order, ImageOrder::Top);

    let doc = reduce(doc, Action::SetBackgroundImage(None), &mut ids);
    assert_eq!(doc.background.image_src, None);
    assert_eq!(doc.background.size, Size::new(800.0, 600.0));
}

// =============================================================
// Characters
// =============================================================

#[test]
fn add_character_appends_defaults_without_selecting() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(vec![Action::AddCharacter, Action::AddCharacter], &mut ids);
    assert_eq!(doc.characters.len(), 2);
    assert_eq!(doc.characters[0].id, id("c-1"));
    assert_eq!(doc.characters[1].id, id("c-2"));
    assert_eq!(doc.characters[1].size, Size::new(400.0, 400.0));
    assert_eq!(doc.selected_id, None);
}

#[test]
fn update_character_merges_patch() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(
        vec![
            Action::AddCharacter,
            Action::update_character(id("c-1"), CharacterPatch::render_mode(RenderMode::Cover)),
            Action::update_character(id("c-1"), CharacterPatch::position(Position::new(-20.0, 15.0))),
        ],
        &mut ids,
    );
    let c = &doc.characters[0];
    assert_eq!(c.image_render_mode, RenderMode::Cover);
    assert_eq!(c.position, Position::new(-20.0, 15.0));
    assert_eq!(c.size, Size::new(400.0, 400.0));
}

#[test]
fn update_missing_character_is_noop() {
    let mut ids = SequentialIds::new("c");
    let before = apply_all(vec![Action::AddCharacter], &mut ids);
    let after = reduce(
        before.clone(),
        Action::update_character(id("nope"), CharacterPatch::size(Size::new(1.0, 1.0))),
        &mut ids,
    );
    assert_eq!(after, before);
}

#[test]
fn update_patches_every_entity_sharing_the_id() {
    let mut ids = SequentialIds::new("c");
    let payload = TemplatePayload {
        background: None,
        characters: Some(vec![CharacterEntity::new(id("")), CharacterEntity::new(id(""))]),
        texts: Some(vec![TextEntity::new(id("dup")), TextEntity::new(id("dup"))]),
    };
    let doc = apply_all(
        vec![
            Action::LoadTemplate(payload),
            Action::update_character(id(""), CharacterPatch::position(Position::new(7.0, 8.0))),
            Action::update_text(id("dup"), TextPatch::text("both")),
        ],
        &mut ids,
    );
    assert!(doc.characters.iter().all(|c| c.position == Position::new(7.0, 8.0)));
    assert!(doc.texts.iter().all(|t| t.text == "both"));
}

#[test]
fn remove_selected_character_clears_selection() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(
        vec![Action::AddCharacter, Action::AddCharacter, Action::select(id("c-1")), Action::RemoveCharacter(id("c-1"))],
        &mut ids,
    );
    assert_eq!(doc.characters.len(), 1);
    assert_eq!(doc.characters[0].id, id("c-2"));
    assert_eq!(doc.selected_id, None);
}

#[test]
fn remove_unselected_character_keeps_selection() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(
        vec![Action::AddCharacter, Action::AddCharacter, Action::select(id("c-2")), Action::RemoveCharacter(id("c-1"))],
        &mut ids,
    );
    assert_eq!(doc.selected_id, Some(id("c-2")));
}

#[test]
fn clone_character_offsets_and_selects_copy() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(
        vec![
            Action::AddCharacter,
            Action::update_character(id("c-1"), CharacterPatch::position(Position::new(10.0, 20.0))),
            Action::update_character(id("c-1"), CharacterPatch::image(Some("https://x/a.png".into()))),
            Action::CloneCharacter(id("c-1")),
        ],
        &mut ids,
    );
    assert_eq!(doc.characters.len(), 2);
    let copy = &doc.characters[1];
    assert_eq!(copy.id, id("c-2"));
    assert_eq!(copy.position, Position::new(20.0, 30.0));
    assert_eq!(copy.image_data_url.as_deref(), Some("https://x/a.png"));
    assert_eq!(doc.characters[0].position, Position::new(10.0, 20.0));
    assert_eq!(doc.selected_id, Some(id("c-2")));
}

#[test]
fn clone_missing_character_is_noop() {
    let mut ids = SequentialIds::new("c");
    let before = apply_all(vec![Action::AddCharacter], &mut ids);
    let after = reduce(before.clone(), Action::CloneCharacter(id("ghost")), &mut ids);
    assert_eq!(after, before);
}

// =============================================================
// Texts
// =============================================================

#[test]
fn text_lifecycle() {
    let mut ids = SequentialIds::new("t");
    let doc = apply_all(
        vec![
            Action::AddTextDisplay,
            Action::update_text(id("t-1"), TextPatch::text("你好")),
            Action::CloneTextDisplay(id("t-1")),
        ],
        &mut ids,
    );
    assert_eq!(doc.texts.len(), 2);
    assert_eq!(doc.texts[1].text, "你好");
    assert_eq!(doc.texts[1].position, Position::new(10.0, 10.0));
    assert_eq!(doc.selected_id, Some(id("t-2")));

    let doc = reduce(doc, Action::RemoveTextDisplay(id("t-2")), &mut ids);
    assert_eq!(doc.texts.len(), 1);
    assert_eq!(doc.selected_id, None);
}

#[test]
fn update_text_width_mode() {
    let mut ids = SequentialIds::new("t");
    let patch = TextPatch { width_mode: Some(WidthMode::Fixed), width: Some(320.0), ..Default::default() };
    let doc = apply_all(vec![Action::AddTextDisplay, Action::update_text(id("t-1"), patch)], &mut ids);
    assert_eq!(doc.texts[0].width_mode, WidthMode::Fixed);
    assert_eq!(doc.texts[0].width, 320.0);
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_missing_entity_clears_selection() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(vec![Action::AddCharacter, Action::select(id("c-1")), Action::select(id("ghost"))], &mut ids);
    assert_eq!(doc.selected_id, None);
}

#[test]
fn deselect_clears() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(vec![Action::AddCharacter, Action::select(id("c-1")), Action::deselect()], &mut ids);
    assert_eq!(doc.selected_id, None);
}

#[test]
fn selection_invariant_holds_over_random_sequences() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut ids = SequentialIds::new("e");
    let mut doc = Document::default();
    for _ in 0..500 {
        let known: Vec<EntityId> = doc.entity_ids().cloned().collect();
        let target = if known.is_empty() || rng.random_bool(0.1) {
            id("missing")
        } else {
            known[rng.random_range(0..known.len())].clone()
        };
        let action = match rng.random_range(0..10) {
            0 => Action::AddCharacter,
            1 => Action::AddTextDisplay,
            2 => Action::RemoveCharacter(target),
            3 => Action::RemoveTextDisplay(target),
            4 => Action::CloneCharacter(target),
            5 => Action::CloneTextDisplay(target),
            6 | 7 => Action::select(target),
            8 => Action::update_character(target, CharacterPatch::position(Position::new(1.0, 1.0))),
            _ => Action::deselect(),
        };
        doc = reduce(doc, action, &mut ids);
        assert!(selection_is_valid(&doc), "dangling selection {:?}", doc.selected_id);
    }
}

// =============================================================
// Load / reset
// =============================================================

#[test]
fn load_template_replaces_document_and_clears_selection() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(vec![Action::AddCharacter, Action::select(id("c-1"))], &mut ids);
    let payload = TemplatePayload {
        background: Some(Background { image_src: Some("bg".into()), ..Background::default() }),
        characters: None,
        texts: Some(vec![TextEntity::new(id("loaded"))]),
    };
    let doc = reduce(doc, Action::LoadTemplate(payload), &mut ids);
    assert_eq!(doc.background.image_src.as_deref(), Some("bg"));
    assert!(doc.characters.is_empty());
    assert_eq!(doc.texts[0].id, id("loaded"));
    assert_eq!(doc.selected_id, None);
}

#[test]
fn load_template_is_idempotent() {
    let mut ids = SequentialIds::new("x");
    let payload = TemplatePayload {
        background: None,
        characters: Some(vec![CharacterEntity::new(id("a"))]),
        texts: Some(vec![TextEntity::new(id("b"))]),
    };
    let once = reduce(Document::default(), Action::LoadTemplate(payload.clone()), &mut ids);
    let twice = reduce(once.clone(), Action::LoadTemplate(payload), &mut ids);
    assert_eq!(once, twice);
}

#[test]
fn reset_restores_initial_document() {
    let mut ids = SequentialIds::new("c");
    let doc = apply_all(
        vec![Action::AddCharacter, Action::SetBackgroundSize(Size::new(10.0, 10.0)), Action::ResetTemplate],
        &mut ids,
    );
    assert_eq!(doc, Document::default());
}

#[test]
fn unknown_action_is_noop() {
    let mut ids = SequentialIds::new("c");
    let before = apply_all(vec![Action::AddCharacter, Action::select(id("c-1"))], &mut ids);
    let after = reduce(before.clone(), Action::Unknown, &mut ids);
    assert_eq!(after, before);
}

// =============================================================
// Id freshness
// =============================================================

struct Fixed(Vec<&'static str>);

impl IdSource for Fixed {
    fn next_id(&mut self) -> EntityId {
        if self.0.len() > 1 {
            EntityId::from(self.0.remove(0))
        } else {
            EntityId::from(self.0[0])
        }
    }
}

#[test]
fn colliding_ids_are_skipped() {
    let mut ids = Fixed(vec!["a", "a", "b"]);
    let doc = reduce(Document::default(), Action::AddCharacter, &mut ids);
    let doc = reduce(doc, Action::AddCharacter, &mut ids);
    let got: Vec<&str> = doc.characters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(got, vec!["a", "b"]);
}

#[test]
fn persistent_collisions_fall_back_to_suffix() {
    let mut ids = Fixed(vec!["same"]);
    let doc = reduce(Document::default(), Action::AddCharacter, &mut ids);
    let doc = reduce(doc, Action::AddTextDisplay, &mut ids);
    let doc = reduce(doc, Action::AddTextDisplay, &mut ids);
    assert_eq!(doc.characters[0].id, id("same"));
    assert_eq!(doc.texts[0].id, id("same-1"));
    assert_eq!(doc.texts[1].id, id("same-2"));
}
