//! The template reducer: `(document, action) -> document`.
//!
//! Pure apart from the injected id source. Never fails: actions naming an
//! entity that is not present leave the document unchanged.

#[cfg(test)]
#[path = "reducer_test.rs"]
mod reducer_test;

use crate::action::Action;
use crate::consts::{CLONE_OFFSET_PX, MAX_ID_ATTEMPTS};
use crate::doc::{CharacterEntity, Document, EntityId, TextEntity};
use crate::ids::IdSource;

/// Apply one action and return the resulting document.
#[must_use]
pub fn reduce(mut doc: Document, action: Action, ids: &mut dyn IdSource) -> Document {
    match action {
        Action::SetBackgroundImage(src) => doc.background.image_src = src,
        Action::SetBackgroundSize(size) => doc.background.size = size,
        Action::SetBackgroundImageOrder(order) => doc.background.image_order = order,

        Action::AddCharacter => {
            let id = fresh_id(&doc, ids);
            doc.characters.push(CharacterEntity::new(id));
        }
        Action::UpdateCharacter { id, data } => {
            // Loaded templates may repeat an id; every match is patched.
            let mut patched = 0_usize;
            for character in doc.characters.iter_mut().filter(|c| c.id == id) {
                character.apply(&data);
                patched += 1;
            }
            if patched == 0 {
                tracing::debug!(%id, "update for missing character ignored");
            }
        }
        Action::RemoveCharacter(id) => {
            doc.characters.retain(|c| c.id != id);
            clear_selection_of(&mut doc, &id);
        }
        Action::CloneCharacter(id) => {
            let Some(source) = doc.character(&id).cloned() else {
                tracing::debug!(%id, "clone of missing character ignored");
                return doc;
            };
            let copy = CharacterEntity {
                id: fresh_id(&doc, ids),
                position: source.position.offset(CLONE_OFFSET_PX, CLONE_OFFSET_PX),
                ..source
            };
            doc.selected_id = Some(copy.id.clone());
            doc.characters.push(copy);
        }

        Action::AddTextDisplay => {
            let id = fresh_id(&doc, ids);
            doc.texts.push(TextEntity::new(id));
        }
        Action::UpdateTextDisplay { id, data } => {
            let mut patched = 0_usize;
            for text in doc.texts.iter_mut().filter(|t| t.id == id) {
                text.apply(&data);
                patched += 1;
            }
            if patched == 0 {
                tracing::debug!(%id, "update for missing text ignored");
            }
        }
        Action::RemoveTextDisplay(id) => {
            doc.texts.retain(|t| t.id != id);
            clear_selection_of(&mut doc, &id);
        }
        Action::CloneTextDisplay(id) => {
            let Some(source) = doc.text(&id).cloned() else {
                tracing::debug!(%id, "clone of missing text ignored");
                return doc;
            };
            let copy = TextEntity {
                id: fresh_id(&doc, ids),
                position: source.position.offset(CLONE_OFFSET_PX, CLONE_OFFSET_PX),
                ..source
            };
            doc.selected_id = Some(copy.id.clone());
            doc.texts.push(copy);
        }

        Action::SetSelectedId(Some(id)) if !doc.contains(&id) => {
            tracing::debug!(%id, "selection of missing entity clears selection");
            doc.selected_id = None;
        }
        Action::SetSelectedId(selection) => doc.selected_id = selection,

        Action::LoadTemplate(payload) => return Document::from_payload(payload),
        Action::ResetTemplate => return Document::default(),

        Action::Unknown => tracing::debug!("unknown action ignored"),
    }
    doc
}

fn clear_selection_of(doc: &mut Document, id: &EntityId) {
    if doc.is_selected(id) {
        doc.selected_id = None;
    }
}

/// Draw ids until one is not already used in the document. After
/// `MAX_ID_ATTEMPTS` collisions a numeric suffix disambiguates.
fn fresh_id(doc: &Document, ids: &mut dyn IdSource) -> EntityId {
    let mut last = ids.next_id();
    for _ in 1..MAX_ID_ATTEMPTS {
        if !doc.contains(&last) {
            return last;
        }
        last = ids.next_id();
    }
    if !doc.contains(&last) {
        return last;
    }
    let mut suffix = 1_usize;
    let mut id = EntityId::new(format!("{last}-{suffix}"));
    while doc.contains(&id) {
        suffix += 1;
        id = EntityId::new(format!("{last}-{suffix}"));
    }
    tracing::debug!(%id, "id source kept colliding; using suffixed id");
    id
}
