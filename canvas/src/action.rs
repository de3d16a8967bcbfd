//! The closed set of document intents.
//!
//! Actions travel in the web editor's wire shape: an object with a
//! SCREAMING_SNAKE_CASE `type` tag and an optional `payload`, for example
//! `{"type": "UPDATE_CHARACTER", "payload": {"id": "...", "data": {...}}}`.
//! An unrecognized `type` deserializes to [`Action::Unknown`], which the
//! reducer ignores; a recognized type with a malformed payload is an error.

#[cfg(test)]
#[path = "action_test.rs"]
mod action_test;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::doc::{CharacterPatch, EntityId, ImageOrder, Size, TemplatePayload, TextPatch};

/// A single state transition request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Replace the background image; `None` clears it.
    SetBackgroundImage(Option<String>),
    SetBackgroundSize(Size),
    SetBackgroundImageOrder(ImageOrder),
    /// Append a character with default fields and a fresh id.
    AddCharacter,
    /// Shallow-merge `data` into the character with `id`.
    UpdateCharacter { id: EntityId, data: CharacterPatch },
    RemoveCharacter(EntityId),
    /// Copy a character under a fresh id, offset it, and select the copy.
    CloneCharacter(EntityId),
    AddTextDisplay,
    UpdateTextDisplay { id: EntityId, data: TextPatch },
    RemoveTextDisplay(EntityId),
    CloneTextDisplay(EntityId),
    SetSelectedId(Option<EntityId>),
    /// Replace the whole document; missing sections take initial values.
    LoadTemplate(TemplatePayload),
    ResetTemplate,
    /// Any action type this build does not recognize.
    Unknown,
}

impl Action {
    #[must_use]
    pub fn update_character(id: EntityId, data: CharacterPatch) -> Self {
        Self::UpdateCharacter { id, data }
    }

    #[must_use]
    pub fn update_text(id: EntityId, data: TextPatch) -> Self {
        Self::UpdateTextDisplay { id, data }
    }

    #[must_use]
    pub fn select(id: EntityId) -> Self {
        Self::SetSelectedId(Some(id))
    }

    #[must_use]
    pub fn deselect() -> Self {
        Self::SetSelectedId(None)
    }

    /// Wire tag of this action.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SetBackgroundImage(_) => "SET_BACKGROUND_IMAGE",
            Self::SetBackgroundSize(_) => "SET_BACKGROUND_SIZE",
            Self::SetBackgroundImageOrder(_) => "SET_BACKGROUND_IMAGE_ORDER",
            Self::AddCharacter => "ADD_CHARACTER",
            Self::UpdateCharacter { .. } => "UPDATE_CHARACTER",
            Self::RemoveCharacter(_) => "REMOVE_CHARACTER",
            Self::CloneCharacter(_) => "CLONE_CHARACTER",
            Self::AddTextDisplay => "ADD_TEXT_DISPLAY",
            Self::UpdateTextDisplay { .. } => "UPDATE_TEXT_DISPLAY",
            Self::RemoveTextDisplay(_) => "REMOVE_TEXT_DISPLAY",
            Self::CloneTextDisplay(_) => "CLONE_TEXT_DISPLAY",
            Self::SetSelectedId(_) => "SET_SELECTED_ID",
            Self::LoadTemplate(_) => "LOAD_TEMPLATE",
            Self::ResetTemplate => "RESET_TEMPLATE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum ActionType {
    SetBackgroundImage,
    SetBackgroundSize,
    SetBackgroundImageOrder,
    AddCharacter,
    UpdateCharacter,
    RemoveCharacter,
    CloneCharacter,
    AddTextDisplay,
    UpdateTextDisplay,
    RemoveTextDisplay,
    CloneTextDisplay,
    SetSelectedId,
    LoadTemplate,
    ResetTemplate,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: ActionType,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct UpdatePayload<P> {
    id: EntityId,
    data: P,
}

fn payload<T: DeserializeOwned, E: serde::de::Error>(value: Value) -> Result<T, E> {
    T::deserialize(value).map_err(E::custom)
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Envelope { kind, payload: body } = Envelope::deserialize(deserializer)?;
        let action = match kind {
            ActionType::SetBackgroundImage => Self::SetBackgroundImage(payload::<_, D::Error>(body)?),
            ActionType::SetBackgroundSize => Self::SetBackgroundSize(payload::<_, D::Error>(body)?),
            ActionType::SetBackgroundImageOrder => Self::SetBackgroundImageOrder(payload::<_, D::Error>(body)?),
            ActionType::AddCharacter => Self::AddCharacter,
            ActionType::UpdateCharacter => {
                let UpdatePayload { id, data } = payload::<UpdatePayload<CharacterPatch>, D::Error>(body)?;
                Self::UpdateCharacter { id, data }
            }
            ActionType::RemoveCharacter => Self::RemoveCharacter(payload::<_, D::Error>(body)?),
            ActionType::CloneCharacter => Self::CloneCharacter(payload::<_, D::Error>(body)?),
            ActionType::AddTextDisplay => Self::AddTextDisplay,
            ActionType::UpdateTextDisplay => {
                let UpdatePayload { id, data } = payload::<UpdatePayload<TextPatch>, D::Error>(body)?;
                Self::UpdateTextDisplay { id, data }
            }
            ActionType::RemoveTextDisplay => Self::RemoveTextDisplay(payload::<_, D::Error>(body)?),
            ActionType::CloneTextDisplay => Self::CloneTextDisplay(payload::<_, D::Error>(body)?),
            ActionType::SetSelectedId => Self::SetSelectedId(payload::<_, D::Error>(body)?),
            ActionType::LoadTemplate => {
                if body.is_null() {
                    return Err(D::Error::custom("LOAD_TEMPLATE requires a payload"));
                }
                Self::LoadTemplate(payload::<_, D::Error>(body)?)
            }
            ActionType::ResetTemplate => Self::ResetTemplate,
            ActionType::Unknown => Self::Unknown,
        };
        Ok(action)
    }
}
