//! Export snapshots and import decoding.
//!
//! A snapshot is the portable subset of a [`Document`]: the background image
//! and size plus every entity. The selection and the background layer order
//! are editor state and are not exported.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};
use share::{ExportFormat, ShareError};

use crate::action::Action;
use crate::doc::{Background, CharacterEntity, Document, Size, TemplatePayload, TextEntity};

/// Error returned when template text cannot be turned into a load action.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The text is not a readable template in either form.
    #[error(transparent)]
    Share(#[from] ShareError),
    /// The text decoded to an object that does not fit the template schema.
    #[error("template does not match the expected shape: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Exported background: no layer order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotBackground {
    pub image_src: Option<String>,
    pub size: Size,
}

/// The exported form of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub background: SnapshotBackground,
    pub characters: Vec<CharacterEntity>,
    pub texts: Vec<TextEntity>,
}

impl Snapshot {
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        Self {
            background: SnapshotBackground {
                image_src: doc.background.image_src.clone(),
                size: doc.background.size,
            },
            characters: doc.characters.clone(),
            texts: doc.texts.clone(),
        }
    }

    /// Encode in the requested form.
    ///
    /// # Errors
    ///
    /// Propagates [`ShareError`] from the encoder.
    pub fn encode(&self, format: ExportFormat) -> Result<String, ShareError> {
        share::encode(self, format)
    }

    /// Pretty-printed JSON, as shown in the text export dialog.
    ///
    /// # Errors
    ///
    /// Propagates [`ShareError`] from the encoder.
    pub fn to_plain(&self) -> Result<String, ShareError> {
        self.encode(ExportFormat::Plain)
    }

    /// Compact token, as carried in share links.
    ///
    /// # Errors
    ///
    /// Propagates [`ShareError`] from the encoder.
    pub fn to_compact(&self) -> Result<String, ShareError> {
        self.encode(ExportFormat::Compact)
    }

    /// The load payload for this snapshot. The background keeps the default
    /// layer order since snapshots do not carry one.
    #[must_use]
    pub fn into_payload(self) -> TemplatePayload {
        TemplatePayload {
            background: Some(Background {
                image_src: self.background.image_src,
                size: self.background.size,
                ..Background::default()
            }),
            characters: Some(self.characters),
            texts: Some(self.texts),
        }
    }
}

/// Decode template text in either form into a load payload. Sections missing
/// from the text stay `None` so the reducer applies its defaults.
///
/// # Errors
///
/// [`ImportError::Share`] when the text is unreadable, and
/// [`ImportError::Schema`] when it does not fit the template shape.
pub fn decode_payload(text: &str) -> Result<TemplatePayload, ImportError> {
    let value = share::decode(text)?;
    Ok(serde_json::from_value(value)?)
}

/// Decode template text into the single action that loads it.
///
/// # Errors
///
/// See [`decode_payload`].
pub fn import(text: &str) -> Result<Action, ImportError> {
    match decode_payload(text) {
        Ok(payload) => Ok(Action::LoadTemplate(payload)),
        Err(e) => {
            tracing::warn!(error = %e, "template import failed");
            Err(e)
        }
    }
}
