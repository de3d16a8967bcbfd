//! Document model: the background, placed entities, and the selection.
//!
//! This module defines the template state the reducer owns (`Document`), the
//! two placeable entity kinds (`CharacterEntity`, `TextEntity`), sparse
//! patches for incremental edits (`CharacterPatch`, `TextPatch`), and the
//! lenient shape accepted by a bulk load (`TemplatePayload`).
//!
//! JSON field names are camelCase so documents interoperate with templates
//! and share links produced by the web editor.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND_HEIGHT_PX, DEFAULT_BACKGROUND_WIDTH_PX, DEFAULT_CHARACTER_SIZE_PX, DEFAULT_FONT_SIZE,
    DEFAULT_TEXT_WIDTH_PX, FONT_SIZE_MAX, FONT_SIZE_MIN,
};

/// Placeholder shown for new or empty text entities.
pub const DEFAULT_TEXT: &str = "輸入文字";

pub const DEFAULT_FONT_FAMILY: &str = "Arial";

pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Font families offered by the editor. Not exhaustive: any family string is accepted.
pub const KNOWN_FONT_FAMILIES: [&str; 14] = [
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Courier New",
    "Verdana",
    "Georgia",
    "Palatino",
    "Garamond",
    "Comic Sans MS",
    "Trebuchet MS",
    "Impact",
    "微軟正黑體",
    "新細明體",
    "標楷體",
];

/// Unique identifier for a placed entity. Immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Top-left corner of an entity in canvas pixels. May be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// This position moved by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Width and height in canvas pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Where the background image sits relative to the character layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOrder {
    /// Drawn above the characters (still below texts).
    Top,
    /// Drawn below everything.
    #[default]
    Bottom,
}

/// How a character's source image is fitted into its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Scale to fit inside the box, preserving aspect ratio.
    #[default]
    Contain,
    /// Scale to cover the box, preserving aspect ratio; overflow is cropped.
    Cover,
    /// Stretch to the box, ignoring aspect ratio.
    Fill,
    /// Native size, centered.
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Whether a text block sizes to its content or uses a fixed `width`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthMode {
    #[default]
    Auto,
    Fixed,
}

/// Single-line (no wrapping) or multi-line (whitespace preserved) editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Single,
    Multi,
}

/// The two placeable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Character,
    Text,
}

/// Background surface: an optional image and the canvas size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Background {
    /// Data URI or external URL; `None` for a blank surface.
    pub image_src: Option<String>,
    pub size: Size,
    pub image_order: ImageOrder,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            image_src: None,
            size: Size::new(DEFAULT_BACKGROUND_WIDTH_PX, DEFAULT_BACKGROUND_HEIGHT_PX),
            image_order: ImageOrder::Bottom,
        }
    }
}

/// A draggable, resizable character image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterEntity {
    pub id: EntityId,
    pub position: Position,
    pub size: Size,
    /// Data URI or remote URL of the image, if one has been chosen.
    pub image_data_url: Option<String>,
    pub image_render_mode: RenderMode,
}

impl CharacterEntity {
    /// A character with schema defaults.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            position: Position::default(),
            size: Size::new(DEFAULT_CHARACTER_SIZE_PX, DEFAULT_CHARACTER_SIZE_PX),
            image_data_url: None,
            image_render_mode: RenderMode::Contain,
        }
    }

    /// Shallow-merge the fields present in `patch`.
    pub fn apply(&mut self, patch: &CharacterPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(ref url) = patch.image_data_url {
            self.image_data_url.clone_from(url);
        }
        if let Some(mode) = patch.image_render_mode {
            self.image_render_mode = mode;
        }
    }
}

impl Default for CharacterEntity {
    fn default() -> Self {
        Self::new(EntityId::default())
    }
}

/// A styled, draggable text block.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextEntity {
    pub id: EntityId,
    pub position: Position,
    pub text: String,
    pub font_family: String,
    pub font_size: u32,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub is_strikethrough: bool,
    /// CSS hex color.
    pub color: String,
    pub text_align: TextAlign,
    pub width_mode: WidthMode,
    /// Only meaningful when `width_mode` is [`WidthMode::Fixed`].
    pub width: f64,
    pub input_type: InputType,
}

impl TextEntity {
    /// A text block with schema defaults.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            position: Position::default(),
            text: DEFAULT_TEXT.to_owned(),
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            is_bold: false,
            is_italic: false,
            is_underline: false,
            is_strikethrough: false,
            color: DEFAULT_TEXT_COLOR.to_owned(),
            text_align: TextAlign::Left,
            width_mode: WidthMode::Auto,
            width: DEFAULT_TEXT_WIDTH_PX,
            input_type: InputType::Single,
        }
    }

    /// Shallow-merge the fields present in `patch`.
    pub fn apply(&mut self, patch: &TextPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(ref text) = patch.text {
            self.text.clone_from(text);
        }
        if let Some(ref family) = patch.font_family {
            self.font_family.clone_from(family);
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(bold) = patch.is_bold {
            self.is_bold = bold;
        }
        if let Some(italic) = patch.is_italic {
            self.is_italic = italic;
        }
        if let Some(underline) = patch.is_underline {
            self.is_underline = underline;
        }
        if let Some(strike) = patch.is_strikethrough {
            self.is_strikethrough = strike;
        }
        if let Some(ref color) = patch.color {
            self.color.clone_from(color);
        }
        if let Some(align) = patch.text_align {
            self.text_align = align;
        }
        if let Some(mode) = patch.width_mode {
            self.width_mode = mode;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(input_type) = patch.input_type {
            self.input_type = input_type;
        }
    }

    /// The text as displayed: the placeholder stands in for an empty string.
    #[must_use]
    pub fn display_text(&self) -> &str {
        if self.text.is_empty() { DEFAULT_TEXT } else { &self.text }
    }
}

impl Default for TextEntity {
    fn default() -> Self {
        Self::new(EntityId::default())
    }
}

/// Deserialize a present field (even `null`) as `Some`, so a patch can clear a value.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Sparse update for a character. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// `Some(None)` clears the image.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub image_data_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_render_mode: Option<RenderMode>,
}

impl CharacterPatch {
    #[must_use]
    pub fn position(position: Position) -> Self {
        Self { position: Some(position), ..Default::default() }
    }

    #[must_use]
    pub fn size(size: Size) -> Self {
        Self { size: Some(size), ..Default::default() }
    }

    #[must_use]
    pub fn image(url: Option<String>) -> Self {
        Self { image_data_url: Some(url), ..Default::default() }
    }

    #[must_use]
    pub fn render_mode(mode: RenderMode) -> Self {
        Self { image_render_mode: Some(mode), ..Default::default() }
    }

    /// Whether applying this patch changes what the character's raster shows.
    #[must_use]
    pub fn affects_raster(&self) -> bool {
        self.size.is_some() || self.image_data_url.is_some() || self.image_render_mode.is_some()
    }
}

/// Sparse update for a text block. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_mode: Option<WidthMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
}

impl TextPatch {
    #[must_use]
    pub fn position(position: Position) -> Self {
        Self { position: Some(position), ..Default::default() }
    }

    #[must_use]
    pub fn width(width: f64) -> Self {
        Self { width: Some(width), ..Default::default() }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Default::default() }
    }

    /// Font size as typed into the size field: clamped, with unparsable input
    /// falling back to the default size.
    #[must_use]
    pub fn font_size_input(raw: &str) -> Self {
        Self { font_size: Some(parse_font_size(raw)), ..Default::default() }
    }
}

/// Clamp a font size to the editor's accepted range.
#[must_use]
pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
}

/// Parse a font size field. Leading digits are honored (`"36px"` is 36);
/// input without leading digits, or zero, yields the default size.
#[must_use]
pub fn parse_font_size(raw: &str) -> u32 {
    let digits: String = raw.trim().chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => DEFAULT_FONT_SIZE,
        Ok(size) => clamp_font_size(size),
    }
}

/// Whether `family` is one of the families the editor offers.
#[must_use]
pub fn is_known_font_family(family: &str) -> bool {
    KNOWN_FONT_FAMILIES.contains(&family)
}

/// The complete template state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub background: Background,
    /// Draw order: later entries are drawn on top. Also the 1-based display index.
    pub characters: Vec<CharacterEntity>,
    /// Always drawn above the characters.
    pub texts: Vec<TextEntity>,
    /// At most one selected entity; always refers to a present entity.
    pub selected_id: Option<EntityId>,
}

impl Document {
    /// Build a document from a bulk-load payload. Missing sections take
    /// their initial values and the selection is cleared.
    #[must_use]
    pub fn from_payload(payload: TemplatePayload) -> Self {
        Self {
            background: payload.background.unwrap_or_default(),
            characters: payload.characters.unwrap_or_default(),
            texts: payload.texts.unwrap_or_default(),
            selected_id: None,
        }
    }

    #[must_use]
    pub fn character(&self, id: &EntityId) -> Option<&CharacterEntity> {
        self.characters.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn text(&self, id: &EntityId) -> Option<&TextEntity> {
        self.texts.iter().find(|t| &t.id == id)
    }

    /// Which kind of entity `id` names, if it is present.
    #[must_use]
    pub fn kind_of(&self, id: &EntityId) -> Option<EntityKind> {
        if self.character(id).is_some() {
            Some(EntityKind::Character)
        } else if self.text(id).is_some() {
            Some(EntityKind::Text)
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.kind_of(id).is_some()
    }

    #[must_use]
    pub fn position_of(&self, id: &EntityId) -> Option<Position> {
        self.character(id)
            .map(|c| c.position)
            .or_else(|| self.text(id).map(|t| t.position))
    }

    #[must_use]
    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected_id.as_ref() == Some(id)
    }

    /// Ids of every entity, characters first, each group in draw order.
    pub fn entity_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.characters.iter().map(|c| &c.id).chain(self.texts.iter().map(|t| &t.id))
    }

    /// Ids paired with their kind, characters first.
    pub fn entities(&self) -> impl Iterator<Item = (&EntityId, EntityKind)> {
        let characters = self.characters.iter().map(|c| (&c.id, EntityKind::Character));
        characters.chain(self.texts.iter().map(|t| (&t.id, EntityKind::Text)))
    }
}

/// Shape accepted by a bulk load. Every section is optional; unknown fields
/// (including a stale `selectedId`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<CharacterEntity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texts: Option<Vec<TextEntity>>,
}

impl From<&Document> for TemplatePayload {
    fn from(doc: &Document) -> Self {
        Self {
            background: Some(doc.background.clone()),
            characters: Some(doc.characters.clone()),
            texts: Some(doc.texts.clone()),
        }
    }
}
