//! Shared numeric constants for the canvas crate.

// ── Entities ────────────────────────────────────────────────────

/// Smallest width or height an interactive resize may produce, in pixels.
pub const MIN_ENTITY_SIZE_PX: f64 = 50.0;

/// Offset applied to both axes when an entity is cloned.
pub const CLONE_OFFSET_PX: f64 = 10.0;

/// Side length of a new character image.
pub const DEFAULT_CHARACTER_SIZE_PX: f64 = 400.0;

/// Default background surface size.
pub const DEFAULT_BACKGROUND_WIDTH_PX: f64 = 1280.0;
pub const DEFAULT_BACKGROUND_HEIGHT_PX: f64 = 720.0;

// ── Text ────────────────────────────────────────────────────────

pub const FONT_SIZE_MIN: u32 = 8;
pub const FONT_SIZE_MAX: u32 = 200;
pub const DEFAULT_FONT_SIZE: u32 = 24;

/// Width used by fixed-width text until it is resized.
pub const DEFAULT_TEXT_WIDTH_PX: f64 = 200.0;

/// Average glyph advance as a fraction of the font size, for estimated text bounds.
pub const TEXT_ADVANCE_EM: f64 = 0.6;

/// Line height as a multiple of the font size.
pub const TEXT_LINE_HEIGHT_EM: f64 = 1.2;

// ── Ids ─────────────────────────────────────────────────────────

/// Length of generated entity ids (base-36 digits).
pub const ID_LEN: usize = 9;

/// Attempts to find an id not already in the document before giving up.
pub const MAX_ID_ATTEMPTS: usize = 8;

// ── Hit-testing ─────────────────────────────────────────────────

/// Side length of the square resize handle at an entity's bottom-right corner.
pub const RESIZE_HANDLE_PX: f64 = 16.0;
